// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Image reference normalization.

/// Canonical form of an image reference so `alpine`, `alpine:latest` and
/// `docker.io/library/alpine:latest` compare equal.
///
/// - missing tag becomes `latest`
/// - bare names live under `docker.io/library/`
/// - a first path segment that is not a registry host gets `docker.io/`
pub fn normalize_image_name(image: &str) -> String {
    let image = image.trim();
    let (reference, digest) = match image.split_once('@') {
        Some((name, digest)) => (name, Some(digest)),
        None => (image, None),
    };

    let last_segment_start = reference.rfind('/').map(|i| i + 1).unwrap_or(0);
    let (name, tag) = match reference[last_segment_start..].rfind(':') {
        Some(i) => {
            let split = last_segment_start + i;
            (&reference[..split], &reference[split + 1..])
        }
        None => (reference, "latest"),
    };

    let name = match name.split_once('/') {
        None => format!("docker.io/library/{name}"),
        Some((first, _)) if is_registry_host(first) => name.to_string(),
        Some(_) => format!("docker.io/{name}"),
    };

    match digest {
        Some(digest) => format!("{name}@{digest}"),
        None => format!("{name}:{tag}"),
    }
}

fn is_registry_host(segment: &str) -> bool {
    segment.contains('.') || segment.contains(':') || segment == "localhost"
}

/// Short image hash: first 8 characters of the id without its `sha256:` prefix.
pub fn short_image_id(id: &str) -> String {
    id.strip_prefix("sha256:").unwrap_or(id).chars().take(8).collect()
}

#[cfg(test)]
#[path = "image_tests.rs"]
mod tests;
