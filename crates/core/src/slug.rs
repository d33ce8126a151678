// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Path- and label-safe name components.

use regex::Regex;
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9_]+").expect("constant regex pattern is valid"));

/// Lowercase, then collapse each run of non-word characters into `-`.
///
/// Used for recipe names, usernames and log file stems.
pub fn alnum_hyphen(s: &str) -> String {
    NON_WORD.replace_all(&s.to_lowercase(), "-").into_owned()
}

#[cfg(test)]
#[path = "slug_tests.rs"]
mod tests;
