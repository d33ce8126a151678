// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors meant to be rendered to the submitting user.

use serde_json::{json, Map, Value};
use thiserror::Error;

pub const MISSING_IMAGES: &str = "MISSING_IMAGES";

/// A failure with a machine-readable code, a human message and structured
/// context, safe to show without leaking internals.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{code}: {message}")]
pub struct UserVisibleError {
    pub code: String,
    pub message: String,
    pub data: Map<String, Value>,
}

impl UserVisibleError {
    pub fn new(code: impl Into<String>, message: impl Into<String>, data: Map<String, Value>) -> Self {
        Self { code: code.into(), message: message.into(), data }
    }

    /// Images that could not be found locally nor pulled.
    pub fn missing_images(images: &[String]) -> Self {
        let mut data = Map::new();
        data.insert("images".into(), json!(images));
        Self::new(
            MISSING_IMAGES,
            format!("Cannot execute job: Missing Docker images: {}", images.join(", ")),
            data,
        )
    }

    /// `{"error":{"code":..,"message":..,"data":..}}`
    pub fn to_json(&self) -> Value {
        json!({
            "error": {
                "code": self.code,
                "message": self.message,
                "data": self.data,
            }
        })
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
