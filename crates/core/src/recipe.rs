// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parsed cookbook recipes and their steps.

use serde::{Deserialize, Serialize};

/// A named, ordered sequence of container steps.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(rename = "recipe", alias = "name")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub form: Vec<FormField>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// Form input declared by a recipe; values arrive with the submission.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FormField {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub variable: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, rename = "type")]
    pub kind: String,
}

impl FormField {
    /// `variable` wins over the older `name` field.
    pub fn env_name(&self) -> &str {
        if self.variable.is_empty() {
            &self.name
        } else {
            &self.variable
        }
    }
}

/// One container-image execution unit.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Step {
    pub step: u32,
    pub name: String,
    pub image: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub registry_auth: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entrypoint: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub environment: Vec<String>,
    /// Trigger expression: `now`, `in.<N>.<unit>` or `every.<N>.<unit>`
    #[serde(rename = "do")]
    pub trigger: String,
    #[serde(default)]
    pub timeout: String,
}

impl Step {
    /// Step-level variables; `environment` replaces the older `env` list when present.
    pub fn env_vars(&self) -> &[String] {
        if self.environment.is_empty() {
            &self.env
        } else {
            &self.environment
        }
    }
}

crate::builder! {
    pub struct StepBuilder => Step {
        into {
            name: String = "hello",
            image: String = "alpine:latest",
            registry_auth: String = "",
            trigger: String = "now",
            timeout: String = "30.seconds",
        }
        set {
            step: u32 = 1,
            entrypoint: Vec<String> = Vec::new(),
            command: Vec<String> = Vec::new(),
            env: Vec<String> = Vec::new(),
            environment: Vec<String> = Vec::new(),
        }
    }
}

#[cfg(test)]
#[path = "recipe_tests.rs"]
mod tests;
