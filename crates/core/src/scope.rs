// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scope, entity kind and queue identifiers.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Visibility of a job's results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Only the submitting user sees output
    Individual,
    /// Output fans out to every resolved recipient
    Shared,
}

crate::simple_display! {
    Scope {
        Individual => "individual",
        Shared => "shared",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported scope {0:?}")]
pub struct ScopeError(pub String);

impl FromStr for Scope {
    type Err = ScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "individual" => Ok(Self::Individual),
            "shared" => Ok(Self::Shared),
            other => Err(ScopeError(other.to_string())),
        }
    }
}

/// Which kind of entity submitted the recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum JobType {
    #[default]
    App,
    Cookbook,
}

crate::simple_display! {
    JobType {
        App => "app",
        Cookbook => "cookbook",
    }
}

/// The three trigger classes, each backed by its own queue directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueName {
    Now,
    In,
    Every,
}

crate::simple_display! {
    QueueName {
        Now => "now",
        In => "in",
        Every => "every",
    }
}

impl QueueName {
    pub const ALL: [QueueName; 3] = [QueueName::Now, QueueName::In, QueueName::Every];

    /// Directory name under the queues root.
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Now => "now",
            Self::In => "in",
            Self::Every => "every",
        }
    }
}

#[cfg(test)]
#[path = "scope_tests.rs"]
mod tests;
