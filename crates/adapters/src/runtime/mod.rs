// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Container runtime adapter.
//!
//! - [`docker`]: bollard-backed runtime talking to the Docker engine API
//! - `fake`: scripted runtime for tests (behind `test-support`)

mod docker;
#[cfg(any(test, feature = "test-support"))]
mod fake;

pub use docker::DockerRuntime;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeRuntime, RuntimeCall, Script, STOPPED_EXIT_CODE};

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors from container runtime operations
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("container runtime unavailable: {0}")]
    Unavailable(String),
    #[error("image not found: {0}")]
    ImageNotFound(String),
    #[error("pull {image} failed: {message}")]
    PullFailed { image: String, message: String },
    #[error("no such container: {0}")]
    NoSuchContainer(String),
    #[error("runtime api: {0}")]
    Api(String),
}

/// Host path bound into a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mount {
    pub source: String,
    pub target: String,
}

impl Mount {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self { source: source.into(), target: target.into() }
    }

    /// `source:target` bind string.
    pub fn bind(&self) -> String {
        format!("{}:{}", self.source, self.target)
    }
}

/// Everything needed to create one step container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    pub env: Vec<String>,
    pub labels: BTreeMap<String, String>,
    pub mounts: Vec<Mount>,
    pub entrypoint: Vec<String>,
    pub cmd: Vec<String>,
    pub stop_timeout: Option<Duration>,
}

/// Credentials for a private registry pull.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryAuth {
    pub username: String,
    pub password: String,
}

impl RegistryAuth {
    /// Parse `basic:USER:PASSWORD` or `USER:PASSWORD`.
    pub fn parse(text: &str) -> Option<Self> {
        let rest = text.strip_prefix("basic:").unwrap_or(text);
        let (username, password) = rest.split_once(':')?;
        if username.is_empty() {
            return None;
        }
        Some(Self { username: username.to_string(), password: password.to_string() })
    }
}

/// Operations the step runner needs from a container engine.
#[async_trait]
pub trait ContainerRuntime: Clone + Send + Sync + 'static {
    async fn ping(&self) -> Result<(), RuntimeError>;

    async fn image_exists(&self, image: &str) -> Result<bool, RuntimeError>;

    async fn pull_image(&self, image: &str, auth: Option<&RegistryAuth>) -> Result<(), RuntimeError>;

    /// Local image id, e.g. `sha256:...`
    async fn image_id(&self, image: &str) -> Result<String, RuntimeError>;

    /// Force-remove every container (running or not) carrying all `labels`.
    /// Returns how many were removed.
    async fn remove_labeled(&self, labels: &BTreeMap<String, String>) -> Result<usize, RuntimeError>;

    /// Create and start a container, returning its id.
    async fn create_and_start(&self, spec: &ContainerSpec) -> Result<String, RuntimeError>;

    /// Follow stdout and stderr line by line until the container exits.
    async fn log_lines(&self, id: &str) -> Result<mpsc::Receiver<String>, RuntimeError>;

    /// Block until exit and return the exit code.
    async fn wait(&self, id: &str) -> Result<i64, RuntimeError>;

    /// Graceful stop: signal, then kill after `grace`.
    async fn stop(&self, id: &str, grace: Duration) -> Result<(), RuntimeError>;

    /// Force-remove a container together with its anonymous volumes.
    async fn remove(&self, id: &str) -> Result<(), RuntimeError>;
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
