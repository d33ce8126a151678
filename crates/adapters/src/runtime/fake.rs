// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted container runtime for tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};

use super::{ContainerRuntime, ContainerSpec, RegistryAuth, RuntimeError};

/// Exit code reported for a container stopped before its script finished.
pub const STOPPED_EXIT_CODE: i64 = 137;

/// What a container started from an image does.
#[derive(Debug, Clone, Default)]
pub struct Script {
    pub lines: Vec<String>,
    pub run_for: Duration,
    pub exit_code: i64,
}

impl Script {
    pub fn lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { lines: lines.into_iter().map(Into::into).collect(), ..Default::default() }
    }

    pub fn run_for(mut self, d: Duration) -> Self {
        self.run_for = d;
        self
    }

    pub fn exit_code(mut self, code: i64) -> Self {
        self.exit_code = code;
        self
    }
}

/// Recorded runtime call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeCall {
    Ping,
    ImageExists(String),
    Pull { image: String, authenticated: bool },
    ImageId(String),
    RemoveLabeled(BTreeMap<String, String>),
    Create(ContainerSpec),
    Logs(String),
    Wait(String),
    Stop(String),
    Remove(String),
}

struct FakeContainer {
    spec: ContainerSpec,
    script: Script,
    stopped: watch::Sender<bool>,
    removed: bool,
}

#[derive(Default)]
struct FakeRuntimeState {
    scripts: HashMap<String, Script>,
    missing: HashSet<String>,
    unpullable: HashSet<String>,
    ping_fails: bool,
    calls: Vec<RuntimeCall>,
    containers: HashMap<String, FakeContainer>,
    next_id: u64,
}

/// Fake container runtime for testing.
///
/// Every image exists unless marked missing. A missing image becomes
/// present after a successful pull.
#[derive(Clone, Default)]
pub struct FakeRuntime {
    inner: Arc<Mutex<FakeRuntimeState>>,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set what containers from `image` print and how long they run.
    pub fn script(&self, image: &str, script: Script) {
        self.inner.lock().scripts.insert(image.to_string(), script);
    }

    pub fn missing_image(&self, image: &str) {
        self.inner.lock().missing.insert(image.to_string());
    }

    /// Pulls of `image` fail, leaving it missing.
    pub fn unpullable(&self, image: &str) {
        let mut inner = self.inner.lock();
        inner.missing.insert(image.to_string());
        inner.unpullable.insert(image.to_string());
    }

    pub fn fail_ping(&self, fails: bool) {
        self.inner.lock().ping_fails = fails;
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<RuntimeCall> {
        self.inner.lock().calls.clone()
    }

    /// Specs of every container created so far, in creation order.
    pub fn created(&self) -> Vec<ContainerSpec> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                RuntimeCall::Create(spec) => Some(spec.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn stop_count(&self) -> usize {
        self.inner.lock().calls.iter().filter(|c| matches!(c, RuntimeCall::Stop(_))).count()
    }

    /// Containers created but not yet removed.
    pub fn live_containers(&self) -> usize {
        self.inner.lock().containers.values().filter(|c| !c.removed).count()
    }
}

#[async_trait]
impl ContainerRuntime for FakeRuntime {
    async fn ping(&self) -> Result<(), RuntimeError> {
        let mut inner = self.inner.lock();
        inner.calls.push(RuntimeCall::Ping);
        if inner.ping_fails {
            return Err(RuntimeError::Unavailable("fake runtime is down".to_string()));
        }
        Ok(())
    }

    async fn image_exists(&self, image: &str) -> Result<bool, RuntimeError> {
        let mut inner = self.inner.lock();
        inner.calls.push(RuntimeCall::ImageExists(image.to_string()));
        Ok(!inner.missing.contains(image))
    }

    async fn pull_image(&self, image: &str, auth: Option<&RegistryAuth>) -> Result<(), RuntimeError> {
        let mut inner = self.inner.lock();
        inner.calls.push(RuntimeCall::Pull { image: image.to_string(), authenticated: auth.is_some() });
        if inner.unpullable.contains(image) {
            return Err(RuntimeError::PullFailed {
                image: image.to_string(),
                message: "manifest unknown".to_string(),
            });
        }
        inner.missing.remove(image);
        Ok(())
    }

    async fn image_id(&self, image: &str) -> Result<String, RuntimeError> {
        let mut inner = self.inner.lock();
        inner.calls.push(RuntimeCall::ImageId(image.to_string()));
        if inner.missing.contains(image) {
            return Err(RuntimeError::ImageNotFound(image.to_string()));
        }
        let hex: String = image.bytes().take(32).map(|b| format!("{b:02x}")).collect();
        Ok(format!("sha256:{hex:0<64}"))
    }

    async fn remove_labeled(&self, labels: &BTreeMap<String, String>) -> Result<usize, RuntimeError> {
        let mut inner = self.inner.lock();
        inner.calls.push(RuntimeCall::RemoveLabeled(labels.clone()));
        let mut removed = 0;
        for container in inner.containers.values_mut() {
            let matches = labels.iter().all(|(k, v)| container.spec.labels.get(k) == Some(v));
            if matches && !container.removed {
                container.removed = true;
                container.stopped.send_replace(true);
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn create_and_start(&self, spec: &ContainerSpec) -> Result<String, RuntimeError> {
        let mut inner = self.inner.lock();
        inner.calls.push(RuntimeCall::Create(spec.clone()));
        if inner.missing.contains(&spec.image) {
            return Err(RuntimeError::ImageNotFound(spec.image.clone()));
        }
        inner.next_id += 1;
        let id = format!("fake-{}", inner.next_id);
        let script = inner.scripts.get(&spec.image).cloned().unwrap_or_default();
        let (stopped, _) = watch::channel(false);
        inner
            .containers
            .insert(id.clone(), FakeContainer { spec: spec.clone(), script, stopped, removed: false });
        Ok(id)
    }

    async fn log_lines(&self, id: &str) -> Result<mpsc::Receiver<String>, RuntimeError> {
        let lines = {
            let mut inner = self.inner.lock();
            inner.calls.push(RuntimeCall::Logs(id.to_string()));
            inner
                .containers
                .get(id)
                .map(|c| c.script.lines.clone())
                .ok_or_else(|| RuntimeError::NoSuchContainer(id.to_string()))?
        };
        let (tx, rx) = mpsc::channel(lines.len().max(1));
        tokio::spawn(async move {
            for line in lines {
                if tx.send(line).await.is_err() {
                    return;
                }
            }
        });
        Ok(rx)
    }

    async fn wait(&self, id: &str) -> Result<i64, RuntimeError> {
        let (mut stopped, script) = {
            let mut inner = self.inner.lock();
            inner.calls.push(RuntimeCall::Wait(id.to_string()));
            let container =
                inner.containers.get(id).ok_or_else(|| RuntimeError::NoSuchContainer(id.to_string()))?;
            (container.stopped.subscribe(), container.script.clone())
        };
        if *stopped.borrow() {
            return Ok(STOPPED_EXIT_CODE);
        }
        tokio::select! {
            _ = tokio::time::sleep(script.run_for) => Ok(script.exit_code),
            _ = stopped.changed() => Ok(STOPPED_EXIT_CODE),
        }
    }

    async fn stop(&self, id: &str, _grace: Duration) -> Result<(), RuntimeError> {
        let mut inner = self.inner.lock();
        inner.calls.push(RuntimeCall::Stop(id.to_string()));
        if let Some(container) = inner.containers.get(id) {
            container.stopped.send_replace(true);
        }
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<(), RuntimeError> {
        let mut inner = self.inner.lock();
        inner.calls.push(RuntimeCall::Remove(id.to_string()));
        match inner.containers.get_mut(id) {
            Some(container) => {
                container.removed = true;
                container.stopped.send_replace(true);
                Ok(())
            }
            None => Err(RuntimeError::NoSuchContainer(id.to_string())),
        }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
