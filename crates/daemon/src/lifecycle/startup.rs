// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use fs2::FileExt;
use lemc_adapters::ContainerRuntime;
use lemc_core::{QueueName, RunningState, SystemClock};
use lemc_engine::{Engine, EngineDeps, Locker, Queues};
use lemc_storage::{FileQueue, QueueStore};
use tokio::net::TcpListener;
use tracing::info;

use super::{Daemon, LifecycleError};
use crate::apps::JsonDirectory;
use crate::config::Config;
use crate::listener::AppState;
use crate::Registry;

/// Take the exclusive daemon lock at `path` and record our pid in it.
pub fn acquire_lock(path: &Path) -> Result<File, LifecycleError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    // Open without truncating so a running daemon's pid survives a failed attempt.
    let mut file = std::fs::OpenOptions::new().write(true).create(true).truncate(false).open(path)?;
    file.try_lock_exclusive()
        .map_err(|source| LifecycleError::LockFailed { path: path.to_path_buf(), source })?;
    file.set_len(0)?;
    writeln!(file, "{}", std::process::id())?;
    Ok(file)
}

/// Open and recover the three file-backed queues under `root`.
pub fn open_queues(root: &Path, running: &Arc<RunningState>) -> Result<Queues, LifecycleError> {
    let open = |name: QueueName| -> Result<Arc<dyn QueueStore>, LifecycleError> {
        let queue = FileQueue::open(root, name, Arc::clone(running))?;
        let report = queue.recover()?;
        info!(queue = %name, kept = report.kept, removed = report.removed, "queue recovered");
        Ok(Arc::new(queue))
    };
    Ok(Queues::new(open(QueueName::Now)?, open(QueueName::In)?, open(QueueName::Every)?))
}

/// Start a daemon around `runtime`: lock, recover, start schedulers, bind.
pub async fn startup<R: ContainerRuntime>(config: &Config, runtime: R) -> Result<Daemon<R>, LifecycleError> {
    let lock = acquire_lock(&config.lock_path())?;
    std::fs::create_dir_all(&config.locker_dir)?;

    let running = Arc::new(RunningState::new());
    let queues = open_queues(&config.queues_dir, &running)?;
    let registry = Registry::new();
    let engine = Arc::new(Engine::new(
        EngineDeps {
            runtime,
            broadcaster: registry.clone(),
            clock: SystemClock,
            locker: Arc::new(Locker::new(config.locker_dir.clone(), config.host_locker.clone())),
            queues,
            running,
        },
        config.engine(),
    ));

    let listener = TcpListener::bind(config.bind)
        .await
        .map_err(|e| LifecycleError::BindFailed(config.bind, e))?;
    engine.start();
    info!(addr = %listener.local_addr()?, data = %config.data_dir.display(), "lemcd started");

    let state = AppState {
        registry,
        launcher: engine.clone(),
        directory: Arc::new(JsonDirectory::new(config.apps_file.clone())),
    };
    Ok(Daemon { engine, state, listener, _lock: lock })
}

#[cfg(test)]
#[path = "startup_tests.rs"]
mod tests;
