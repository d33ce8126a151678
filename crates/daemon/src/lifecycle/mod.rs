// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle: startup, serving, and graceful shutdown.

mod startup;

use std::fs::File;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use lemc_adapters::{ContainerRuntime, RuntimeError};
use lemc_core::SystemClock;
use lemc_engine::Engine;
use lemc_storage::QueueError;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::listener::{self, AppState};

pub use startup::{acquire_lock, open_queues, startup};

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("failed to acquire lock {}: daemon already running?", path.display())]
    LockFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to bind {0}: {1}")]
    BindFailed(SocketAddr, #[source] std::io::Error),

    #[error("queue error: {0}")]
    Queue(#[from] QueueError),

    #[error("container runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A started daemon: lock held, queues recovered, schedulers running,
/// listener bound.
pub struct Daemon<R> {
    engine: Arc<Engine<R, crate::Registry, SystemClock>>,
    state: AppState,
    listener: TcpListener,
    // Released on drop.
    _lock: File,
}

impl<R: ContainerRuntime> Daemon<R> {
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn engine(&self) -> &Arc<Engine<R, crate::Registry, SystemClock>> {
        &self.engine
    }

    /// Serve until `shutdown` fires, then stop the schedulers and drain
    /// in-flight jobs.
    pub async fn run(self, shutdown: CancellationToken) -> Result<(), LifecycleError> {
        let Daemon { engine, state, listener, _lock } = self;
        let served = listener::serve(listener, state, shutdown.clone()).await;
        // A listener failure still stops the engine cleanly.
        shutdown.cancel();
        info!("listener stopped, draining jobs");
        if !engine.shutdown().await {
            warn!("in-flight jobs cancelled after drain timeout");
        }
        info!("daemon stopped");
        served.map_err(LifecycleError::from)
    }
}

/// Resolves on SIGINT or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received SIGINT"),
        () = terminate => info!("received SIGTERM"),
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
