// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `lemcd` entry point.

use std::process::ExitCode;

use lemc_adapters::DockerRuntime;
use lemc_daemon::{logging, shutdown_signal, startup, Config};
use tokio_util::sync::CancellationToken;
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env is normal.
    let _ = dotenvy::dotenv();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("lemcd: {e}");
            return ExitCode::FAILURE;
        }
    };
    let _log_guard = match logging::init(&config.log_dir()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("lemcd: failed to set up logging in {}: {e}", config.log_dir().display());
            return ExitCode::FAILURE;
        }
    };

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "lemcd failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> Result<(), lemc_daemon::LifecycleError> {
    let runtime = DockerRuntime::connect(config.docker_host.as_deref())?;
    let daemon = startup(&config, runtime).await?;

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal.cancel();
    });
    daemon.run(shutdown).await
}
