// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing setup: stderr plus a daily-rotated file under the data dir.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// `lemc` matches every `lemc_*` crate and the `lemcd` binary by target prefix.
pub const DEFAULT_FILTER: &str = "lemc=info,tower_http=info";

/// Filter directives: `RUST_LOG`, then `LEMC_LOG`, then the default.
pub fn filter_directives(env: impl Fn(&str) -> Option<String>) -> String {
    env("RUST_LOG").or_else(|| env("LEMC_LOG")).unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

/// Install the global subscriber. Keep the guard alive until exit or
/// buffered file lines are lost.
pub fn init(log_dir: &Path) -> std::io::Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;
    let directives = filter_directives(|k| std::env::var(k).ok().filter(|v| !v.is_empty()));
    let filter = EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let appender = tracing_appender::rolling::daily(log_dir, "lemcd.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init();
    Ok(guard)
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
