// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! lemcd: the long-running recipe daemon.
//!
//! Owns the durable queues and schedulers through the engine, and serves
//! live progress to browsers (per-user hubs over websockets) and to MCP
//! clients (per-app servers over SSE).

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod apps;
pub mod config;
pub mod hub;
pub mod launch;
pub mod lifecycle;
pub mod listener;
pub mod logging;
pub mod mcp;
mod registry;

pub use apps::{ApiUser, AppDirectory, AppRecord, DirectoryError, JsonDirectory};
pub use config::{Config, ConfigError};
pub use hub::{HubConnection, Hubs};
pub use launch::Launcher;
pub use lifecycle::{shutdown_signal, startup, Daemon, LifecycleError};
pub use mcp::McpServer;
pub use registry::Registry;
