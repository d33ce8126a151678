// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Handling of each line a step container prints.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use lemc_adapters::Broadcaster;
use lemc_wire::HubMessage;
use tokio::time::Instant;

use crate::files::{CacheFiles, StepLog};
use crate::protocol::{CacheWrite, LogCommand};
use crate::route::Route;

/// Minimum spacing between forwarded empty `trunc` (UI clear) commands.
pub const CLEAR_SPACING: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    Continue,
    /// The container reported a failure with `lemc.err;`.
    Failed(String),
}

/// Everything needed to label a step's output.
#[derive(Debug, Clone)]
pub struct StepIdentity {
    pub uuid: String,
    pub page_id: String,
    pub view_type: String,
    pub step_id: String,
    pub image_hash: String,
    pub image_name: String,
}

/// Applies the log protocol to one step's output: step log, cache files,
/// collected env additions and broadcasts.
pub struct StepOutput<B> {
    broadcaster: B,
    route: Route,
    cache: CacheFiles,
    log: StepLog,
    identity: StepIdentity,
    last_clear: Option<Instant>,
    env: Vec<String>,
}

impl<B: Broadcaster> StepOutput<B> {
    pub fn new(broadcaster: B, route: Route, cache: CacheFiles, log: StepLog, identity: StepIdentity) -> Self {
        Self { broadcaster, route, cache, log, identity, last_clear: None, env: Vec::new() }
    }

    /// `KEY=VALUE` pairs announced with `lemc.env;`, in order.
    pub fn env(&self) -> &[String] {
        &self.env
    }

    pub fn into_env(self) -> Vec<String> {
        self.env
    }

    pub fn handle(&mut self, line: &str, at: DateTime<Utc>) -> LineOutcome {
        let line = line.trim();
        if line.is_empty() {
            return LineOutcome::Continue;
        }
        let id = &self.identity;
        if let Err(e) = self.log.write(at, &id.step_id, &id.image_hash, &id.image_name, line) {
            tracing::warn!(error = %e, "step log write failed");
        }

        let Some((command, payload)) = LogCommand::parse(line) else {
            return LineOutcome::Continue;
        };

        match command {
            LogCommand::Env => {
                let pair = payload.trim();
                if !pair.is_empty() {
                    self.env.push(pair.to_string());
                }
                return LineOutcome::Continue;
            }
            LogCommand::Err => {
                self.broadcast(command, payload);
                return LineOutcome::Failed(payload.trim().to_string());
            }
            _ => {}
        }

        let written = match command.cache_write() {
            Some(CacheWrite::Replace(kind)) => self.cache.trunc(kind, payload),
            Some(CacheWrite::Append(kind)) => self.cache.append(kind, payload),
            None => Ok(()),
        };
        if let Err(e) = written {
            tracing::warn!(error = %e, command = command.prefix(), "cache write failed, message dropped");
            return LineOutcome::Continue;
        }

        if command.is_trunc() && payload.trim().is_empty() && !self.clear_allowed() {
            tracing::trace!(command = command.prefix(), "throttled empty trunc");
            return LineOutcome::Continue;
        }
        self.broadcast(command, payload);
        LineOutcome::Continue
    }

    fn clear_allowed(&mut self) -> bool {
        let now = Instant::now();
        match self.last_clear {
            Some(last) if now.duration_since(last) < CLEAR_SPACING => false,
            _ => {
                self.last_clear = Some(now);
                true
            }
        }
    }

    fn broadcast(&self, command: LogCommand, payload: &str) {
        let message = HubMessage {
            page_id: self.identity.page_id.clone(),
            uuid: self.identity.uuid.clone(),
            view_type: self.identity.view_type.clone(),
            cmd: command.prefix().to_string(),
            msg: payload.to_string(),
        };
        match lemc_wire::encode(&message) {
            Ok(text) => self.route.deliver(&self.broadcaster, &Arc::from(text)),
            Err(e) => tracing::warn!(error = %e, "failed to encode hub message"),
        }
    }

    pub fn flush(&mut self) {
        if let Err(e) = self.log.flush() {
            tracing::warn!(error = %e, "step log flush failed");
        }
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
