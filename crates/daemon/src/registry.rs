// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Delivery targets the engine broadcasts into: per-user hubs and per-app
//! MCP servers.

use std::collections::HashMap;
use std::sync::Arc;

use lemc_adapters::Broadcaster;
use parking_lot::Mutex;

use crate::apps::AppRecord;
use crate::hub::Hubs;
use crate::mcp::McpServer;

#[derive(Clone, Default)]
pub struct Registry {
    hubs: Hubs,
    mcp: Arc<Mutex<HashMap<i64, Arc<McpServer>>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hubs(hubs: Hubs) -> Self {
        Self { hubs, mcp: Arc::default() }
    }

    pub fn hubs(&self) -> &Hubs {
        &self.hubs
    }

    /// The MCP server for `app`, created on first use.
    pub fn mcp_server(&self, app: &AppRecord) -> Arc<McpServer> {
        Arc::clone(self.mcp.lock().entry(app.id).or_insert_with(|| Arc::new(McpServer::new(app))))
    }
}

impl Broadcaster for Registry {
    fn send_to_user(&self, user_id: i64, message: Arc<str>) -> bool {
        self.hubs.send(user_id, message)
    }

    fn send_to_app(&self, app_id: i64, message: Arc<str>) -> usize {
        let server = self.mcp.lock().get(&app_id).cloned();
        server.map_or(0, |s| s.broadcast(message))
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
