// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Who receives a job's progress messages.

use std::sync::Arc;

use lemc_adapters::Broadcaster;
use lemc_core::{JobRecipe, Scope};

/// Recipients of one job's messages.
///
/// `individual` jobs reach only the submitting user, `shared` jobs every
/// resolved recipient. App jobs additionally reach the app's MCP clients.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Route {
    users: Vec<i64>,
    app: Option<i64>,
}

impl Route {
    pub fn for_job(job: &JobRecipe) -> Self {
        let users = match job.scope() {
            Ok(Scope::Individual) => match job.user_id.parse::<i64>() {
                Ok(id) => vec![id],
                Err(_) => {
                    tracing::warn!(user_id = %job.user_id, uuid = %job.uuid, "invalid user id, messages not sent");
                    Vec::new()
                }
            },
            Ok(Scope::Shared) => job.recipient_user_ids.clone(),
            Err(_) => {
                tracing::warn!(scope = %job.scope, uuid = %job.uuid, "unknown job scope, messages not sent");
                Vec::new()
            }
        };
        let app = if job.app_id.is_empty() { None } else { job.app_id.parse().ok() };
        Self { users, app }
    }

    pub fn users(&self) -> &[i64] {
        &self.users
    }

    pub fn app(&self) -> Option<i64> {
        self.app
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.app.is_none()
    }

    /// Deliver to every user hub, then to the app's MCP clients.
    pub fn deliver<B: Broadcaster>(&self, broadcaster: &B, message: &Arc<str>) {
        for user_id in &self.users {
            if !broadcaster.send_to_user(*user_id, Arc::clone(message)) {
                tracing::trace!(user_id, "no hub for user");
            }
        }
        if let Some(app_id) = self.app {
            broadcaster.send_to_app(app_id, Arc::clone(message));
        }
    }
}

#[cfg(test)]
#[path = "route_tests.rs"]
mod tests;
