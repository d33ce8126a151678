// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fan-out of rendered hub messages to connected users and app sessions.

use std::sync::Arc;

/// Delivers already-serialized messages to live connections.
///
/// Sends are fire-and-forget: a user with no connected hub, or an app with
/// no MCP sessions, silently drops the message.
pub trait Broadcaster: Clone + Send + Sync + 'static {
    /// Returns whether a hub for `user_id` existed.
    fn send_to_user(&self, user_id: i64, message: Arc<str>) -> bool;

    /// Returns how many app sessions received the message.
    fn send_to_app(&self, app_id: i64, message: Arc<str>) -> usize;
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::Broadcaster;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Recorded delivery
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Delivery {
        User { user_id: i64, message: String },
        App { app_id: i64, message: String },
    }

    /// Fake broadcaster for testing
    #[derive(Clone, Default)]
    pub struct FakeBroadcaster {
        inner: Arc<Mutex<Vec<Delivery>>>,
    }

    impl FakeBroadcaster {
        pub fn new() -> Self {
            Self::default()
        }

        /// Get all recorded deliveries
        pub fn deliveries(&self) -> Vec<Delivery> {
            self.inner.lock().clone()
        }

        /// Messages sent to one user, in order.
        pub fn user_messages(&self, user_id: i64) -> Vec<String> {
            self.inner
                .lock()
                .iter()
                .filter_map(|d| match d {
                    Delivery::User { user_id: u, message } if *u == user_id => Some(message.clone()),
                    _ => None,
                })
                .collect()
        }

        /// Messages sent to one app, in order.
        pub fn app_messages(&self, app_id: i64) -> Vec<String> {
            self.inner
                .lock()
                .iter()
                .filter_map(|d| match d {
                    Delivery::App { app_id: a, message } if *a == app_id => Some(message.clone()),
                    _ => None,
                })
                .collect()
        }
    }

    impl Broadcaster for FakeBroadcaster {
        fn send_to_user(&self, user_id: i64, message: Arc<str>) -> bool {
            self.inner.lock().push(Delivery::User { user_id, message: message.to_string() });
            true
        }

        fn send_to_app(&self, app_id: i64, message: Arc<str>) -> usize {
            self.inner.lock().push(Delivery::App { app_id, message: message.to_string() });
            1
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{Delivery, FakeBroadcaster};
