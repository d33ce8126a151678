// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-user broadcast hubs.
//!
//! Each hub is one task owning its user's connection set. Registration,
//! removal and delivery all arrive on the hub's inbox, so membership changes
//! are ordered with messages. Delivery never blocks: a connection whose
//! outbound buffer is full misses the message.
//!
//! Hubs are reference counted by live [`HubConnection`]s and torn down when
//! the last one drops.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

/// Commands a hub's inbox holds before `send` starts dropping.
pub const HUB_INBOX: usize = 256;
/// Messages queued per connection before that connection misses some.
pub const HUB_BUFFER: usize = 256;

enum HubCommand {
    Register(u64, mpsc::Sender<Arc<str>>),
    Unregister(u64),
    Broadcast(Arc<str>),
}

struct HubEntry {
    inbox: mpsc::Sender<HubCommand>,
    connections: usize,
}

struct Inner {
    hubs: Mutex<HashMap<i64, HubEntry>>,
    next_id: AtomicU64,
    inbox: usize,
    buffer: usize,
}

/// Registry of live hubs keyed by user id.
#[derive(Clone)]
pub struct Hubs {
    inner: Arc<Inner>,
}

impl Default for Hubs {
    fn default() -> Self {
        Self::with_buffers(HUB_INBOX, HUB_BUFFER)
    }
}

impl Hubs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hubs with an `inbox`-deep command queue and `buffer` slots per
    /// connection.
    pub fn with_buffers(inbox: usize, buffer: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                hubs: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(1),
                inbox: inbox.max(1),
                buffer: buffer.max(1),
            }),
        }
    }

    /// Join `user_id`'s hub, creating it on first use.
    pub async fn connect(&self, user_id: i64) -> HubConnection {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(self.inner.buffer);
        let inbox = {
            let mut hubs = self.inner.hubs.lock();
            let entry = hubs.entry(user_id).or_insert_with(|| HubEntry {
                inbox: spawn_hub(user_id, self.inner.inbox),
                connections: 0,
            });
            entry.connections += 1;
            entry.inbox.clone()
        };
        if inbox.send(HubCommand::Register(id, tx)).await.is_err() {
            warn!(user_id, "hub stopped before registration");
        }
        debug!(user_id, connection = id, "hub connection opened");
        HubConnection { user_id, id, rx, hubs: self.clone() }
    }

    /// Queue `message` for every connection of `user_id`. Returns whether
    /// the user has a hub.
    pub fn send(&self, user_id: i64, message: Arc<str>) -> bool {
        let hubs = self.inner.hubs.lock();
        let Some(entry) = hubs.get(&user_id) else {
            return false;
        };
        if let Err(TrySendError::Full(_)) = entry.inbox.try_send(HubCommand::Broadcast(message)) {
            warn!(user_id, "hub inbox full, dropping message");
        }
        true
    }

    /// Live connections for `user_id`.
    pub fn connections(&self, user_id: i64) -> usize {
        self.inner.hubs.lock().get(&user_id).map_or(0, |e| e.connections)
    }

    pub fn hub_count(&self) -> usize {
        self.inner.hubs.lock().len()
    }

    fn release(&self, user_id: i64, id: u64) {
        let mut hubs = self.inner.hubs.lock();
        let Some(entry) = hubs.get_mut(&user_id) else { return };
        entry.connections = entry.connections.saturating_sub(1);
        if entry.connections == 0 {
            // Dropping the last inbox sender ends the hub task.
            hubs.remove(&user_id);
            debug!(user_id, "hub torn down");
        } else if entry.inbox.try_send(HubCommand::Unregister(id)).is_err() {
            // The closed connection channel is pruned on the next broadcast.
            debug!(user_id, connection = id, "deferred hub unregistration");
        }
    }
}

fn spawn_hub(user_id: i64, capacity: usize) -> mpsc::Sender<HubCommand> {
    let (inbox, mut commands) = mpsc::channel(capacity);
    tokio::spawn(async move {
        let mut connections: HashMap<u64, mpsc::Sender<Arc<str>>> = HashMap::new();
        while let Some(command) = commands.recv().await {
            match command {
                HubCommand::Register(id, tx) => {
                    connections.insert(id, tx);
                }
                HubCommand::Unregister(id) => {
                    connections.remove(&id);
                }
                HubCommand::Broadcast(message) => {
                    connections.retain(|id, tx| match tx.try_send(message.clone()) {
                        Ok(()) => true,
                        Err(TrySendError::Full(_)) => {
                            debug!(user_id, connection = id, "connection buffer full, message dropped");
                            true
                        }
                        Err(TrySendError::Closed(_)) => false,
                    });
                }
            }
        }
    });
    inbox
}

/// One registered connection. Dropping it leaves the hub.
pub struct HubConnection {
    user_id: i64,
    id: u64,
    rx: mpsc::Receiver<Arc<str>>,
    hubs: Hubs,
}

impl HubConnection {
    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub async fn recv(&mut self) -> Option<Arc<str>> {
        self.rx.recv().await
    }

    /// Next message if one is already queued.
    pub fn try_recv(&mut self) -> Option<Arc<str>> {
        self.rx.try_recv().ok()
    }
}

impl Drop for HubConnection {
    fn drop(&mut self) {
        self.hubs.release(self.user_id, self.id);
        debug!(user_id = self.user_id, connection = self.id, "hub connection closed");
    }
}

#[cfg(test)]
#[path = "hub_tests.rs"]
mod tests;
