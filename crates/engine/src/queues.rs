// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The three trigger-class queues and the signal that wakes their schedulers.

use std::sync::Arc;

use lemc_core::{QueueName, ScheduledJob};
use lemc_storage::{QueueError, QueueStore};
use tokio::sync::Notify;

/// One queue store plus the wakeup its scheduler sleeps on.
#[derive(Clone)]
pub struct QueueHandle {
    store: Arc<dyn QueueStore>,
    wake: Arc<Notify>,
}

impl QueueHandle {
    pub fn new(store: Arc<dyn QueueStore>) -> Self {
        Self { store, wake: Arc::new(Notify::new()) }
    }

    pub fn name(&self) -> QueueName {
        self.store.name()
    }

    pub fn store(&self) -> &dyn QueueStore {
        self.store.as_ref()
    }

    /// Push and wake the scheduler so it re-reads the head.
    pub fn push(&self, job: ScheduledJob) -> Result<i64, QueueError> {
        let next_run_time = self.store.push(job)?;
        self.wake.notify_one();
        Ok(next_run_time)
    }

    /// Remove every record under `key`. Returns how many were removed.
    pub fn evict(&self, key: &str) -> Result<usize, QueueError> {
        let mut removed = 0;
        loop {
            match self.store.remove(key) {
                Ok(_) => removed += 1,
                Err(e) if e.is_not_found() => return Ok(removed),
                Err(e) => return Err(e),
            }
        }
    }

    pub(crate) fn wake(&self) -> &Notify {
        &self.wake
    }
}

/// Queues by trigger class.
#[derive(Clone)]
pub struct Queues {
    now: QueueHandle,
    in_: QueueHandle,
    every: QueueHandle,
}

impl Queues {
    pub fn new(now: Arc<dyn QueueStore>, in_: Arc<dyn QueueStore>, every: Arc<dyn QueueStore>) -> Self {
        Self { now: QueueHandle::new(now), in_: QueueHandle::new(in_), every: QueueHandle::new(every) }
    }

    pub fn get(&self, name: QueueName) -> &QueueHandle {
        match name {
            QueueName::Now => &self.now,
            QueueName::In => &self.in_,
            QueueName::Every => &self.every,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueueHandle> {
        [&self.now, &self.in_, &self.every].into_iter()
    }
}

#[cfg(test)]
#[path = "queues_tests.rs"]
mod tests;
