// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Set of job keys currently executing.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

/// Job key → running flag, behind one short-held lock.
#[derive(Debug, Default)]
pub struct RunningState {
    inner: Mutex<HashMap<String, bool>>,
}

impl RunningState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, key: &str) {
        self.inner.lock().insert(key.to_string(), true);
    }

    pub fn is_running(&self, key: &str) -> bool {
        self.inner.lock().get(key).copied().unwrap_or(false)
    }

    pub fn remove(&self, key: &str) {
        self.inner.lock().remove(key);
    }

    /// Mark `key` running unless it already is. Returns whether it was acquired.
    pub fn try_acquire(&self, key: &str) -> bool {
        let mut map = self.inner.lock();
        if map.get(key).copied().unwrap_or(false) {
            return false;
        }
        map.insert(key.to_string(), true);
        true
    }

    pub fn len(&self) -> usize {
        self.inner.lock().values().filter(|v| **v).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Removes its key from the running set when dropped.
#[derive(Debug)]
pub struct RunningGuard {
    state: Arc<RunningState>,
    key: String,
}

impl RunningGuard {
    /// Take ownership of a key that is already marked running.
    pub fn adopt(state: Arc<RunningState>, key: impl Into<String>) -> Self {
        Self { state, key: key.into() }
    }

    /// Acquire `key`, or `None` if another execution holds it.
    pub fn acquire(state: &Arc<RunningState>, key: &str) -> Option<Self> {
        state.try_acquire(key).then(|| Self::adopt(Arc::clone(state), key))
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.state.remove(&self.key);
    }
}

#[cfg(test)]
#[path = "running_tests.rs"]
mod tests;
