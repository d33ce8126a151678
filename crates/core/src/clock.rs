// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction for testable scheduling

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Wall-clock source for next-run-time arithmetic.
///
/// Queue files are named by epoch nanoseconds, so the clock speaks the same unit.
pub trait Clock: Clone + Send + Sync + 'static {
    fn epoch_nanos(&self) -> i64;
}

/// Real system clock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn epoch_nanos(&self) -> i64 {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
        i64::try_from(nanos).unwrap_or(i64::MAX)
    }
}

/// Fake clock for tests; clones share the same time.
#[derive(Clone, Debug)]
pub struct FakeClock {
    nanos: Arc<Mutex<i64>>,
}

impl FakeClock {
    /// Start at an arbitrary but stable instant.
    pub fn new() -> Self {
        Self::at(1_700_000_000_000_000_000)
    }

    pub fn at(epoch_nanos: i64) -> Self {
        Self { nanos: Arc::new(Mutex::new(epoch_nanos)) }
    }

    /// Advance the clock by the given duration
    pub fn advance(&self, duration: Duration) {
        let step = i64::try_from(duration.as_nanos()).unwrap_or(i64::MAX);
        let mut nanos = self.nanos.lock();
        *nanos = nanos.saturating_add(step);
    }

    pub fn set_epoch_nanos(&self, nanos: i64) {
        *self.nanos.lock() = nanos;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn epoch_nanos(&self) -> i64 {
        *self.nanos.lock()
    }
}

/// Convert a duration to signed nanoseconds, saturating.
pub fn duration_nanos(duration: Duration) -> i64 {
    i64::try_from(duration.as_nanos()).unwrap_or(i64::MAX)
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
