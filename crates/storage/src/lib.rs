// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! lemc-storage: durable job queues

mod file;
mod memory;
mod record;
mod store;

pub use file::{FileQueue, RecoveryReport};
pub use memory::MemoryQueue;
pub use record::{decode, encode, RecordError};
pub use store::{QueueError, QueueStore};
