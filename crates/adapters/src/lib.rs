// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! lemc-adapters: Adapters for external I/O: the container engine and live connections.

pub mod broadcast;
pub mod image;
pub mod lines;
pub mod runtime;

pub use broadcast::Broadcaster;
pub use image::{normalize_image_name, short_image_id};
pub use lines::LineSplitter;
pub use runtime::{ContainerRuntime, ContainerSpec, DockerRuntime, Mount, RegistryAuth, RuntimeError};

#[cfg(any(test, feature = "test-support"))]
pub use broadcast::{Delivery, FakeBroadcaster};
#[cfg(any(test, feature = "test-support"))]
pub use runtime::{FakeRuntime, RuntimeCall, Script, STOPPED_EXIT_CODE};
