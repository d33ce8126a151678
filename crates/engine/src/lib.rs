// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! lemc-engine: scheduling, execution and container supervision

pub mod env;
pub mod files;
pub mod locker;
pub mod protocol;

mod engine;
mod executor;
mod output;
mod queues;
mod route;
mod runner;
mod scheduler;
mod status;
mod submit;

use std::sync::Arc;

use lemc_core::RunningState;

pub use engine::{Engine, EngineConfig};
pub use env::{RecipeRequest, RequestError};
pub use executor::{ExecError, Executor};
pub use files::{CacheFiles, CacheKind, FilesError, StepLog};
pub use locker::{JobLayout, Locker};
pub use output::{LineOutcome, StepIdentity, StepOutput};
pub use protocol::LogCommand;
pub use queues::{QueueHandle, Queues};
pub use route::Route;
pub use runner::{step_timeout, RunnerError, StepOutcome, StepRunner, DEFAULT_STEP_TIMEOUT};
pub use scheduler::{Scheduler, SchedulerConfig};
pub use status::{job_status, JobStatus, KeyStatus, StatusError};
pub use submit::{SubmitError, Submitter};

/// Collaborators shared by every engine component.
pub struct EngineDeps<R, B, C> {
    pub runtime: R,
    pub broadcaster: B,
    pub clock: C,
    pub locker: Arc<Locker>,
    pub queues: Queues,
    pub running: Arc<RunningState>,
}
