// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! lemc-core: domain types for the recipe execution engine

pub mod macros;

pub mod clock;
pub mod cookbook;
pub mod error;
pub mod job;
pub mod key;
pub mod recipe;
pub mod running;
pub mod scope;
pub mod slug;
pub mod time_fmt;
pub mod trigger;
pub mod validate;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{duration_nanos, Clock, FakeClock, SystemClock};
pub use cookbook::{Cookbook, Environment, Page};
pub use error::{UserVisibleError, MISSING_IMAGES};
pub use job::{Job, JobDetail, JobOptions, JobRecipe, ScheduledJob, StepJob};
#[cfg(any(test, feature = "test-support"))]
pub use job::JobRecipeBuilder;
pub use key::{job_group, job_key, KeyError};
pub use recipe::{FormField, Recipe, Step};
#[cfg(any(test, feature = "test-support"))]
pub use recipe::StepBuilder;
pub use running::{RunningGuard, RunningState};
pub use scope::{JobType, QueueName, Scope, ScopeError};
pub use slug::alnum_hyphen;
pub use time_fmt::{format_duration, parse_duration, DurationError};
pub use trigger::{parse_step_timeout, StepTrigger, Trigger, TriggerError, NOW_DELAY};
pub use validate::{
    validate_recipe_job, validate_scheduled, validate_step_job, validate_submission, ValidationError,
};
