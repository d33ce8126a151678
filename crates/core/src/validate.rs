// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structural checks run before a job is trusted for execution.

use thiserror::Error;

use crate::job::{Job, JobRecipe, ScheduledJob, StepJob};
use crate::recipe::Step;
use crate::trigger::{parse_step_timeout, StepTrigger};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("job validation error for {field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self { field, message: message.into() }
    }
}

/// Validate a job as read back from (or about to be written to) a queue.
pub fn validate_scheduled(job: &ScheduledJob) -> Result<(), ValidationError> {
    if job.detail.key.is_empty() {
        return Err(ValidationError::new("job_key_name", "job key name is empty"));
    }
    match &job.detail.job {
        Job::Recipe(r) => validate_recipe_job(r),
        Job::Step(s) => validate_step_job(s),
    }
}

pub fn validate_step_job(job: &StepJob) -> Result<(), ValidationError> {
    if job.step.name.is_empty() {
        return Err(ValidationError::new("step_name", "step name is empty"));
    }
    if job.step.image.is_empty() {
        return Err(ValidationError::new("step_image", "step image is empty"));
    }
    validate_recipe_job(&job.recipe_job)
}

pub fn validate_recipe_job(job: &JobRecipe) -> Result<(), ValidationError> {
    if job.uuid.is_empty() {
        return Err(ValidationError::new("recipe_uuid", "recipe UUID is empty"));
    }
    if job.user_id.is_empty() {
        return Err(ValidationError::new("recipe_user_id", "recipe user ID is empty"));
    }
    if job.page_id.is_empty() {
        return Err(ValidationError::new("recipe_page_id", "recipe page ID is empty"));
    }
    if job.scope.is_empty() {
        return Err(ValidationError::new("recipe_scope", "recipe scope is empty"));
    }
    if job.scope().is_err() {
        return Err(ValidationError::new(
            "recipe_scope",
            format!("recipe scope '{}' is not valid (must be 'individual' or 'shared')", job.scope),
        ));
    }
    Ok(())
}

/// Submission-time check: every step must be runnable and carry a parseable
/// trigger and timeout.
pub fn validate_submission(job: &JobRecipe) -> Result<(), ValidationError> {
    validate_recipe_job(job)?;
    for step in &job.recipe.steps {
        validate_step(step)?;
    }
    Ok(())
}

fn validate_step(step: &Step) -> Result<(), ValidationError> {
    if step.name.is_empty() {
        return Err(ValidationError::new("step_name", "step name is empty"));
    }
    if step.image.is_empty() {
        return Err(ValidationError::new("step_image", "step image is empty"));
    }
    StepTrigger::parse(&step.trigger)
        .map_err(|e| ValidationError::new("step_do", format!("step {}: {e}", step.step)))?;
    if !step.timeout.is_empty() {
        parse_step_timeout(&step.timeout)
            .map_err(|e| ValidationError::new("step_timeout", format!("step {}: {e}", step.step)))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
