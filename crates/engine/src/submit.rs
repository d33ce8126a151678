// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Accepting a recipe submission into the `now` queue.
//!
//! The last submission for a key wins: pending `now`/`in`/`every` records
//! and live containers of the previous one are removed before the new job
//! is filed.

use std::sync::Arc;
use std::time::Duration;

use lemc_adapters::{ContainerRuntime, RegistryAuth};
use lemc_core::{
    job_group, job_key, validate_submission, Clock, Job, JobDetail, JobRecipe, KeyError, QueueName,
    RunningState, ScheduledJob, ScopeError, Trigger, UserVisibleError, ValidationError, NOW_DELAY,
};
use lemc_storage::QueueError;
use thiserror::Error;

use crate::locker::Locker;
use crate::queues::Queues;

/// Budget for the runtime liveness check.
pub const PING_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Key(#[from] KeyError),
    #[error(transparent)]
    Scope(#[from] ScopeError),
    #[error("container runtime is not accessible: {0}")]
    RuntimeUnavailable(String),
    #[error(transparent)]
    UserVisible(#[from] UserVisibleError),
    #[error("a NOW job is already running for this recipe")]
    AlreadyRunning,
    #[error("failed to schedule job: {0}")]
    Queue(#[from] QueueError),
}

impl SubmitError {
    /// Whether resubmitting later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::AlreadyRunning | Self::RuntimeUnavailable(_))
    }
}

pub struct Submitter<R, C> {
    runtime: R,
    locker: Arc<Locker>,
    queues: Queues,
    running: Arc<RunningState>,
    clock: C,
}

impl<R, C> Submitter<R, C>
where
    R: ContainerRuntime,
    C: Clock,
{
    pub fn new(runtime: R, locker: Arc<Locker>, queues: Queues, running: Arc<RunningState>, clock: C) -> Self {
        Self { runtime, locker, queues, running, clock }
    }

    /// Validate, check images, take the now-key and file the job.
    ///
    /// The now-key stays marked running until the popped job finishes, so a
    /// second submission in between fails with `AlreadyRunning`. Returns the
    /// job key.
    pub async fn submit(&self, job: JobRecipe) -> Result<String, SubmitError> {
        validate_submission(&job)?;
        let now_key = job_key(&job, QueueName::Now)?;

        self.ping().await?;
        self.check_images(&job).await?;

        if !self.running.try_acquire(&now_key) {
            tracing::warn!(job_key = %now_key, "submission rejected, recipe already running");
            return Err(SubmitError::AlreadyRunning);
        }

        match self.replace_previous(&job).await.and_then(|()| self.file(job, &now_key)) {
            Ok(next_run_time) => {
                tracing::info!(job_key = %now_key, next_run_time, "recipe job scheduled");
                Ok(now_key)
            }
            Err(e) => {
                self.running.remove(&now_key);
                Err(e)
            }
        }
    }

    async fn ping(&self) -> Result<(), SubmitError> {
        match tokio::time::timeout(PING_TIMEOUT, self.runtime.ping()).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(SubmitError::RuntimeUnavailable(e.to_string())),
            Err(_) => Err(SubmitError::RuntimeUnavailable(format!(
                "no answer within {}s",
                PING_TIMEOUT.as_secs()
            ))),
        }
    }

    /// Pull what is missing, then confirm every step image is present.
    async fn check_images(&self, job: &JobRecipe) -> Result<(), SubmitError> {
        let mut missing: Vec<String> = Vec::new();
        for step in &job.recipe.steps {
            let image = step.image.trim();
            if missing.iter().any(|m| m == image) || self.image_present(image).await {
                continue;
            }
            tracing::info!(image, "image not found locally, pulling");
            let auth = RegistryAuth::parse(&step.registry_auth);
            if let Err(e) = self.runtime.pull_image(image, auth.as_ref()).await {
                tracing::warn!(image, error = %e, "image pull failed");
                missing.push(image.to_string());
            }
        }

        if missing.is_empty() {
            for step in &job.recipe.steps {
                let image = step.image.trim();
                if !missing.iter().any(|m| m == image) && !self.image_present(image).await {
                    missing.push(image.to_string());
                }
            }
        }

        if missing.is_empty() {
            return Ok(());
        }
        let err = UserVisibleError::missing_images(&missing);
        tracing::warn!(images = ?missing, "{}", err.message);
        Err(err.into())
    }

    async fn image_present(&self, image: &str) -> bool {
        match self.runtime.image_exists(image).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(image, error = %e, "image inspect failed");
                false
            }
        }
    }

    /// Evict pending records and live containers of earlier submissions.
    async fn replace_previous(&self, job: &JobRecipe) -> Result<(), SubmitError> {
        for name in QueueName::ALL {
            let key = job_key(job, name)?;
            let evicted = self.queues.get(name).evict(&key)?;
            if evicted > 0 {
                tracing::info!(job_key = %key, queue = %name, evicted, "superseded pending job");
            }
        }

        let layout = self.locker.layout(job)?;
        for step in &job.recipe.steps {
            match self.runtime.remove_labeled(&layout.labels(job, step)).await {
                Ok(0) => {}
                Ok(removed) => tracing::info!(step = step.step, removed, "removed running containers"),
                Err(e) => tracing::warn!(step = step.step, error = %e, "failed to clean up existing containers"),
            }
        }
        Ok(())
    }

    fn file(&self, job: JobRecipe, now_key: &str) -> Result<i64, SubmitError> {
        let trigger = Trigger::run_once(NOW_DELAY);
        let group = job_group(&job);
        let mut detail = JobDetail::new(Job::Recipe(job), now_key.to_string(), group);
        detail.options.replace = true;
        let scheduled = ScheduledJob {
            detail,
            trigger,
            next_run_time: trigger.first_fire(self.clock.epoch_nanos()),
        };
        Ok(self.queues.get(QueueName::Now).push(scheduled)?)
    }
}

#[cfg(test)]
#[path = "submit_tests.rs"]
mod tests;
