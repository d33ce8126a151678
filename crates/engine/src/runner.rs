// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runs one recipe step as a container.
//!
//! Clean up stale containers of the same step, ensure the image, create and
//! start, stream output through the log protocol, enforce the timeout, tear
//! down.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use lemc_adapters::{
    short_image_id, Broadcaster, ContainerRuntime, ContainerSpec, RegistryAuth, RuntimeError,
};
use lemc_core::{parse_step_timeout, Clock, JobRecipe, ScopeError, Step, TriggerError};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::env::step_env;
use crate::files::{CacheFiles, FilesError, StepLog};
use crate::locker::{JobLayout, Locker};
use crate::output::{LineOutcome, StepIdentity, StepOutput};
use crate::route::Route;

/// Grace period between the stop signal and a kill.
pub const STOP_GRACE: Duration = Duration::from_secs(10);

/// Timeout for steps that declare none.
pub const DEFAULT_STEP_TIMEOUT: Duration = Duration::from_secs(600);

/// How long to keep reading buffered output after the container exits.
const LOG_DRAIN: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error(transparent)]
    Scope(#[from] ScopeError),
    #[error(transparent)]
    InvalidTimeout(#[from] TriggerError),
    #[error("locker: {0}")]
    Locker(#[from] std::io::Error),
    #[error(transparent)]
    Files(#[from] FilesError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error("step {step} reported an error: {message}")]
    Reported { step: u32, message: String },
    #[error("step {step} timed out after {}s", after.as_secs())]
    TimedOut { step: u32, after: Duration },
    #[error("step {step} cancelled")]
    Cancelled { step: u32 },
}

/// Result of a step that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub exit_code: i64,
    /// `KEY=VALUE` pairs the step announced with `lemc.env;`
    pub env: Vec<String>,
}

pub struct StepRunner<R, B, C> {
    runtime: R,
    broadcaster: B,
    locker: Arc<Locker>,
    clock: C,
}

impl<R, B, C> StepRunner<R, B, C>
where
    R: ContainerRuntime,
    B: Broadcaster,
    C: Clock,
{
    pub fn new(runtime: R, broadcaster: B, locker: Arc<Locker>, clock: C) -> Self {
        Self { runtime, broadcaster, locker, clock }
    }

    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_nanos(self.clock.epoch_nanos())
    }

    /// Run `step` of `job` until it exits, fails, times out or is cancelled.
    pub async fn run(
        &self,
        job: &JobRecipe,
        step: &Step,
        cancel: &CancellationToken,
    ) -> Result<StepOutcome, RunnerError> {
        let timeout = step_timeout(job, step)?;
        let layout = self.locker.layout(job)?;
        layout.ensure_dirs()?;

        let labels = layout.labels(job, step);
        match self.runtime.remove_labeled(&labels).await {
            Ok(0) => {}
            Ok(n) => tracing::info!(removed = n, step = step.step, "removed stale containers"),
            Err(e) => tracing::warn!(error = %e, step = step.step, "stale container cleanup failed"),
        }

        let image = step.image.trim().to_string();
        self.ensure_image(&image, step).await?;
        let image_hash = short_image_id(&self.runtime.image_id(&image).await?);

        let mut output = self.open_output(job, step, &layout, &image, &image_hash)?;

        let spec = ContainerSpec {
            name: layout.container_name(&job.recipe.name, step),
            image: image.clone(),
            env: step_env(job, step),
            labels,
            mounts: layout.mounts(),
            entrypoint: step.entrypoint.clone(),
            cmd: step.command.clone(),
            stop_timeout: Some(timeout),
        };
        let id = self.runtime.create_and_start(&spec).await?;
        tracing::info!(container = %id, name = %spec.name, image = %image, "step container started");

        let result = self.supervise(&id, step, timeout, cancel, &mut output).await;
        output.flush();

        if let Err(e) = self.runtime.remove(&id).await {
            tracing::warn!(container = %id, error = %e, "failed to remove container");
        }

        let exit_code = result?;
        if exit_code != 0 {
            tracing::warn!(container = %id, exit_code, step = step.step, "step exited non-zero");
        }
        Ok(StepOutcome { exit_code, env: output.into_env() })
    }

    async fn ensure_image(&self, image: &str, step: &Step) -> Result<(), RunnerError> {
        if self.runtime.image_exists(image).await? {
            return Ok(());
        }
        let auth = RegistryAuth::parse(&step.registry_auth);
        if !step.registry_auth.is_empty() && auth.is_none() {
            tracing::warn!(image, "unsupported registry_auth format, pulling anonymously");
        }
        self.runtime.pull_image(image, auth.as_ref()).await?;
        Ok(())
    }

    fn open_output(
        &self,
        job: &JobRecipe,
        step: &Step,
        layout: &JobLayout,
        image: &str,
        image_hash: &str,
    ) -> Result<StepOutput<B>, RunnerError> {
        let cache = CacheFiles::open(layout.cache_dir())?;
        let log = StepLog::open(layout.log_file(&job.recipe.name), self.now())?;
        let identity = StepIdentity {
            uuid: job.uuid.clone(),
            page_id: job.page_id.clone(),
            view_type: job.scope.clone(),
            step_id: step.step.to_string(),
            image_hash: image_hash.to_string(),
            image_name: image.to_string(),
        };
        Ok(StepOutput::new(self.broadcaster.clone(), Route::for_job(job), cache, log, identity))
    }

    /// Pump output until the container exits. Returns the exit code.
    async fn supervise(
        &self,
        id: &str,
        step: &Step,
        timeout: Duration,
        cancel: &CancellationToken,
        output: &mut StepOutput<B>,
    ) -> Result<i64, RunnerError> {
        let mut lines = self.runtime.log_lines(id).await?;
        let wait = self.runtime.wait(id);
        tokio::pin!(wait);
        let deadline = tokio::time::sleep(timeout);
        tokio::pin!(deadline);
        let mut streaming = true;

        loop {
            tokio::select! {
                line = lines.recv(), if streaming => match line {
                    Some(line) => {
                        if let LineOutcome::Failed(message) = output.handle(&line, self.now()) {
                            tracing::warn!(container = %id, step = step.step, %message, "step reported error");
                            self.stop(id).await;
                            return Err(RunnerError::Reported { step: step.step, message });
                        }
                    }
                    None => streaming = false,
                },
                status = &mut wait => {
                    let exit_code = status?;
                    // output still buffered in the channel belongs to this run
                    let drained = tokio::time::timeout(LOG_DRAIN, async {
                        while let Some(line) = lines.recv().await {
                            if let LineOutcome::Failed(message) = output.handle(&line, self.now()) {
                                return Err(RunnerError::Reported { step: step.step, message });
                            }
                        }
                        Ok(())
                    })
                    .await;
                    match drained {
                        Ok(Err(e)) => return Err(e),
                        Ok(Ok(())) => {}
                        Err(_) => tracing::warn!(container = %id, "log stream still open after exit"),
                    }
                    return Ok(exit_code);
                }
                _ = &mut deadline => {
                    tracing::warn!(container = %id, step = step.step, timeout_secs = timeout.as_secs(), "step timeout exceeded");
                    self.stop(id).await;
                    return Err(RunnerError::TimedOut { step: step.step, after: timeout });
                }
                _ = cancel.cancelled() => {
                    self.stop(id).await;
                    return Err(RunnerError::Cancelled { step: step.step });
                }
            }
        }
    }

    async fn stop(&self, id: &str) {
        if let Err(e) = self.runtime.stop(id, STOP_GRACE).await {
            tracing::warn!(container = %id, error = %e, "failed to stop container");
        }
    }
}

/// The step's declared timeout, else the job's, else the default.
pub fn step_timeout(job: &JobRecipe, step: &Step) -> Result<Duration, TriggerError> {
    if !step.timeout.is_empty() {
        return parse_step_timeout(&step.timeout);
    }
    if job.container_timeout_secs > 0 {
        return Ok(Duration::from_secs(job.container_timeout_secs));
    }
    Ok(DEFAULT_STEP_TIMEOUT)
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
