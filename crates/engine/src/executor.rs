// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job execution: the closed dispatch over recipe and step jobs.

use std::sync::Arc;

use lemc_adapters::{Broadcaster, ContainerRuntime};
use lemc_core::{
    job_group, job_key, Clock, Job, JobDetail, JobRecipe, KeyError, QueueName, RunningGuard,
    RunningState, ScheduledJob, Step, StepJob, StepTrigger, Trigger, TriggerError,
};
use lemc_storage::QueueError;
use lemc_wire::mcp::{JOB_FINISHED, JOB_STARTED};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::queues::Queues;
use crate::route::Route;
use crate::runner::{RunnerError, StepRunner};
use crate::EngineDeps;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error(transparent)]
    Key(#[from] KeyError),
    #[error(transparent)]
    Trigger(#[from] TriggerError),
    #[error(transparent)]
    Queue(#[from] QueueError),
    #[error(transparent)]
    Step(#[from] RunnerError),
    #[error("a NOW job is already running for this recipe")]
    NowRunning,
}

/// Runs popped jobs.
pub struct Executor<R, B, C> {
    runner: StepRunner<R, B, C>,
    broadcaster: B,
    queues: Queues,
    running: Arc<RunningState>,
    clock: C,
}

impl<R, B, C> Executor<R, B, C>
where
    R: ContainerRuntime,
    B: Broadcaster,
    C: Clock,
{
    pub fn new(deps: &EngineDeps<R, B, C>) -> Self {
        Self {
            runner: StepRunner::new(
                deps.runtime.clone(),
                deps.broadcaster.clone(),
                Arc::clone(&deps.locker),
                deps.clock.clone(),
            ),
            broadcaster: deps.broadcaster.clone(),
            queues: deps.queues.clone(),
            running: Arc::clone(&deps.running),
            clock: deps.clock.clone(),
        }
    }

    /// Execute a job handed out by `pop`.
    ///
    /// `pop` marked the job's key running; that mark is released when this
    /// returns, whatever the outcome.
    pub async fn execute(&self, job: ScheduledJob, cancel: &CancellationToken) -> Result<(), ExecError> {
        let ScheduledJob { detail, .. } = job;
        let _popped = RunningGuard::adopt(Arc::clone(&self.running), detail.key.clone());
        tracing::info!(job_key = %detail.key, job = %detail.job.description(), "executing job");
        match detail.job {
            Job::Recipe(recipe) => self.execute_recipe(recipe, cancel).await,
            Job::Step(step_job) => self.execute_step(step_job, cancel).await,
        }
    }

    async fn execute_recipe(&self, mut job: JobRecipe, cancel: &CancellationToken) -> Result<(), ExecError> {
        let app = Route::for_job(&job).app();
        if let Some(app_id) = app {
            self.broadcaster.send_to_app(app_id, Arc::from(JOB_STARTED));
        }

        let steps = job.recipe.steps.clone();
        for step in steps {
            job.step_id = step.step.to_string();
            match StepTrigger::parse(step.trigger.trim())? {
                StepTrigger::Now => {
                    let outcome = self.runner.run(&job, &step, cancel).await?;
                    job.env.extend(outcome.env);
                }
                StepTrigger::In(delay) => self.schedule_step(&job, step, Trigger::run_once(delay))?,
                StepTrigger::Every(interval) => self.schedule_step(&job, step, Trigger::simple(interval))?,
            }
        }

        if let Some(app_id) = app {
            self.broadcaster.send_to_app(app_id, Arc::from(JOB_FINISHED));
        }
        Ok(())
    }

    /// Re-package one step for the delayed or recurring queue.
    fn schedule_step(&self, job: &JobRecipe, step: Step, trigger: Trigger) -> Result<(), ExecError> {
        let queue = match trigger {
            Trigger::RunOnce { .. } => QueueName::In,
            Trigger::Simple { .. } => QueueName::Every,
        };
        let key = job_key(job, queue)?;
        let step_id = step.step;
        let detail = JobDetail::new(
            Job::Step(StepJob { step, recipe_job: job.clone() }),
            key.clone(),
            job_group(job),
        );
        let next_run_time = trigger.first_fire(self.clock.epoch_nanos());
        let filed = self.queues.get(queue).push(ScheduledJob { detail, trigger, next_run_time })?;
        tracing::info!(job_key = %key, queue = %queue, step = step_id, trigger = %trigger, next_run_time = filed, "step scheduled");
        Ok(())
    }

    async fn execute_step(&self, job: StepJob, cancel: &CancellationToken) -> Result<(), ExecError> {
        let StepJob { step, mut recipe_job } = job;
        let now_key = job_key(&recipe_job, QueueName::Now)?;
        let Some(_now) = RunningGuard::acquire(&self.running, &now_key) else {
            tracing::warn!(job_key = %now_key, step = step.step, "NOW job in flight, skipping step");
            return Err(ExecError::NowRunning);
        };
        recipe_job.step_id = step.step.to_string();
        self.runner.run(&recipe_job, &step, cancel).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
