// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The engine service object: constructed once, passed by handle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use lemc_adapters::{Broadcaster, ContainerRuntime};
use lemc_core::{Clock, JobRecipe, RunningState};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::executor::Executor;
use crate::queues::Queues;
use crate::scheduler::{Scheduler, SchedulerConfig};
use crate::status::{job_status, JobStatus, StatusError};
use crate::submit::{SubmitError, Submitter};
use crate::EngineDeps;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub scheduler: SchedulerConfig,
    /// How long shutdown waits for in-flight jobs before cancelling them.
    pub drain_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { scheduler: SchedulerConfig::default(), drain_timeout: Duration::from_millis(5000) }
    }
}

pub struct Engine<R, B, C> {
    deps: EngineDeps<R, B, C>,
    config: EngineConfig,
    executor: Arc<Executor<R, B, C>>,
    submitter: Submitter<R, C>,
    schedulers: TaskTracker,
    workers: TaskTracker,
    stop: CancellationToken,
    abort: CancellationToken,
    started: AtomicBool,
}

impl<R, B, C> Engine<R, B, C>
where
    R: ContainerRuntime,
    B: Broadcaster,
    C: Clock,
{
    pub fn new(deps: EngineDeps<R, B, C>, config: EngineConfig) -> Self {
        let executor = Arc::new(Executor::new(&deps));
        let submitter = Submitter::new(
            deps.runtime.clone(),
            Arc::clone(&deps.locker),
            deps.queues.clone(),
            Arc::clone(&deps.running),
            deps.clock.clone(),
        );
        Self {
            deps,
            config,
            executor,
            submitter,
            schedulers: TaskTracker::new(),
            workers: TaskTracker::new(),
            stop: CancellationToken::new(),
            abort: CancellationToken::new(),
            started: AtomicBool::new(false),
        }
    }

    /// Spawn one scheduler per queue. Calling again is a no-op.
    pub fn start(&self) {
        if self.started.swap(true, Ordering::SeqCst) {
            return;
        }
        for queue in self.deps.queues.iter() {
            let scheduler = Scheduler::new(
                queue.clone(),
                Arc::clone(&self.executor),
                Arc::clone(&self.deps.running),
                self.deps.clock.clone(),
                self.config.scheduler,
                self.workers.clone(),
            );
            self.schedulers.spawn(scheduler.run(self.stop.clone(), self.abort.clone()));
        }
    }

    pub async fn submit(&self, job: JobRecipe) -> Result<String, SubmitError> {
        self.submitter.submit(job).await
    }

    pub fn status(&self, job: &JobRecipe) -> Result<JobStatus, StatusError> {
        job_status(job, &self.deps.queues, &self.deps.running)
    }

    pub fn queues(&self) -> &Queues {
        &self.deps.queues
    }

    pub fn running(&self) -> &Arc<RunningState> {
        &self.deps.running
    }

    pub fn broadcaster(&self) -> &B {
        &self.deps.broadcaster
    }

    /// Stop dispatching, then give in-flight jobs the drain budget.
    ///
    /// Returns `false` when jobs had to be cancelled.
    pub async fn shutdown(&self) -> bool {
        self.stop.cancel();
        self.schedulers.close();
        self.schedulers.wait().await;

        self.workers.close();
        let in_flight = self.workers.len();
        if tokio::time::timeout(self.config.drain_timeout, self.workers.wait()).await.is_ok() {
            tracing::info!(in_flight, "engine drained");
            return true;
        }
        tracing::warn!(
            in_flight = self.workers.len(),
            drain_ms = self.config.drain_timeout.as_millis() as u64,
            "drain timeout exceeded, cancelling jobs"
        );
        self.abort.cancel();
        self.workers.wait().await;
        false
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
