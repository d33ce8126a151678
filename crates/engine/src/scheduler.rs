// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-queue dispatch loop.
//!
//! Peek at the head, sleep until it is due (or a push wakes us), pop it,
//! re-file recurring jobs, and hand the job to a bounded worker pool.

use std::sync::Arc;
use std::time::Duration;

use lemc_adapters::{Broadcaster, ContainerRuntime};
use lemc_core::{duration_nanos, Clock, QueueName, RunningState, ScheduledJob};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::executor::Executor;
use crate::queues::QueueHandle;

/// Scheduler tuning shared by all queues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Concurrent executions per queue.
    pub worker_limit: usize,
    /// Longest sleep between looks at the queue head.
    pub poll: Duration,
    /// Lateness after which a due job is logged as outdated.
    pub outdated: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            worker_limit: 10,
            poll: Duration::from_millis(250),
            outdated: Duration::from_millis(1000),
        }
    }
}

pub struct Scheduler<R, B, C> {
    queue: QueueHandle,
    executor: Arc<Executor<R, B, C>>,
    running: Arc<RunningState>,
    clock: C,
    config: SchedulerConfig,
    workers: Arc<Semaphore>,
    tracker: TaskTracker,
}

impl<R, B, C> Scheduler<R, B, C>
where
    R: ContainerRuntime,
    B: Broadcaster,
    C: Clock,
{
    pub fn new(
        queue: QueueHandle,
        executor: Arc<Executor<R, B, C>>,
        running: Arc<RunningState>,
        clock: C,
        config: SchedulerConfig,
        tracker: TaskTracker,
    ) -> Self {
        let workers = Arc::new(Semaphore::new(config.worker_limit.max(1)));
        Self { queue, executor, running, clock, config, workers, tracker }
    }

    /// Dispatch until `stop` fires. Executions receive `abort`.
    pub async fn run(self, stop: CancellationToken, abort: CancellationToken) {
        let name = self.queue.name();
        tracing::info!(queue = %name, workers = self.config.worker_limit, "scheduler started");
        loop {
            if let Some(wait) = self.until_due() {
                tokio::select! {
                    _ = stop.cancelled() => break,
                    _ = tokio::time::sleep(wait) => {}
                    _ = self.queue.wake().notified() => {}
                }
                continue;
            }

            let permit = tokio::select! {
                _ = stop.cancelled() => break,
                permit = Arc::clone(&self.workers).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };
            let Some(job) = self.pop_due() else {
                continue;
            };

            let executor = Arc::clone(&self.executor);
            let abort = abort.clone();
            self.tracker.spawn(async move {
                let _permit = permit;
                let key = job.key().to_string();
                if let Err(e) = executor.execute(job, &abort).await {
                    tracing::warn!(queue = %name, job_key = %key, error = %e, "job failed");
                }
            });
        }
        tracing::info!(queue = %name, "scheduler stopped");
    }

    /// How long to sleep before the head is due, or `None` when it is due now.
    fn until_due(&self) -> Option<Duration> {
        match self.queue.store().head() {
            Ok(head) => {
                let remaining = head.next_run_time.saturating_sub(self.clock.epoch_nanos());
                if remaining <= 0 {
                    return None;
                }
                let remaining = Duration::from_nanos(u64::try_from(remaining).unwrap_or(u64::MAX));
                Some(remaining.min(self.config.poll))
            }
            Err(e) if e.is_not_found() => Some(self.config.poll),
            Err(e) => {
                tracing::warn!(queue = %self.queue.name(), error = %e, "queue head unreadable");
                Some(self.config.poll)
            }
        }
    }

    /// Pop the head if it is still due and re-file it when its trigger recurs.
    fn pop_due(&self) -> Option<ScheduledJob> {
        let name = self.queue.name();
        let job = match self.queue.store().pop() {
            Ok(job) => job,
            Err(e) if e.is_not_found() => return None,
            Err(e) => {
                tracing::warn!(queue = %name, error = %e, "pop failed");
                return None;
            }
        };

        let now = self.clock.epoch_nanos();
        if job.next_run_time > now {
            // the head we slept on was removed and a later job took its place
            if name != QueueName::Now {
                self.running.remove(job.key());
            }
            if let Err(e) = self.queue.store().push(job) {
                tracing::warn!(queue = %name, error = %e, "failed to re-file early job");
            }
            return None;
        }

        let late = now.saturating_sub(job.next_run_time);
        if late > duration_nanos(self.config.outdated) {
            tracing::info!(queue = %name, job_key = %job.key(), late_ms = late / 1_000_000, "executing outdated job");
        }

        if let Some(next_run_time) = job.trigger.next_fire(job.next_run_time, now) {
            let mut again = job.clone();
            again.next_run_time = next_run_time;
            match self.queue.store().push(again) {
                Ok(filed) => tracing::debug!(queue = %name, job_key = %job.key(), next_run_time = filed, "recurring job re-filed"),
                Err(e) => tracing::warn!(queue = %name, job_key = %job.key(), error = %e, "failed to re-file recurring job"),
            }
        }
        Some(job)
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
