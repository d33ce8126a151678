// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use lemc_core::{job_group, Job, JobDetail, ScheduledJob, Step, StepJob, Trigger};
use lemc_storage::{MemoryQueue, QueueStore};
use std::sync::Arc;
use std::time::Duration;

fn setup() -> (Queues, Arc<RunningState>) {
    let running = Arc::new(RunningState::new());
    let queue = |name| -> Arc<dyn QueueStore> { Arc::new(MemoryQueue::new(name, Arc::clone(&running))) };
    (Queues::new(queue(QueueName::Now), queue(QueueName::In), queue(QueueName::Every)), running)
}

#[test]
fn fresh_job_is_idle() {
    let (queues, running) = setup();
    let status = job_status(&JobRecipe::builder().build(), &queues, &running).unwrap();
    assert!(status.is_idle());
}

#[test]
fn reports_pending_and_running() {
    let (queues, running) = setup();
    let job = JobRecipe::builder().build();
    running.add(&job_key(&job, QueueName::Now).unwrap());
    let step_job = StepJob { step: Step::builder().trigger("in.1.minutes").build(), recipe_job: job.clone() };
    let detail = JobDetail::new(Job::Step(step_job), job_key(&job, QueueName::In).unwrap(), job_group(&job));
    queues
        .get(QueueName::In)
        .push(ScheduledJob { detail, trigger: Trigger::run_once(Duration::from_secs(60)), next_run_time: 77 })
        .unwrap();

    let status = job_status(&job, &queues, &running).unwrap();

    assert_eq!(status.now, KeyStatus::Running);
    assert_eq!(status.get(QueueName::In), KeyStatus::Pending { next_run_time: 77 });
    assert_eq!(status.every, KeyStatus::Idle);
    assert!(!status.is_idle());
}

#[test]
fn unsupported_scope_is_key_error() {
    let (queues, running) = setup();
    let job = JobRecipe::builder().scope("team").build();
    assert!(matches!(job_status(&job, &queues, &running), Err(StatusError::Key(_))));
}
