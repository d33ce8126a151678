// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use lemc_core::{Job, JobDetail, JobRecipe, RunningState, Trigger};
use lemc_storage::MemoryQueue;
use std::time::Duration;

fn queues() -> Queues {
    let running = Arc::new(RunningState::new());
    Queues::new(
        Arc::new(MemoryQueue::new(QueueName::Now, running.clone())),
        Arc::new(MemoryQueue::new(QueueName::In, running.clone())),
        Arc::new(MemoryQueue::new(QueueName::Every, running)),
    )
}

fn job(key: &str, nrt: i64) -> ScheduledJob {
    let detail = JobDetail::new(Job::Recipe(JobRecipe::builder().build()), key.to_string(), "g".to_string());
    ScheduledJob { detail, trigger: Trigger::run_once(Duration::from_millis(100)), next_run_time: nrt }
}

#[test]
fn get_maps_names() {
    let queues = queues();
    for name in QueueName::ALL {
        assert_eq!(queues.get(name).name(), name);
    }
    assert_eq!(queues.iter().count(), 3);
}

#[test]
fn evict_removes_every_record_for_key() {
    let queues = queues();
    let now = queues.get(QueueName::Now);
    now.push(job("k", 10)).unwrap();
    now.push(job("k", 20)).unwrap();
    now.push(job("other", 30)).unwrap();

    assert_eq!(now.evict("k").unwrap(), 2);
    assert_eq!(now.evict("k").unwrap(), 0);
    assert_eq!(now.store().size().unwrap(), 1);
}

#[tokio::test]
async fn push_wakes_scheduler() {
    let queues = queues();
    let handle = queues.get(QueueName::Now).clone();
    handle.push(job("k", 10)).unwrap();
    // permit stored before anyone waits
    tokio::time::timeout(Duration::from_millis(100), handle.wake().notified()).await.unwrap();
}
