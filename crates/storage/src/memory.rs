// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory queue with the same ordering and dispatch semantics as the
//! file-backed one.

use std::collections::BTreeMap;
use std::sync::Arc;

use lemc_core::{QueueName, RunningState, ScheduledJob};
use parking_lot::Mutex;

use crate::store::{check, QueueError, QueueStore};

pub struct MemoryQueue {
    name: QueueName,
    running: Arc<RunningState>,
    jobs: Mutex<BTreeMap<i64, ScheduledJob>>,
}

impl MemoryQueue {
    pub fn new(name: QueueName, running: Arc<RunningState>) -> Self {
        Self { name, running, jobs: Mutex::new(BTreeMap::new()) }
    }
}

impl QueueStore for MemoryQueue {
    fn name(&self) -> QueueName {
        self.name
    }

    fn push(&self, mut job: ScheduledJob) -> Result<i64, QueueError> {
        check(self.name, &job)?;
        let mut jobs = self.jobs.lock();
        while jobs.contains_key(&job.next_run_time) {
            job.next_run_time = job.next_run_time.saturating_add(1);
        }
        let nrt = job.next_run_time;
        jobs.insert(nrt, job);
        Ok(nrt)
    }

    fn pop(&self) -> Result<ScheduledJob, QueueError> {
        let (_, job) = self.jobs.lock().pop_first().ok_or(QueueError::NotFound)?;
        self.running.add(&job.detail.key);
        Ok(job)
    }

    fn head(&self) -> Result<ScheduledJob, QueueError> {
        self.jobs.lock().values().next().cloned().ok_or(QueueError::NotFound)
    }

    fn get(&self, key: &str) -> Result<ScheduledJob, QueueError> {
        self.jobs.lock().values().find(|j| j.detail.key == key).cloned().ok_or(QueueError::NotFound)
    }

    fn remove(&self, key: &str) -> Result<ScheduledJob, QueueError> {
        let mut jobs = self.jobs.lock();
        let nrt = jobs
            .iter()
            .find(|(_, j)| j.detail.key == key)
            .map(|(nrt, _)| *nrt)
            .ok_or(QueueError::NotFound)?;
        jobs.remove(&nrt).ok_or(QueueError::NotFound)
    }

    fn size(&self) -> Result<usize, QueueError> {
        Ok(self.jobs.lock().len())
    }

    fn clear(&self) -> Result<(), QueueError> {
        self.jobs.lock().clear();
        Ok(())
    }

    fn scheduled_jobs(&self) -> Result<Vec<ScheduledJob>, QueueError> {
        Ok(self.jobs.lock().values().cloned().collect())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
