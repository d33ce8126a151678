// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Where a submission currently stands in each trigger class.

use lemc_core::{job_key, JobRecipe, KeyError, QueueName, RunningState};
use lemc_storage::QueueError;
use thiserror::Error;

use crate::queues::Queues;

#[derive(Debug, Error)]
pub enum StatusError {
    #[error(transparent)]
    Key(#[from] KeyError),
    #[error(transparent)]
    Queue(#[from] QueueError),
}

/// State of one derived key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStatus {
    Idle,
    /// Filed and waiting; epoch nanoseconds of the next fire.
    Pending { next_run_time: i64 },
    Running,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobStatus {
    pub now: KeyStatus,
    pub in_: KeyStatus,
    pub every: KeyStatus,
}

impl JobStatus {
    pub fn get(&self, queue: QueueName) -> KeyStatus {
        match queue {
            QueueName::Now => self.now,
            QueueName::In => self.in_,
            QueueName::Every => self.every,
        }
    }

    pub fn is_idle(&self) -> bool {
        QueueName::ALL.iter().all(|q| self.get(*q) == KeyStatus::Idle)
    }
}

/// Running wins over pending: a recurring job is both while it executes.
pub fn job_status(job: &JobRecipe, queues: &Queues, running: &RunningState) -> Result<JobStatus, StatusError> {
    let status = |queue: QueueName| -> Result<KeyStatus, StatusError> {
        let key = job_key(job, queue)?;
        if running.is_running(&key) {
            return Ok(KeyStatus::Running);
        }
        match queues.get(queue).store().get(&key) {
            Ok(filed) => Ok(KeyStatus::Pending { next_run_time: filed.next_run_time }),
            Err(e) if e.is_not_found() => Ok(KeyStatus::Idle),
            Err(e) => Err(e.into()),
        }
    };
    Ok(JobStatus {
        now: status(QueueName::Now)?,
        in_: status(QueueName::In)?,
        every: status(QueueName::Every)?,
    })
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
