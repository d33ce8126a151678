// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Queue storage capability.

use std::path::PathBuf;

use lemc_core::{QueueName, ScheduledJob, ValidationError};
use thiserror::Error;

use crate::record::RecordError;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("no jobs found")]
    NotFound,
    #[error("queue io: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt queue record {}: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: RecordError,
    },
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("job kind does not belong in the {0} queue")]
    WrongJobKind(QueueName),
}

impl QueueError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

/// Priority queue of scheduled jobs ordered by next run time.
///
/// Every operation holds the queue's own lock for its full duration.
/// `pop` is the single dispatch point: it removes the head and marks its key
/// running before returning it.
pub trait QueueStore: Send + Sync {
    fn name(&self) -> QueueName;

    /// Store a job. Returns the next run time it was filed under, which is
    /// bumped past any existing entry with the same time.
    fn push(&self, job: ScheduledJob) -> Result<i64, QueueError>;

    fn pop(&self) -> Result<ScheduledJob, QueueError>;

    fn head(&self) -> Result<ScheduledJob, QueueError>;

    fn get(&self, key: &str) -> Result<ScheduledJob, QueueError>;

    fn remove(&self, key: &str) -> Result<ScheduledJob, QueueError>;

    fn size(&self) -> Result<usize, QueueError>;

    fn clear(&self) -> Result<(), QueueError>;

    /// All readable entries in dispatch order.
    fn scheduled_jobs(&self) -> Result<Vec<ScheduledJob>, QueueError>;
}

/// Reject jobs that cannot be trusted or do not belong in `queue`.
pub(crate) fn check(queue: QueueName, job: &ScheduledJob) -> Result<(), QueueError> {
    lemc_core::validate_scheduled(job)?;
    if !job.fits(queue) {
        return Err(QueueError::WrongJobKind(queue));
    }
    Ok(())
}
