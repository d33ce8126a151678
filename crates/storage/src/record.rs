// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Queue file codec.
//!
//! One JSON document per pending job. The `now` queue stores the whole
//! recipe job; `in` and `every` store a single step job. The trigger is kept
//! as its textual description and rebuilt on decode.

use lemc_core::{
    Job, JobDetail, JobOptions, JobRecipe, QueueName, ScheduledJob, StepJob, Trigger, TriggerError,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("record json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("record trigger: {0}")]
    Trigger(#[from] TriggerError),
}

#[derive(Serialize, Deserialize)]
struct Record<J> {
    job: J,
    job_key: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    group: String,
    #[serde(default)]
    job_options: Option<JobOptions>,
    trigger: String,
    next_run_time: i64,
}

impl<J> Record<J> {
    fn into_scheduled(self, wrap: impl FnOnce(J) -> Job) -> Result<ScheduledJob, RecordError> {
        let trigger: Trigger = self.trigger.parse()?;
        Ok(ScheduledJob {
            detail: JobDetail {
                job: wrap(self.job),
                key: self.job_key,
                group: self.group,
                options: self.job_options.unwrap_or_default(),
            },
            trigger,
            next_run_time: self.next_run_time,
        })
    }
}

fn record<'a, J>(job: &ScheduledJob, payload: &'a J) -> Record<&'a J> {
    Record {
        job: payload,
        job_key: job.detail.key.clone(),
        description: job.detail.job.description(),
        group: job.detail.group.clone(),
        job_options: Some(job.detail.options),
        trigger: job.trigger.to_string(),
        next_run_time: job.next_run_time,
    }
}

/// Serialize a scheduled job to its queue file contents.
pub fn encode(job: &ScheduledJob) -> Result<Vec<u8>, RecordError> {
    let bytes = match &job.detail.job {
        Job::Recipe(r) => serde_json::to_vec_pretty(&record(job, r))?,
        Job::Step(s) => serde_json::to_vec_pretty(&record(job, s))?,
    };
    Ok(bytes)
}

/// Rebuild a scheduled job from a file in `queue`.
pub fn decode(queue: QueueName, bytes: &[u8]) -> Result<ScheduledJob, RecordError> {
    match queue {
        QueueName::Now => serde_json::from_slice::<Record<JobRecipe>>(bytes)?.into_scheduled(Job::Recipe),
        QueueName::In | QueueName::Every => {
            serde_json::from_slice::<Record<StepJob>>(bytes)?.into_scheduled(Job::Step)
        }
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
