// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Executable job variants and their scheduling envelope.

use serde::{Deserialize, Serialize};

use crate::recipe::{Recipe, Step};
use crate::scope::{JobType, QueueName, Scope, ScopeError};
use crate::trigger::Trigger;

/// One recipe submission: who ran what, where, with which environment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JobRecipe {
    pub job_type: JobType,
    pub uuid: String,
    #[serde(default)]
    pub cookbook_id: String,
    #[serde(default)]
    pub app_id: String,
    pub user_id: String,
    #[serde(default)]
    pub username: String,
    pub page_id: String,
    #[serde(default)]
    pub step_id: String,
    /// Raw scope text; checked by validation before use.
    pub scope: String,
    #[serde(default)]
    pub env: Vec<String>,
    #[serde(default)]
    pub container_timeout_secs: u64,
    pub recipe: Recipe,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recipient_user_ids: Vec<i64>,
}

impl JobRecipe {
    pub fn scope(&self) -> Result<Scope, ScopeError> {
        self.scope.parse()
    }

    /// `[userid:..][pageid:..][uuid:..][queue:<job type>]`
    pub fn description(&self) -> String {
        format!(
            "[userid:{}][pageid:{}][uuid:{}][queue:{}]",
            self.user_id, self.page_id, self.uuid, self.job_type
        )
    }
}

crate::builder! {
    pub struct JobRecipeBuilder => JobRecipe {
        into {
            uuid: String = "3f0c5d1e-aaaa-bbbb-cccc-000000000001",
            cookbook_id: String = "",
            app_id: String = "7",
            user_id: String = "42",
            username: String = "alice",
            page_id: String = "1",
            step_id: String = "",
            scope: String = "individual",
        }
        set {
            job_type: JobType = JobType::App,
            env: Vec<String> = Vec::new(),
            container_timeout_secs: u64 = 0,
            recipe: Recipe = Recipe {
                name: "hello".into(),
                steps: vec![Step::builder().build()],
                ..Default::default()
            },
            recipient_user_ids: Vec<i64> = Vec::new(),
        }
    }
}

/// A single step re-packaged for the delayed or recurring queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepJob {
    pub step: Step,
    pub recipe_job: JobRecipe,
}

impl StepJob {
    pub fn description(&self) -> String {
        format!("StepJob: {}", self.step.trigger)
    }
}

/// The two executable variants, dispatched by a closed match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    Recipe(JobRecipe),
    Step(StepJob),
}

impl Job {
    pub fn description(&self) -> String {
        match self {
            Self::Recipe(r) => r.description(),
            Self::Step(s) => s.description(),
        }
    }

    /// Submission this job belongs to.
    pub fn recipe_job(&self) -> &JobRecipe {
        match self {
            Self::Recipe(r) => r,
            Self::Step(s) => &s.recipe_job,
        }
    }

    pub fn is_step(&self) -> bool {
        matches!(self, Self::Step(_))
    }
}

/// Scheduler options carried with every job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobOptions {
    pub max_retries: u32,
    /// Nanoseconds between retries
    pub retry_interval: u64,
    pub replace: bool,
    pub suspended: bool,
}

/// The executable unit plus its identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDetail {
    pub job: Job,
    pub key: String,
    pub group: String,
    pub options: JobOptions,
}

impl JobDetail {
    pub fn new(job: Job, key: String, group: String) -> Self {
        Self { job, key, group, options: JobOptions::default() }
    }
}

/// A job bound to its trigger and next fire time (epoch nanoseconds).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledJob {
    pub detail: JobDetail,
    pub trigger: Trigger,
    pub next_run_time: i64,
}

impl ScheduledJob {
    pub fn key(&self) -> &str {
        &self.detail.key
    }

    /// Whether this job may live in `queue`.
    pub fn fits(&self, queue: QueueName) -> bool {
        match queue {
            QueueName::Now => !self.detail.job.is_step(),
            QueueName::In | QueueName::Every => self.detail.job.is_step(),
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
