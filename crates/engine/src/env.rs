// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Container environment materialization.
//!
//! A submission's environment is built once from the cookbook and the
//! submitted form; each step then layers its own system and user variables
//! on top.

use std::sync::LazyLock;

use lemc_core::{alnum_hyphen, Cookbook, JobRecipe, JobType, Scope, Step};
use regex::Regex;
use thiserror::Error;

#[allow(clippy::expect_used)]
static FORM_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("constant regex pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("recipe {recipe:?} not found on page {page}")]
    RecipeNotFound { page: u32, recipe: String },
    #[error("invalid characters in form field name {0:?}")]
    FormField(String),
}

/// Everything a caller supplies to run one recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeRequest {
    pub job_type: JobType,
    pub uuid: String,
    /// App id or cookbook id, per `job_type`
    pub entity_id: String,
    pub page: u32,
    pub recipe: String,
    pub user_id: i64,
    pub username: String,
    pub scope: Scope,
    /// Submitted form values, in submission order
    pub form: Vec<(String, String)>,
    pub recipient_user_ids: Vec<i64>,
}

impl RecipeRequest {
    /// Resolve the recipe in `cookbook` and build the job to submit.
    pub fn build(&self, cookbook: &Cookbook) -> Result<JobRecipe, RequestError> {
        let recipe = cookbook.find_recipe(self.page, &self.recipe).ok_or_else(|| {
            RequestError::RecipeNotFound { page: self.page, recipe: self.recipe.clone() }
        })?;

        let mut env = Vec::new();
        env.extend(cookbook.environment.private.iter().cloned());
        env.extend(cookbook.environment.public.iter().cloned());
        for (name, value) in &self.form {
            if !FORM_NAME.is_match(name) {
                return Err(RequestError::FormField(name.clone()));
            }
            env.push(format!("{}={value}", name.to_uppercase()));
        }
        env.push("LEMC_STEP_ID=1".to_string());
        env.push(format!("LEMC_SCOPE={}", self.scope));
        env.push(format!("LEMC_USER_ID={}", self.user_id));
        env.push(format!("LEMC_USERNAME={}", self.username));
        env.push(format!("LEMC_UUID={}", self.uuid));
        env.push(format!("LEMC_RECIPE_NAME={}", alnum_hyphen(&recipe.name)));
        env.push(format!("LEMC_PAGE_ID={}", self.page));
        env.push(format!("LEMC_HTTP_DOWNLOAD_BASE_URL={}", download_base_url(&self.uuid, self.page, self.scope)));

        let (app_id, cookbook_id) = match self.job_type {
            JobType::App => (self.entity_id.clone(), String::new()),
            JobType::Cookbook => (String::new(), self.entity_id.clone()),
        };
        Ok(JobRecipe {
            job_type: self.job_type,
            uuid: self.uuid.clone(),
            cookbook_id,
            app_id,
            user_id: self.user_id.to_string(),
            username: self.username.clone(),
            page_id: self.page.to_string(),
            step_id: String::new(),
            scope: self.scope.to_string(),
            env,
            container_timeout_secs: 0,
            recipe: recipe.clone(),
            recipient_user_ids: match self.scope {
                Scope::Shared => self.recipient_user_ids.clone(),
                Scope::Individual => Vec::new(),
            },
        })
    }
}

pub fn download_base_url(uuid: &str, page: u32, scope: Scope) -> String {
    format!("/lemc/locker/uuid/{uuid}/page/{page}/scope/{scope}/filename/")
}

/// Environment for one step's container: the job's environment, then the
/// step's system variables, then the step's own variables.
pub fn step_env(job: &JobRecipe, step: &Step) -> Vec<String> {
    let mut env = job.env.clone();
    env.push("PYTHONUNBUFFERED=1".to_string());
    env.push(format!("LEMC_STEP_ID={}", step.step));
    let id = format!("uuid-{}-pageid-{}-scope-{}", job.uuid, job.page_id, job.scope);
    env.push(format!("LEMC_HTML_ID={id}-html"));
    env.push(format!("LEMC_CSS_ID={id}-style"));
    env.push(format!("LEMC_JS_ID={id}-script"));
    env.extend(step.env_vars().iter().cloned());
    env
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
