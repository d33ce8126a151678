// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic job keys and groups.
//!
//! Identical submissions (same user, page, uuid and scope) always map to the
//! same key; the key is the unit of mutual exclusion and queue lookup.

use thiserror::Error;

use crate::job::JobRecipe;
use crate::scope::{QueueName, Scope};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("job key: unsupported scope {0:?}")]
    UnsupportedScope(String),
    #[error("job key: recipe has neither an app id nor a cookbook id")]
    MissingEntityId,
}

/// Derive the key for `recipe` in `queue`.
pub fn job_key(recipe: &JobRecipe, queue: QueueName) -> Result<String, KeyError> {
    let scope: Scope = recipe
        .scope
        .parse()
        .map_err(|_| KeyError::UnsupportedScope(recipe.scope.clone()))?;
    let (kind, id_label, id) = if !recipe.app_id.is_empty() {
        ("app", "appid", &recipe.app_id)
    } else if !recipe.cookbook_id.is_empty() {
        ("cookbook", "cookbookid", &recipe.cookbook_id)
    } else {
        return Err(KeyError::MissingEntityId);
    };

    let tail = format!("[page:{}][uuid:{}][queue:{}]", recipe.page_id, recipe.uuid, queue);
    Ok(match scope {
        Scope::Shared => format!("[{kind}][shared][{id_label}:{id}]{tail}"),
        Scope::Individual => format!("[{kind}][individual][userid:{}]{tail}", recipe.user_id),
    })
}

/// Group shared by every job of one submission.
pub fn job_group(recipe: &JobRecipe) -> String {
    format!("[userid:{}][page:{}][uuid:{}][group]", recipe.user_id, recipe.page_id, recipe.uuid)
}

#[cfg(test)]
#[path = "key_tests.rs"]
mod tests;
