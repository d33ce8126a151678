// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! App directory: which apps exist, what cookbook they carry, and which API
//! keys may reach them over MCP.

use std::path::PathBuf;

use async_trait::async_trait;
use lemc_core::Cookbook;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("failed to read app directory {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid app directory {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppRecord {
    pub id: i64,
    pub uuid: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub account_id: i64,
    #[serde(default)]
    pub mcp_enabled: bool,
    #[serde(default)]
    pub cookbook: Cookbook,
}

/// Identity behind an API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ApiUser {
    pub user_id: i64,
    pub account_id: i64,
}

#[async_trait]
pub trait AppDirectory: Send + Sync {
    /// Resolve `api_key` and the app it may reach. `None` when the key is
    /// unknown or the app belongs to another account.
    async fn authorize(&self, app_uuid: &str, api_key: &str) -> Result<Option<(AppRecord, ApiUser)>, DirectoryError>;

    /// One page (1-based) of the apps visible to `user`, plus the total count.
    async fn apps_page(&self, user: &ApiUser, page: i64, limit: i64) -> Result<(Vec<AppRecord>, i64), DirectoryError>;
}

#[derive(Debug, Default, Deserialize)]
struct DirectoryFile {
    #[serde(default)]
    apps: Vec<AppRecord>,
    #[serde(default)]
    api_keys: Vec<ApiKeyRecord>,
}

#[derive(Debug, Deserialize)]
struct ApiKeyRecord {
    key: String,
    #[serde(flatten)]
    user: ApiUser,
}

/// Directory backed by a JSON file, re-read on every lookup so edits apply
/// without a restart. A missing file is an empty directory.
pub struct JsonDirectory {
    path: PathBuf,
}

impl JsonDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn load(&self) -> Result<DirectoryFile, DirectoryError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(DirectoryFile::default()),
            Err(source) => return Err(DirectoryError::Io { path: self.path.clone(), source }),
        };
        serde_json::from_str(&text).map_err(|source| DirectoryError::Parse { path: self.path.clone(), source })
    }
}

#[async_trait]
impl AppDirectory for JsonDirectory {
    async fn authorize(&self, app_uuid: &str, api_key: &str) -> Result<Option<(AppRecord, ApiUser)>, DirectoryError> {
        let file = self.load().await?;
        let Some(user) = file.api_keys.iter().find(|k| k.key == api_key).map(|k| k.user) else {
            return Ok(None);
        };
        Ok(file
            .apps
            .into_iter()
            .find(|app| app.uuid == app_uuid && app.account_id == user.account_id)
            .map(|app| (app, user)))
    }

    async fn apps_page(&self, user: &ApiUser, page: i64, limit: i64) -> Result<(Vec<AppRecord>, i64), DirectoryError> {
        let file = self.load().await?;
        let visible: Vec<AppRecord> = file.apps.into_iter().filter(|a| a.account_id == user.account_id).collect();
        let total = visible.len() as i64;
        let skip = usize::try_from((page.max(1) - 1).saturating_mul(limit)).unwrap_or(usize::MAX);
        let take = usize::try_from(limit).unwrap_or(0);
        Ok((visible.into_iter().skip(skip).take(take).collect(), total))
    }
}

#[cfg(test)]
#[path = "apps_tests.rs"]
mod tests;
