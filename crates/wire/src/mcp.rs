// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! MCP method payloads.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Broadcast to an app's MCP clients around each recipe run.
pub const JOB_STARTED: &str = "--MCP JOB STARTED--";
pub const JOB_FINISHED: &str = "--MCP JOB FINISHED--";

pub const RUN_RECIPE_TOOL: &str = "run-recipe";
pub const DEFAULT_APPS_LIMIT: i64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecipeInfo {
    pub name: String,
    pub description: String,
    pub action: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecipeSummary {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageInfo {
    pub id: u32,
    pub name: String,
    pub wiki: String,
    pub recipes: Vec<RecipeInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppInfo {
    pub uuid: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(rename = "inputSchema", default, skip_serializing_if = "Value::is_null")]
    pub input_schema: Value,
}

impl ToolDescriptor {
    /// The single tool every app exposes.
    pub fn run_recipe() -> Self {
        Self {
            name: RUN_RECIPE_TOOL.to_string(),
            description: "Run a recipe by page and name".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "page": {"type": "integer"},
                    "recipe": {"type": "string"},
                },
                "required": ["page", "recipe"],
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCallParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

/// Arguments of `lemc.run` and of the `run-recipe` tool
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunParams {
    pub page: u32,
    pub recipe: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppsParams {
    #[serde(default)]
    pub page: i64,
    #[serde(default)]
    pub limit: i64,
}

impl AppsParams {
    /// Clamp to page >= 1 and fall back to the default limit.
    pub fn normalized(self) -> Self {
        Self {
            page: self.page.max(1),
            limit: if self.limit < 1 { DEFAULT_APPS_LIMIT } else { self.limit },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppsResult {
    pub apps: Vec<AppInfo>,
    pub page: i64,
    pub total_pages: i64,
}

/// Number of pages needed for `total` items.
pub fn total_pages(total: i64, limit: i64) -> i64 {
    if total <= 0 || limit <= 0 {
        return 0;
    }
    (total + limit - 1) / limit
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceDescriptor {
    pub uri: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(rename = "mimeType", default, skip_serializing_if = "String::is_empty")]
    pub mime_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceContent {
    pub uri: String,
    #[serde(rename = "mimeType", default, skip_serializing_if = "String::is_empty")]
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub blob: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReadParams {
    pub uri: String,
}

pub fn wiki_uri(app_uuid: &str, page: u32) -> String {
    format!("lemc://app/{app_uuid}/wiki/{page}")
}

/// Page number of a `lemc://app/<uuid>/wiki/<page>` uri.
pub fn parse_wiki_uri(uri: &str) -> Option<u32> {
    let rest = uri.strip_prefix("lemc://app/")?;
    let (app, page) = rest.split_once("/wiki/")?;
    if app.is_empty() || app.contains('/') || page.is_empty() || !page.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    page.parse().ok()
}

/// Browser path that runs a shared recipe.
pub fn recipe_action(app_uuid: &str, page: u32, recipe: &str) -> String {
    format!("/lemc/app/job/shared/uuid/{app_uuid}/page/{page}/recipe/{recipe}")
}

#[cfg(test)]
#[path = "mcp_tests.rs"]
mod tests;
