// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-app MCP server: subscribed clients plus the JSON-RPC method table.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use lemc_core::{Cookbook, JobType, Scope};
use lemc_engine::RecipeRequest;
use lemc_wire::mcp::{
    self, AppInfo, AppsParams, AppsResult, PageInfo, ReadParams, RecipeInfo, RecipeSummary, ResourceContent,
    ResourceDescriptor, RunParams, ToolCallParams, ToolDescriptor, RUN_RECIPE_TOOL,
};
use lemc_wire::{RpcRequest, RpcResponse};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::apps::{ApiUser, AppDirectory, AppRecord};
use crate::launch::Launcher;

pub const CLIENT_BUFFER: usize = 64;

/// User id recorded on MCP-submitted jobs.
pub const MCP_USER_ID: i64 = 0;
pub const MCP_USERNAME: &str = "mcp";

struct McpClient {
    api_key: String,
    user: ApiUser,
    tx: mpsc::Sender<Arc<str>>,
}

/// Reply channel of a subscribed client.
#[derive(Clone)]
pub struct ClientHandle {
    pub user: ApiUser,
    tx: mpsc::Sender<Arc<str>>,
}

impl ClientHandle {
    /// Queue `message` for the client; false if the client went away.
    pub async fn send(&self, message: Arc<str>) -> bool {
        self.tx.send(message).await.is_ok()
    }
}

pub struct McpServer {
    app_id: i64,
    uuid: String,
    cookbook: Cookbook,
    clients: Mutex<HashMap<u64, McpClient>>,
    next_id: AtomicU64,
}

impl McpServer {
    pub fn new(app: &AppRecord) -> Self {
        Self {
            app_id: app.id,
            uuid: app.uuid.clone(),
            cookbook: app.cookbook.clone(),
            clients: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn app_id(&self) -> i64 {
        self.app_id
    }

    /// Subscribe a client. It stays subscribed until the returned value drops.
    pub fn subscribe(self: &Arc<Self>, user: ApiUser, api_key: &str) -> McpSubscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(CLIENT_BUFFER);
        self.clients.lock().insert(id, McpClient { api_key: api_key.to_string(), user, tx });
        info!(app_id = self.app_id, user_id = user.user_id, "mcp client subscribed");
        McpSubscription { id, rx, server: Arc::clone(self) }
    }

    /// First subscribed client using `api_key`.
    pub fn find_client(&self, api_key: &str) -> Option<ClientHandle> {
        self.clients
            .lock()
            .values()
            .find(|c| c.api_key == api_key)
            .map(|c| ClientHandle { user: c.user, tx: c.tx.clone() })
    }

    pub fn client_count(&self) -> usize {
        self.clients.lock().len()
    }

    /// Non-blocking delivery to every client. Returns how many accepted it.
    pub fn broadcast(&self, message: Arc<str>) -> usize {
        self.clients.lock().values().filter(|c| c.tx.try_send(message.clone()).is_ok()).count()
    }

    /// Answer one request.
    pub async fn handle(
        &self,
        request: &RpcRequest,
        user: &ApiUser,
        launcher: &dyn Launcher,
        directory: &dyn AppDirectory,
    ) -> RpcResponse {
        let id = request.id.clone();
        debug!(app_id = self.app_id, method = %request.method, "mcp request");
        let result = match request.method.as_str() {
            "lemc.pages" => Ok(json!({ "pages": self.pages() })),
            "lemc.recipes" => Ok(json!({ "recipes": self.recipes() })),
            "lemc.apps" => self.apps(request, user, directory).await,
            "lemc.run" => match request.params::<RunParams>() {
                Ok(params) => self.run(params, launcher).await.map(|()| json!("ok")),
                Err(e) => Err(format!("params: {e}")),
            },
            "tools/list" => Ok(json!({ "tools": [ToolDescriptor::run_recipe()] })),
            "tools/call" => self.call_tool(request, launcher).await,
            "resources/list" => Ok(json!({ "resources": self.resources() })),
            "resources/read" => self.read_resource(request),
            other => {
                warn!(app_id = self.app_id, method = other, "unknown mcp method");
                Err(format!("unknown method: {other}"))
            }
        };
        match result {
            Ok(value) => RpcResponse::ok(id, value),
            Err(message) => RpcResponse::error(id, message),
        }
    }

    fn pages(&self) -> Vec<PageInfo> {
        self.cookbook
            .pages
            .iter()
            .map(|page| PageInfo {
                id: page.page,
                name: page.name.clone(),
                wiki: self.cookbook.wiki(page.page).and_then(Result::ok).unwrap_or_default(),
                recipes: page
                    .recipes
                    .iter()
                    .map(|r| RecipeInfo {
                        name: r.name.clone(),
                        description: r.description.clone(),
                        action: mcp::recipe_action(&self.uuid, page.page, &r.name),
                    })
                    .collect(),
            })
            .collect()
    }

    fn recipes(&self) -> Vec<RecipeSummary> {
        self.cookbook
            .pages
            .iter()
            .flat_map(|p| p.recipes.iter())
            .map(|r| RecipeSummary { name: r.name.clone(), description: r.description.clone() })
            .collect()
    }

    async fn apps(&self, request: &RpcRequest, user: &ApiUser, directory: &dyn AppDirectory) -> Result<Value, String> {
        let params = request.params::<AppsParams>().map_err(|e| format!("params: {e}"))?.normalized();
        let (apps, total) =
            directory.apps_page(user, params.page, params.limit).await.map_err(|e| e.to_string())?;
        let result = AppsResult {
            apps: apps
                .into_iter()
                .map(|a| AppInfo { uuid: a.uuid, name: a.name, description: a.description })
                .collect(),
            page: params.page,
            total_pages: mcp::total_pages(total, params.limit),
        };
        serde_json::to_value(result).map_err(|e| e.to_string())
    }

    async fn call_tool(&self, request: &RpcRequest, launcher: &dyn Launcher) -> Result<Value, String> {
        let params = request.params::<ToolCallParams>().map_err(|e| format!("params: {e}"))?;
        if params.name != RUN_RECIPE_TOOL {
            return Err("unknown tool".to_string());
        }
        let args: RunParams = serde_json::from_value(params.arguments).map_err(|e| format!("args: {e}"))?;
        self.run(args, launcher).await?;
        Ok(json!({ "content": [{ "type": "text", "text": "ok" }] }))
    }

    async fn run(&self, params: RunParams, launcher: &dyn Launcher) -> Result<(), String> {
        let request = RecipeRequest {
            job_type: JobType::App,
            uuid: self.uuid.clone(),
            entity_id: self.app_id.to_string(),
            page: params.page,
            recipe: params.recipe,
            user_id: MCP_USER_ID,
            username: MCP_USERNAME.to_string(),
            scope: Scope::Shared,
            form: Vec::new(),
            recipient_user_ids: Vec::new(),
        };
        let job = request.build(&self.cookbook).map_err(|e| e.to_string())?;
        let key = launcher.launch(job).await.map_err(|e| e.to_string())?;
        info!(app_id = self.app_id, job_key = %key, "mcp recipe submitted");
        Ok(())
    }

    fn resources(&self) -> Vec<ResourceDescriptor> {
        self.cookbook
            .pages
            .iter()
            .filter(|p| self.cookbook.wikis.contains_key(&p.page))
            .map(|p| ResourceDescriptor {
                uri: mcp::wiki_uri(&self.uuid, p.page),
                name: format!("Page {} Wiki", p.page),
                description: String::new(),
                mime_type: "text/html".to_string(),
            })
            .collect()
    }

    fn read_resource(&self, request: &RpcRequest) -> Result<Value, String> {
        let params = request.params::<ReadParams>().map_err(|e| format!("params: {e}"))?;
        let page = mcp::parse_wiki_uri(&params.uri).ok_or("unknown resource")?;
        let text = match self.cookbook.wiki(page) {
            None => return Err("resource not found".to_string()),
            Some(decoded) => decoded.map_err(|e| format!("decode: {e}"))?,
        };
        let content = ResourceContent { uri: params.uri, mime_type: "text/html".to_string(), text, blob: String::new() };
        Ok(json!({ "contents": [content] }))
    }

    fn unsubscribe(&self, id: u64) {
        if self.clients.lock().remove(&id).is_some() {
            info!(app_id = self.app_id, "mcp client unsubscribed");
        }
    }
}

/// A subscribed client's inbound stream.
pub struct McpSubscription {
    id: u64,
    rx: mpsc::Receiver<Arc<str>>,
    server: Arc<McpServer>,
}

impl McpSubscription {
    pub async fn recv(&mut self) -> Option<Arc<str>> {
        self.rx.recv().await
    }
}

impl Drop for McpSubscription {
    fn drop(&mut self) {
        self.server.unsubscribe(self.id);
    }
}

#[cfg(test)]
#[path = "mcp_tests.rs"]
mod tests;
