// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP listener.
//!
//! Serves the browser websocket, the MCP transport (SSE stream plus POSTed
//! requests) and a health probe. Identity for `/ws` is injected by the
//! fronting auth layer as the `user_id` query parameter.

mod mcp;
mod ws;

use std::sync::Arc;

use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use crate::apps::AppDirectory;
use crate::launch::Launcher;
use crate::registry::Registry;

pub use ws::{fold_inbound, MAX_MESSAGE_SIZE, PING_PERIOD, PONG_WAIT, WRITE_WAIT};

pub const API_KEY_HEADER: &str = "x-api-key";

/// Shared handler context.
#[derive(Clone)]
pub struct AppState {
    pub registry: Registry,
    pub launcher: Arc<dyn Launcher>,
    pub directory: Arc<dyn AppDirectory>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ws", get(websocket))
        .route("/mcp/{uuid}/sse", get(mcp::sse))
        .route("/mcp/{uuid}", post(mcp::post))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until `shutdown` is cancelled.
pub async fn serve(listener: TcpListener, state: AppState, shutdown: CancellationToken) -> std::io::Result<()> {
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}

#[derive(Debug, Deserialize)]
struct WsQuery {
    user_id: i64,
}

async fn websocket(upgrade: WebSocketUpgrade, Query(query): Query<WsQuery>, State(state): State<AppState>) -> Response {
    let hubs = state.registry.hubs().clone();
    upgrade
        .max_message_size(MAX_MESSAGE_SIZE)
        .on_upgrade(move |socket| ws::serve(socket, hubs, query.user_id))
}

async fn healthz() -> &'static str {
    "ok"
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
