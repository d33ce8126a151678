// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! MCP transport: an SSE stream per subscribed client, and POSTed requests
//! whose responses are delivered on that stream.

use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use futures_util::stream;
use lemc_wire::RpcRequest;
use tracing::{debug, warn};

use super::{AppState, API_KEY_HEADER};
use crate::apps::{ApiUser, AppRecord};

struct Authorized {
    app: AppRecord,
    user: ApiUser,
    api_key: String,
}

async fn authorize(state: &AppState, uuid: &str, headers: &HeaderMap) -> Result<Authorized, StatusCode> {
    let api_key = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|k| !k.is_empty())
        .ok_or(StatusCode::UNAUTHORIZED)?;
    match state.directory.authorize(uuid, api_key).await {
        Ok(Some((app, _))) if !app.mcp_enabled => Err(StatusCode::FORBIDDEN),
        Ok(Some((app, user))) => Ok(Authorized { app, user, api_key: api_key.to_string() }),
        Ok(None) => Err(StatusCode::UNAUTHORIZED),
        Err(e) => {
            warn!(app_uuid = uuid, error = %e, "app directory lookup failed");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

pub(super) async fn sse(
    Path(uuid): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, StatusCode> {
    let auth = authorize(&state, &uuid, &headers).await?;
    let server = state.registry.mcp_server(&auth.app);
    let subscription = server.subscribe(auth.user, &auth.api_key);

    // The subscription lives inside the stream and unsubscribes when the
    // client disconnects and the stream is dropped.
    let events = stream::unfold(subscription, |mut subscription| async move {
        let message = subscription.recv().await?;
        Some((Ok::<_, Infallible>(Event::default().data(&*message)), subscription))
    });
    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

pub(super) async fn post(
    Path(uuid): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let auth = match authorize(&state, &uuid, &headers).await {
        Ok(auth) => auth,
        Err(status) => return status,
    };
    let server = state.registry.mcp_server(&auth.app);
    let Some(client) = server.find_client(&auth.api_key) else {
        return StatusCode::GONE;
    };
    let Ok(request) = serde_json::from_slice::<RpcRequest>(&body) else {
        return StatusCode::BAD_REQUEST;
    };

    tokio::spawn(async move {
        let response =
            server.handle(&request, &client.user, state.launcher.as_ref(), state.directory.as_ref()).await;
        match lemc_wire::encode(&response) {
            Ok(text) => {
                if !client.send(Arc::from(text)).await {
                    debug!(app_id = server.app_id(), "mcp client left before response");
                }
            }
            Err(e) => warn!(error = %e, "failed to encode mcp response"),
        }
    });
    StatusCode::ACCEPTED
}
