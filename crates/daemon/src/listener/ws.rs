// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Browser websocket connection: one write pump draining the user's hub,
//! one read pump rebroadcasting inbound text to the same hub.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::time::{interval_at, timeout, Instant};
use tracing::debug;

use crate::hub::{HubConnection, Hubs};

pub const WRITE_WAIT: Duration = Duration::from_secs(10);
pub const PONG_WAIT: Duration = Duration::from_secs(60);
/// Must stay below [`PONG_WAIT`].
pub const PING_PERIOD: Duration = Duration::from_secs(54);
pub const MAX_MESSAGE_SIZE: usize = 512;

pub(super) async fn serve(socket: WebSocket, hubs: Hubs, user_id: i64) {
    let connection = hubs.connect(user_id).await;
    let (sink, stream) = socket.split();
    tokio::select! {
        () = write_pump(sink, connection) => {}
        () = read_pump(stream, &hubs, user_id) => {}
    }
    debug!(user_id, "websocket closed");
}

/// Newlines become spaces and surrounding whitespace is dropped.
pub fn fold_inbound(text: &str) -> String {
    text.replace('\n', " ").trim().to_string()
}

async fn write_pump(mut sink: SplitSink<WebSocket, Message>, mut connection: HubConnection) {
    let mut ping = interval_at(Instant::now() + PING_PERIOD, PING_PERIOD);
    loop {
        tokio::select! {
            message = connection.recv() => {
                let Some(first) = message else {
                    let _ = write(&mut sink, Message::Close(None)).await;
                    return;
                };
                // Coalesce whatever is already queued into one frame.
                let mut text = String::from(&*first);
                while let Some(next) = connection.try_recv() {
                    text.push('\n');
                    text.push_str(&next);
                }
                if !write(&mut sink, Message::Text(text.into())).await {
                    return;
                }
            }
            _ = ping.tick() => {
                if !write(&mut sink, Message::Ping(Bytes::new())).await {
                    return;
                }
            }
        }
    }
}

async fn read_pump(mut stream: SplitStream<WebSocket>, hubs: &Hubs, user_id: i64) {
    loop {
        let frame = match timeout(PONG_WAIT, stream.next()).await {
            Err(_) => {
                debug!(user_id, "websocket read deadline passed");
                return;
            }
            Ok(None) => return,
            Ok(Some(Err(e))) => {
                debug!(user_id, error = %e, "websocket read failed");
                return;
            }
            Ok(Some(Ok(frame))) => frame,
        };
        match frame {
            Message::Text(text) => {
                let folded = fold_inbound(text.as_str());
                if !folded.is_empty() {
                    hubs.send(user_id, Arc::from(folded));
                }
            }
            Message::Close(_) => return,
            _ => {}
        }
    }
}

async fn write(sink: &mut SplitSink<WebSocket, Message>, message: Message) -> bool {
    matches!(timeout(WRITE_WAIT, sink.send(message)).await, Ok(Ok(())))
}
