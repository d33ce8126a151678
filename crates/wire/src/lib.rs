// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire types shared by the engine and the daemon.
//!
//! - [`HubMessage`]: one progress update delivered to websocket clients
//! - [`RpcRequest`] / [`RpcResponse`]: JSON-RPC envelopes for MCP clients
//! - [`mcp`]: MCP method payloads

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod hub;
pub mod mcp;
mod rpc;

pub use hub::HubMessage;
pub use rpc::{encode, RpcRequest, RpcResponse, JSONRPC_VERSION};
