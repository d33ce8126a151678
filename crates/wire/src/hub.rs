// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};

/// Progress update for one page, rendered by the browser.
///
/// `cmd` is the full log prefix (`lemc.html.append;`) and `msg` the
/// payload after it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HubMessage {
    #[serde(rename = "PageID")]
    pub page_id: String,
    #[serde(rename = "UUID")]
    pub uuid: String,
    #[serde(rename = "ViewType")]
    pub view_type: String,
    #[serde(rename = "Cmd")]
    pub cmd: String,
    #[serde(rename = "Msg")]
    pub msg: String,
}

#[cfg(test)]
#[path = "hub_tests.rs"]
mod tests;
