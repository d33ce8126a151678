// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::apps::ApiUser;
use lemc_core::Cookbook;

fn app(id: i64) -> AppRecord {
    AppRecord {
        id,
        uuid: format!("u-{id}"),
        name: "app".to_string(),
        description: String::new(),
        account_id: 1,
        mcp_enabled: true,
        cookbook: Cookbook::default(),
    }
}

#[tokio::test]
async fn user_messages_go_to_hubs() {
    let registry = Registry::new();
    assert!(!registry.send_to_user(1, Arc::from("x")));

    let mut conn = registry.hubs().connect(1).await;
    assert!(registry.send_to_user(1, Arc::from("x")));
    assert_eq!(conn.recv().await.as_deref(), Some("x"));
}

#[tokio::test]
async fn app_messages_go_to_mcp_clients() {
    let registry = Registry::new();
    assert_eq!(registry.send_to_app(9, Arc::from("x")), 0);

    let server = registry.mcp_server(&app(9));
    assert!(Arc::ptr_eq(&server, &registry.mcp_server(&app(9))));
    let mut sub = server.subscribe(ApiUser { user_id: 1, account_id: 1 }, "k");

    assert_eq!(registry.send_to_app(9, Arc::from("started")), 1);
    assert_eq!(sub.recv().await.as_deref(), Some("started"));
    assert_eq!(registry.send_to_app(10, Arc::from("other")), 0);
}
