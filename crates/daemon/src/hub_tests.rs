// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;

fn msg(text: &str) -> Arc<str> {
    Arc::from(text)
}

#[tokio::test]
async fn send_without_hub_reports_absent() {
    let hubs = Hubs::new();
    assert!(!hubs.send(1, msg("x")));
}

#[tokio::test]
async fn every_connection_of_a_user_receives() {
    let hubs = Hubs::new();
    let mut a = hubs.connect(7).await;
    let mut b = hubs.connect(7).await;
    let mut other = hubs.connect(8).await;

    assert!(hubs.send(7, msg("hello")));

    assert_eq!(a.recv().await.as_deref(), Some("hello"));
    assert_eq!(b.recv().await.as_deref(), Some("hello"));
    assert!(other.try_recv().is_none());
    assert_eq!(a.user_id(), 7);
}

#[tokio::test]
async fn slow_connection_does_not_block_others() {
    let hubs = Hubs::with_buffers(HUB_INBOX, 2);
    let mut slow = hubs.connect(1).await;
    let mut fast = hubs.connect(1).await;

    for i in 0..5 {
        assert!(hubs.send(1, msg(&i.to_string())));
        let got = tokio::time::timeout(Duration::from_secs(1), fast.recv()).await.unwrap();
        assert_eq!(got.as_deref(), Some(i.to_string().as_str()));
    }

    assert_eq!(slow.try_recv().as_deref(), Some("0"));
    assert_eq!(slow.try_recv().as_deref(), Some("1"));
    assert!(slow.try_recv().is_none());
}

#[tokio::test]
async fn first_message_reaches_connections_registered_before_hub_runs() {
    let hubs = Hubs::with_buffers(HUB_INBOX, 1);
    let mut a = hubs.connect(2).await;
    let mut b = hubs.connect(2).await;
    let mut c = hubs.connect(2).await;

    // Nothing has yielded to the hub task yet; its inbox still holds the
    // registrations.
    assert!(hubs.send(2, msg("first")));

    for conn in [&mut a, &mut b, &mut c] {
        let got = tokio::time::timeout(Duration::from_secs(1), conn.recv()).await.unwrap();
        assert_eq!(got.as_deref(), Some("first"));
    }
}

#[tokio::test]
async fn hub_is_torn_down_with_last_connection() {
    let hubs = Hubs::new();
    let a = hubs.connect(3).await;
    let mut b = hubs.connect(3).await;
    assert_eq!(hubs.hub_count(), 1);
    assert_eq!(hubs.connections(3), 2);

    drop(a);
    assert_eq!(hubs.connections(3), 1);
    assert!(hubs.send(3, msg("still here")));
    assert_eq!(b.recv().await.as_deref(), Some("still here"));

    drop(b);
    assert_eq!(hubs.hub_count(), 0);
    assert!(!hubs.send(3, msg("gone")));
}

#[tokio::test]
async fn reconnect_after_teardown_gets_fresh_hub() {
    let hubs = Hubs::new();
    drop(hubs.connect(4).await);
    let mut again = hubs.connect(4).await;
    assert!(hubs.send(4, msg("back")));
    assert_eq!(again.recv().await.as_deref(), Some("back"));
}
