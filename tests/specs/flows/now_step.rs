//! A `now` step runs its container, fills the page cache, and reaches the
//! submitting user.

use std::time::Duration;

use crate::prelude::*;

#[tokio::test(start_paused = true)]
async fn html_output_reaches_cache_and_user() {
    let runtime = FakeRuntime::new();
    runtime.script("alpine:latest", Script::lines(["starting", "lemc.html.append;<div>hi</div>"]));
    let h = Harness::start_with(runtime);
    let job = recipe(vec![Step::builder().image("alpine:latest").trigger("now").build()]);

    h.engine.submit(job.clone()).await.unwrap();
    assert!(h.runtime.created().is_empty());

    h.tick(Duration::from_millis(100)).await;

    assert_eq!(h.runtime.created().len(), 1);
    assert_eq!(h.cache(&job, CacheKind::Html), "<div>hi</div>\n");
    let messages = h.broadcaster.user_messages(42);
    assert_eq!(messages.len(), 1);
    let message: serde_json::Value = serde_json::from_str(&messages[0]).unwrap();
    assert_eq!(message["Cmd"], "lemc.html.append;");
    assert_eq!(message["Msg"], "<div>hi</div>");
    assert_eq!(h.runtime.live_containers(), 0);
    assert!(h.engine.running().is_empty());
    assert!(h.engine.shutdown().await);
}

#[tokio::test(start_paused = true)]
async fn env_from_one_step_reaches_the_next() {
    let runtime = FakeRuntime::new();
    runtime.script("first:1", Script::lines(["lemc.env;TOKEN=abc"]));
    let h = Harness::start_with(runtime);
    let job = recipe(vec![
        Step::builder().step(1).image("first:1").build(),
        Step::builder().step(2).image("second:1").build(),
    ]);

    h.engine.submit(job).await.unwrap();
    h.tick(Duration::from_millis(100)).await;

    let created = h.runtime.created();
    assert_eq!(created.len(), 2);
    assert!(!created[0].env.contains(&"TOKEN=abc".to_string()));
    assert!(created[1].env.contains(&"TOKEN=abc".to_string()));
    assert!(h.engine.shutdown().await);
}
