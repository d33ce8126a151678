//! A step that outlives its timeout is stopped and releases its key.

use std::time::Duration;

use crate::prelude::*;

#[tokio::test(start_paused = true)]
async fn overrunning_step_is_stopped_and_key_released() {
    let runtime = FakeRuntime::new();
    runtime.script("alpine:latest", Script::default().run_for(Duration::from_secs(60)));
    let h = Harness::start_with(runtime);
    let job = recipe(vec![
        Step::builder().step(1).timeout("1.seconds").build(),
        Step::builder().step(2).image("never:1").build(),
    ]);

    h.engine.submit(job.clone()).await.unwrap();
    h.tick(Duration::from_millis(100)).await;
    assert_eq!(h.runtime.live_containers(), 1);

    tokio::time::sleep(Duration::from_secs(2)).await;

    assert_eq!(h.runtime.stop_count(), 1);
    assert_eq!(h.runtime.live_containers(), 0);
    // The failed step aborts the rest of the recipe.
    assert_eq!(h.runtime.created().len(), 1);
    assert!(h.engine.running().is_empty());
    assert!(h.engine.status(&job).unwrap().is_idle());

    // The key is free again.
    h.engine.submit(job).await.unwrap();
    assert!(h.engine.shutdown().await);
}
