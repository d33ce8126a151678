//! `in.<N>.<unit>` steps fire once after their delay.

use std::time::Duration;

use crate::prelude::*;

#[tokio::test(start_paused = true)]
async fn delayed_step_fires_exactly_once() {
    let h = Harness::start();
    let job = recipe(vec![Step::builder().trigger("in.1.seconds").build()]);

    h.engine.submit(job.clone()).await.unwrap();
    h.tick(Duration::from_millis(100)).await;

    assert!(h.runtime.created().is_empty());
    assert_eq!(h.queue_size(QueueName::In), 1);
    assert!(matches!(h.engine.status(&job).unwrap().in_, KeyStatus::Pending { .. }));

    h.tick(Duration::from_millis(500)).await;
    assert!(h.runtime.created().is_empty());

    h.tick(Duration::from_millis(500)).await;
    assert_eq!(h.runtime.created().len(), 1);
    assert_eq!(h.queue_size(QueueName::In), 0);

    h.tick(Duration::from_secs(5)).await;
    assert_eq!(h.runtime.created().len(), 1);
    assert!(h.engine.status(&job).unwrap().is_idle());
    assert!(h.engine.shutdown().await);
}

#[tokio::test(start_paused = true)]
async fn resubmission_replaces_pending_delayed_step() {
    let h = Harness::start();
    let job = recipe(vec![Step::builder().trigger("in.1.minutes").build()]);

    h.engine.submit(job.clone()).await.unwrap();
    h.tick(Duration::from_millis(100)).await;
    assert_eq!(h.queue_size(QueueName::In), 1);

    h.engine.submit(job).await.unwrap();
    h.tick(Duration::from_millis(100)).await;

    assert_eq!(h.queue_size(QueueName::In), 1);
    h.tick(Duration::from_secs(60)).await;
    assert_eq!(h.runtime.created().len(), 1);
    assert!(h.engine.shutdown().await);
}
