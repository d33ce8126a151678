//! `every.<N>.<unit>` steps keep firing until removed.

use std::time::Duration;

use crate::prelude::*;

#[tokio::test(start_paused = true)]
async fn recurring_step_fires_until_removed() {
    let h = Harness::start();
    let job = recipe(vec![Step::builder().trigger("every.1.seconds").build()]);

    h.engine.submit(job.clone()).await.unwrap();
    h.tick(Duration::from_millis(100)).await;
    assert!(h.runtime.created().is_empty());
    assert_eq!(h.queue_size(QueueName::Every), 1);

    for fired in 1..=3 {
        h.tick(Duration::from_secs(1)).await;
        assert_eq!(h.runtime.created().len(), fired);
        assert_eq!(h.queue_size(QueueName::Every), 1);
    }

    let key = job_key(&job, QueueName::Every).unwrap();
    assert_eq!(h.engine.queues().get(QueueName::Every).evict(&key).unwrap(), 1);

    h.tick(Duration::from_secs(3)).await;
    assert_eq!(h.runtime.created().len(), 3);
    assert!(h.engine.shutdown().await);
}
