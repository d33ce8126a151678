//! At most one NOW execution per key, and delayed steps yield to it.

use std::time::Duration;

use crate::prelude::*;

#[tokio::test(start_paused = true)]
async fn second_now_submission_conflicts() {
    let runtime = FakeRuntime::new();
    runtime.script("alpine:latest", Script::default().run_for(Duration::from_millis(500)));
    let h = Harness::start_with(runtime);
    let job = recipe(vec![Step::builder().timeout("1.minutes").build()]);

    h.engine.submit(job.clone()).await.unwrap();
    h.tick(Duration::from_millis(100)).await;

    let err = h.engine.submit(job.clone()).await.unwrap_err();
    assert!(matches!(err, SubmitError::AlreadyRunning));
    assert!(err.is_retryable());

    // Another user's submission of the same recipe is independent.
    let other = JobRecipe::builder().user_id("43").recipe(job.recipe.clone()).build();
    h.engine.submit(other).await.unwrap();
    assert!(h.engine.shutdown().await);
}

#[tokio::test(start_paused = true)]
async fn concurrent_now_submissions_admit_one() {
    let runtime = FakeRuntime::new();
    runtime.script("alpine:latest", Script::default().run_for(Duration::from_millis(500)));
    let h = Harness::start_with(runtime);
    let job = recipe(vec![Step::builder().timeout("1.minutes").build()]);

    let (a, b, c, d) = tokio::join!(
        h.engine.submit(job.clone()),
        h.engine.submit(job.clone()),
        h.engine.submit(job.clone()),
        h.engine.submit(job.clone()),
    );
    let results = [a, b, c, d];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, SubmitError::AlreadyRunning)));

    h.tick(Duration::from_millis(100)).await;
    assert_eq!(h.runtime.created().len(), 1);
    assert!(h.engine.shutdown().await);
}

#[tokio::test(start_paused = true)]
async fn delayed_step_fails_fast_while_now_job_runs() {
    let h = Harness::start();
    let job = recipe(vec![Step::builder().trigger("in.1.seconds").build()]);

    h.engine.submit(job.clone()).await.unwrap();
    h.tick(Duration::from_millis(100)).await;
    assert_eq!(h.queue_size(QueueName::In), 1);

    let now_key = job_key(&job, QueueName::Now).unwrap();
    h.engine.running().add(&now_key);

    h.tick(Duration::from_secs(1)).await;
    assert!(h.runtime.created().is_empty());
    assert_eq!(h.queue_size(QueueName::In), 0);
    // The blocked step leaves the NOW job's claim alone.
    assert!(h.engine.running().is_running(&now_key));

    h.engine.running().remove(&now_key);
    assert!(h.engine.shutdown().await);
}
