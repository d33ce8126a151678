//! Pending work lives in queue files named by next run time.

use std::time::Duration;

use crate::prelude::*;

#[tokio::test(start_paused = true)]
async fn pending_step_is_a_file_named_by_next_run_time() {
    let h = Harness::start();
    let job = recipe(vec![Step::builder().trigger("in.2.minutes").build()]);

    h.engine.submit(job.clone()).await.unwrap();
    h.tick(Duration::from_millis(100)).await;

    let KeyStatus::Pending { next_run_time } = h.engine.status(&job).unwrap().in_ else {
        panic!("step should be pending");
    };
    let file = h.dir.path().join(format!("queues/in/{next_run_time}.json"));
    let record: serde_json::Value = serde_json::from_slice(&std::fs::read(&file).unwrap()).unwrap();
    similar_asserts::assert_eq!(record["trigger"].as_str().unwrap(), "RunOnceTrigger⇶2m0s⇶valid");
    assert_eq!(record["next_run_time"], next_run_time);
    assert_eq!(record["job_key"], job_key(&job, QueueName::In).unwrap());
    assert!(h.engine.shutdown().await);
}
