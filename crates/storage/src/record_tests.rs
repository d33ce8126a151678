// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use super::*;
use lemc_core::test_support::arb_job_recipe;
use lemc_core::{job_group, job_key, Step};
use proptest::prelude::*;

fn now_job(recipe: JobRecipe, trigger: Trigger, nrt: i64) -> ScheduledJob {
    let key = job_key(&recipe, QueueName::Now).unwrap();
    let group = job_group(&recipe);
    ScheduledJob { detail: JobDetail::new(Job::Recipe(recipe), key, group), trigger, next_run_time: nrt }
}

#[test]
fn encodes_expected_fields() {
    let job = now_job(JobRecipe::builder().build(), Trigger::run_once(Duration::from_millis(100)), 17);
    let value: serde_json::Value = serde_json::from_slice(&encode(&job).unwrap()).unwrap();
    assert_eq!(value["trigger"], "RunOnceTrigger⇶100ms⇶valid");
    assert_eq!(value["next_run_time"], 17);
    assert_eq!(value["description"], "[userid:42][pageid:1][uuid:3f0c5d1e-aaaa-bbbb-cccc-000000000001][queue:app]");
    assert_eq!(value["job"]["scope"], "individual");
    assert_eq!(value["job_options"]["Replace"], false);
}

#[test]
fn step_record_decodes_in_step_queues() {
    let step_job = StepJob {
        step: Step::builder().trigger("every.1.seconds").build(),
        recipe_job: JobRecipe::builder().build(),
    };
    let job = ScheduledJob {
        detail: JobDetail::new(Job::Step(step_job.clone()), "k".into(), "g".into()),
        trigger: Trigger::simple(Duration::from_secs(1)),
        next_run_time: 5,
    };
    let bytes = encode(&job).unwrap();
    let back = decode(QueueName::Every, &bytes).unwrap();
    assert_eq!(back, job);
    // a step record is not a recipe record
    assert!(decode(QueueName::Now, &bytes).is_err());
}

#[test]
fn malformed_json_is_a_soft_error() {
    assert!(matches!(decode(QueueName::Now, b"{not json"), Err(RecordError::Json(_))));
}

#[test]
fn malformed_trigger_is_a_soft_error() {
    let job = now_job(JobRecipe::builder().build(), Trigger::run_once(Duration::ZERO), 1);
    let mut value: serde_json::Value = serde_json::from_slice(&encode(&job).unwrap()).unwrap();
    value["trigger"] = "Bogus".into();
    let bytes = serde_json::to_vec(&value).unwrap();
    assert!(matches!(decode(QueueName::Now, &bytes), Err(RecordError::Trigger(_))));
}

#[test]
fn missing_options_default() {
    let job = now_job(JobRecipe::builder().build(), Trigger::run_once(Duration::ZERO), 1);
    let mut value: serde_json::Value = serde_json::from_slice(&encode(&job).unwrap()).unwrap();
    value["job_options"] = serde_json::Value::Null;
    let back = decode(QueueName::Now, &serde_json::to_vec(&value).unwrap()).unwrap();
    assert_eq!(back.detail.options, JobOptions::default());
}

proptest! {
    #[test]
    fn decode_preserves_identity(
        recipe in arb_job_recipe(),
        delay_ms in 0u64..100_000,
        expired in any::<bool>(),
        nrt in 0i64..i64::MAX,
    ) {
        let trigger = Trigger::RunOnce { delay: Duration::from_millis(delay_ms), expired };
        let job = now_job(recipe, trigger, nrt);
        let back = decode(QueueName::Now, &encode(&job).unwrap()).unwrap();
        prop_assert_eq!(&back.detail.key, &job.detail.key);
        prop_assert_eq!(&back.detail.group, &job.detail.group);
        prop_assert_eq!(back.trigger, job.trigger);
        prop_assert_eq!(back.next_run_time, job.next_run_time);
        prop_assert_eq!(back, job);
    }
}
