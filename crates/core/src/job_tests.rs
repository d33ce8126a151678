// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use super::*;

#[test]
fn recipe_description_uses_job_type_as_queue() {
    let r = JobRecipe::builder().user_id("5").page_id("2").uuid("u-1").build();
    assert_eq!(r.description(), "[userid:5][pageid:2][uuid:u-1][queue:app]");
}

#[test]
fn step_description_uses_trigger_text() {
    let job = StepJob {
        step: Step::builder().trigger("every.1.seconds").build(),
        recipe_job: JobRecipe::builder().build(),
    };
    assert_eq!(Job::Step(job).description(), "StepJob: every.1.seconds");
}

#[test]
fn options_serialize_pascal_case() {
    let json = serde_json::to_value(JobOptions::default()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"MaxRetries":0,"RetryInterval":0,"Replace":false,"Suspended":false})
    );
}

#[test]
fn scheduled_job_fits_its_queue() {
    let recipe = ScheduledJob {
        detail: JobDetail::new(Job::Recipe(JobRecipe::builder().build()), "k".into(), "g".into()),
        trigger: Trigger::run_once(Duration::from_millis(100)),
        next_run_time: 1,
    };
    assert!(recipe.fits(QueueName::Now));
    assert!(!recipe.fits(QueueName::In));

    let step = ScheduledJob {
        detail: JobDetail::new(
            Job::Step(StepJob { step: Step::builder().build(), recipe_job: JobRecipe::builder().build() }),
            "k".into(),
            "g".into(),
        ),
        trigger: Trigger::simple(Duration::from_secs(1)),
        next_run_time: 1,
    };
    assert!(step.fits(QueueName::Every));
    assert!(!step.fits(QueueName::Now));
}

#[test]
fn job_recipe_scope_is_checked_on_use() {
    let r = JobRecipe::builder().scope("admin").build();
    assert!(r.scope().is_err());
}
