// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::files::CacheKind;
use lemc_adapters::{FakeBroadcaster, FakeRuntime, RuntimeCall, Script};
use lemc_core::FakeClock;
use yare::parameterized;

struct Harness {
    dir: tempfile::TempDir,
    runtime: FakeRuntime,
    broadcaster: FakeBroadcaster,
    runner: StepRunner<FakeRuntime, FakeBroadcaster, FakeClock>,
}

fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let runtime = FakeRuntime::new();
    let broadcaster = FakeBroadcaster::new();
    let locker = Arc::new(Locker::new(dir.path(), None));
    let runner = StepRunner::new(runtime.clone(), broadcaster.clone(), locker, FakeClock::new());
    Harness { dir, runtime, broadcaster, runner }
}

fn job() -> JobRecipe {
    JobRecipe::builder().uuid("u1").page_id("1").user_id("42").username("alice").app_id("").build()
}

fn cache(h: &Harness, job: &JobRecipe) -> CacheFiles {
    let layout = Locker::new(h.dir.path(), None).layout(job).unwrap();
    CacheFiles::open(layout.cache_dir()).unwrap()
}

#[tokio::test]
async fn runs_step_and_streams_protocol_lines() {
    let h = harness();
    h.runtime.script("alpine:latest", Script::lines(["booting", "lemc.html.append;<div>hi</div>"]));
    let job = job();
    let step = Step::builder().build();

    let outcome = h.runner.run(&job, &step, &CancellationToken::new()).await.unwrap();

    assert_eq!(outcome.exit_code, 0);
    assert_eq!(cache(&h, &job).read(CacheKind::Html).unwrap(), "<div>hi</div>\n");
    let sent = h.broadcaster.user_messages(42);
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains(r#""Msg":"<div>hi</div>""#));
    assert_eq!(h.runtime.live_containers(), 0);
}

#[tokio::test]
async fn container_spec_carries_identity() {
    let h = harness();
    let job = job();
    let step = Step::builder().step(2).command(vec!["echo".into(), "hi".into()]).build();

    h.runner.run(&job, &step, &CancellationToken::new()).await.unwrap();

    let created = h.runtime.created();
    assert_eq!(created.len(), 1);
    let spec = &created[0];
    assert!(spec.name.starts_with("uuid-u1-page-1-recipe-hello-step-2-scope-individual-"));
    assert_eq!(spec.labels["STEP_ID"], "2");
    assert_eq!(spec.cmd, vec!["echo", "hi"]);
    assert!(spec.env.contains(&"LEMC_STEP_ID=2".to_string()));
    assert!(spec.env.contains(&"PYTHONUNBUFFERED=1".to_string()));
    assert_eq!(spec.mounts.len(), 3);
    assert_eq!(spec.stop_timeout, Some(Duration::from_secs(30)));
}

#[tokio::test]
async fn stale_containers_are_removed_before_create() {
    let h = harness();
    let job = job();
    let step = Step::builder().build();

    h.runner.run(&job, &step, &CancellationToken::new()).await.unwrap();

    let calls = h.runtime.calls();
    let cleanup = calls.iter().position(|c| matches!(c, RuntimeCall::RemoveLabeled(_))).unwrap();
    let create = calls.iter().position(|c| matches!(c, RuntimeCall::Create(_))).unwrap();
    assert!(cleanup < create);
}

#[tokio::test]
async fn missing_image_is_pulled_with_credentials() {
    let h = harness();
    h.runtime.missing_image("registry.example.com/app:1");
    let step = Step::builder().image("registry.example.com/app:1").registry_auth("basic:bob:pw").build();

    h.runner.run(&job(), &step, &CancellationToken::new()).await.unwrap();

    assert!(h.runtime.calls().contains(&RuntimeCall::Pull {
        image: "registry.example.com/app:1".to_string(),
        authenticated: true,
    }));
}

#[tokio::test]
async fn unpullable_image_fails_step() {
    let h = harness();
    h.runtime.unpullable("ghost:1");
    let step = Step::builder().image("ghost:1").build();

    let err = h.runner.run(&job(), &step, &CancellationToken::new()).await.unwrap_err();

    assert!(matches!(err, RunnerError::Runtime(RuntimeError::PullFailed { .. })));
    assert!(h.runtime.created().is_empty());
}

#[tokio::test(start_paused = true)]
async fn timeout_stops_container() {
    let h = harness();
    h.runtime.script("alpine:latest", Script::default().run_for(Duration::from_secs(60)));
    let step = Step::builder().timeout("1.seconds").build();

    let err = h.runner.run(&job(), &step, &CancellationToken::new()).await.unwrap_err();

    assert!(matches!(err, RunnerError::TimedOut { step: 1, .. }));
    assert_eq!(h.runtime.stop_count(), 1);
    assert_eq!(h.runtime.live_containers(), 0);
}

#[tokio::test(start_paused = true)]
async fn err_line_stops_and_fails() {
    let h = harness();
    h.runtime.script(
        "alpine:latest",
        Script::lines(["lemc.err;bad input"]).run_for(Duration::from_secs(60)),
    );
    let step = Step::builder().build();

    let err = h.runner.run(&job(), &step, &CancellationToken::new()).await.unwrap_err();

    match err {
        RunnerError::Reported { message, .. } => assert_eq!(message, "bad input"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(h.runtime.stop_count(), 1);
}

#[tokio::test]
async fn non_zero_exit_is_not_an_error() {
    let h = harness();
    h.runtime.script("alpine:latest", Script::default().exit_code(3));

    let outcome = h.runner.run(&job(), &Step::builder().build(), &CancellationToken::new()).await.unwrap();

    assert_eq!(outcome.exit_code, 3);
}

#[tokio::test]
async fn env_lines_are_returned() {
    let h = harness();
    h.runtime.script("alpine:latest", Script::lines(["lemc.env;NEXT=1"]));

    let outcome = h.runner.run(&job(), &Step::builder().build(), &CancellationToken::new()).await.unwrap();

    assert_eq!(outcome.env, vec!["NEXT=1"]);
}

#[tokio::test(start_paused = true)]
async fn cancellation_stops_container() {
    let h = harness();
    h.runtime.script("alpine:latest", Script::default().run_for(Duration::from_secs(60)));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = h.runner.run(&job(), &Step::builder().build(), &cancel).await.unwrap_err();

    assert!(matches!(err, RunnerError::Cancelled { .. }));
    assert_eq!(h.runtime.stop_count(), 1);
}

#[parameterized(
    declared = { "2.minutes", 0, Some(120) },
    job_fallback = { "", 45, Some(45) },
    default = { "", 0, Some(600) },
    bad_unit = { "2.hours", 0, None },
)]
fn resolves_step_timeout(timeout: &str, job_secs: u64, expected: Option<u64>) {
    let job = JobRecipe::builder().container_timeout_secs(job_secs).build();
    let step = Step::builder().timeout(timeout).build();
    assert_eq!(step_timeout(&job, &step).ok().map(|d| d.as_secs()), expected);
}
