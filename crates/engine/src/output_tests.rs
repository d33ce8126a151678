// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::files::CacheKind;
use lemc_adapters::FakeBroadcaster;
use lemc_core::JobRecipe;

struct Fixture {
    _dir: tempfile::TempDir,
    cache: CacheFiles,
    log_path: std::path::PathBuf,
    broadcaster: FakeBroadcaster,
    output: StepOutput<FakeBroadcaster>,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let cache = CacheFiles::open(dir.path().join("cache")).unwrap();
    let log_path = dir.path().join("logs/page-1-hello.log");
    let log = StepLog::open(&log_path, Utc::now()).unwrap();
    let broadcaster = FakeBroadcaster::new();
    let job = JobRecipe::builder().user_id("42").app_id("").build();
    let identity = StepIdentity {
        uuid: job.uuid.clone(),
        page_id: "1".to_string(),
        view_type: "individual".to_string(),
        step_id: "1".to_string(),
        image_hash: "deadbeef".to_string(),
        image_name: "alpine:latest".to_string(),
    };
    let output = StepOutput::new(broadcaster.clone(), Route::for_job(&job), cache.clone(), log, identity);
    Fixture { _dir: dir, cache, log_path, broadcaster, output }
}

fn hub(messages: &[String]) -> Vec<HubMessage> {
    messages.iter().map(|m| serde_json::from_str(m).unwrap()).collect()
}

#[tokio::test]
async fn html_append_updates_cache_and_broadcasts() {
    let mut f = fixture();

    let outcome = f.output.handle("lemc.html.append;<div>hi</div>", Utc::now());

    assert_eq!(outcome, LineOutcome::Continue);
    assert_eq!(f.cache.read(CacheKind::Html).unwrap(), "<div>hi</div>\n");
    let sent = hub(&f.broadcaster.user_messages(42));
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].cmd, "lemc.html.append;");
    assert_eq!(sent[0].msg, "<div>hi</div>");
    assert_eq!(sent[0].view_type, "individual");
}

#[tokio::test]
async fn plain_lines_are_logged_not_broadcast() {
    let mut f = fixture();

    f.output.handle("just some output", Utc::now());
    f.output.flush();

    assert!(f.broadcaster.deliveries().is_empty());
    let log = std::fs::read_to_string(&f.log_path).unwrap();
    assert!(log.contains("[image:deadbeef] [name:alpine:latest]"));
    assert!(log.trim_end().ends_with("[step:1] just some output"));
}

#[tokio::test]
async fn env_lines_are_collected_silently() {
    let mut f = fixture();

    f.output.handle("lemc.env; TOKEN=abc ", Utc::now());
    f.output.handle("lemc.env;", Utc::now());

    assert_eq!(f.output.env(), &["TOKEN=abc".to_string()]);
    assert!(f.broadcaster.deliveries().is_empty());
}

#[tokio::test]
async fn err_line_reports_failure() {
    let mut f = fixture();

    let outcome = f.output.handle("lemc.err; disk full", Utc::now());

    assert_eq!(outcome, LineOutcome::Failed("disk full".to_string()));
    let sent = hub(&f.broadcaster.user_messages(42));
    assert_eq!(sent[0].cmd, "lemc.err;");
}

#[tokio::test]
async fn js_exec_replaces_script_cache() {
    let mut f = fixture();

    f.output.handle("lemc.js.exec;first()", Utc::now());
    f.output.handle("lemc.js.exec;second()", Utc::now());

    assert_eq!(f.cache.read(CacheKind::Js).unwrap(), "second()");
}

#[tokio::test(start_paused = true)]
async fn empty_truncs_are_throttled() {
    let mut f = fixture();

    f.output.handle("lemc.html.trunc;", Utc::now());
    f.output.handle("lemc.html.trunc;", Utc::now());
    tokio::time::advance(CLEAR_SPACING).await;
    f.output.handle("lemc.html.trunc;", Utc::now());

    assert_eq!(f.broadcaster.user_messages(42).len(), 2);
}

#[tokio::test(start_paused = true)]
async fn non_empty_truncs_are_never_throttled() {
    let mut f = fixture();

    f.output.handle("lemc.css.trunc;a{}", Utc::now());
    f.output.handle("lemc.css.trunc;b{}", Utc::now());

    assert_eq!(f.broadcaster.user_messages(42).len(), 2);
    assert_eq!(f.cache.read(CacheKind::Css).unwrap(), "b{}");
}
