// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;

#[test]
fn open_creates_empty_cache_files() {
    let dir = tempfile::tempdir().unwrap();
    let cache = CacheFiles::open(dir.path().join("cache")).unwrap();

    for kind in CacheKind::ALL {
        assert_eq!(cache.read(kind).unwrap(), "");
    }
}

#[test]
fn open_reports_failing_operation_and_path() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "").unwrap();
    let target = blocker.join("cache");

    let err = CacheFiles::open(&target).unwrap_err();

    match err {
        FilesError::Io { op, path, .. } => {
            assert_eq!(op, "create");
            assert_eq!(path, target);
        }
    }
}

#[test]
fn append_adds_lines_and_trunc_replaces() {
    let dir = tempfile::tempdir().unwrap();
    let cache = CacheFiles::open(dir.path()).unwrap();

    cache.append(CacheKind::Html, "<p>one</p>").unwrap();
    cache.append(CacheKind::Html, "<p>two</p>").unwrap();
    assert_eq!(cache.read(CacheKind::Html).unwrap(), "<p>one</p>\n<p>two</p>\n");

    cache.trunc(CacheKind::Html, "<p>fresh</p>").unwrap();
    assert_eq!(cache.read(CacheKind::Html).unwrap(), "<p>fresh</p>");

    cache.trunc(CacheKind::Html, "").unwrap();
    assert_eq!(cache.read(CacheKind::Html).unwrap(), "");
}

#[test]
fn kinds_write_separate_files() {
    let dir = tempfile::tempdir().unwrap();
    let cache = CacheFiles::open(dir.path()).unwrap();

    cache.append(CacheKind::Css, "body{}").unwrap();
    cache.trunc(CacheKind::Js, "alert(1)").unwrap();

    assert_eq!(cache.read(CacheKind::Html).unwrap(), "");
    assert_eq!(cache.read(CacheKind::Css).unwrap(), "body{}\n");
    assert_eq!(cache.read(CacheKind::Js).unwrap(), "alert(1)");
}

#[test]
fn step_log_line_format() {
    let dir = tempfile::tempdir().unwrap();
    let opened = Utc.with_ymd_and_hms(2026, 1, 2, 15, 4, 5).unwrap();
    let path = dir.path().join("logs").join("page-1-hello.log");

    {
        let mut log = StepLog::open(&path, opened).unwrap();
        log.write(opened, "1", "abcd1234", "alpine:latest", "lemc.html.append; hi").unwrap();
    }

    let text = std::fs::read_to_string(&path).unwrap();
    similar_asserts::assert_eq!(
        text,
        format!(
            "[Fri Jan 2 15:04:05 UTC 2026] [image:abcd1234] [name:alpine:latest] [event:{}] [step:1] lemc.html.append; hi\n",
            opened.timestamp()
        )
    );
}

#[test]
fn step_log_appends_across_opens() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.log");
    let at = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();

    for msg in ["first", "second"] {
        let mut log = StepLog::open(&path, at).unwrap();
        log.write(at, "1", "h", "i", msg).unwrap();
        log.flush().unwrap();
    }

    let text = std::fs::read_to_string(&path).unwrap();
    let messages: Vec<_> = text.lines().filter_map(|l| l.rsplit(' ').next()).collect();
    assert_eq!(messages, vec!["first", "second"]);
}
