// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    individual = { "individual", Scope::Individual },
    shared = { "shared", Scope::Shared },
)]
fn scope_parses(text: &str, expected: Scope) {
    assert_eq!(text.parse::<Scope>().unwrap(), expected);
    assert_eq!(expected.to_string(), text);
}

#[parameterized(
    empty = { "" },
    admin = { "admin" },
    uppercase = { "Shared" },
)]
fn scope_rejects(text: &str) {
    let err = text.parse::<Scope>().unwrap_err();
    assert_eq!(err, ScopeError(text.to_string()));
}

#[test]
fn queue_dirs_match_display() {
    for q in QueueName::ALL {
        assert_eq!(q.dir_name(), q.to_string());
    }
}

#[test]
fn job_type_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&JobType::Cookbook).unwrap(), "\"cookbook\"");
}
