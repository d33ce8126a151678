// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    simple = { "Hello World", "hello-world" },
    punctuation_run = { "Build & Deploy!!", "build-deploy-" },
    underscores_kept = { "my_recipe", "my_recipe" },
    page_stem = { "page-1", "page-1" },
    already_clean = { "abc123", "abc123" },
)]
fn hyphenates(input: &str, expected: &str) {
    assert_eq!(alnum_hyphen(input), expected);
}
