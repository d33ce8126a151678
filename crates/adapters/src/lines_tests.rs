// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn splits_across_chunks() {
    let mut s = LineSplitter::new();
    assert_eq!(s.push(b"lemc.html.app"), Vec::<String>::new());
    assert_eq!(s.push(b"end; hi\nsecond"), vec!["lemc.html.append; hi".to_string()]);
    assert_eq!(s.push(b" line\r\n"), vec!["second line".to_string()]);
    assert_eq!(s.finish(), None);
}

#[test]
fn keeps_empty_lines() {
    let mut s = LineSplitter::new();
    assert_eq!(s.push(b"\n\n"), vec![String::new(), String::new()]);
}

#[test]
fn flushes_trailing_text() {
    let mut s = LineSplitter::new();
    s.push(b"no newline");
    assert_eq!(s.finish(), Some("no newline".to_string()));
    assert_eq!(s.finish(), None);
}

#[test]
fn multibyte_split_is_reassembled() {
    let mut s = LineSplitter::new();
    let text = "héllo\n".as_bytes();
    s.push(&text[..2]);
    assert_eq!(s.push(&text[2..]), vec!["héllo".to_string()]);
}
