// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn system_clock_is_after_2020() {
    let clock = SystemClock;
    assert!(clock.epoch_nanos() > 1_577_836_800_000_000_000);
}

#[test]
fn fake_clock_advances_by_nanos() {
    let clock = FakeClock::at(1_000);
    clock.advance(Duration::from_millis(10));
    assert_eq!(clock.epoch_nanos(), 10_001_000);
}

#[test]
fn fake_clock_clones_share_time() {
    let a = FakeClock::new();
    let b = a.clone();
    let before = a.epoch_nanos();
    b.advance(Duration::from_secs(1));
    assert_eq!(a.epoch_nanos() - before, 1_000_000_000);
}

#[test]
fn fake_clock_set() {
    let clock = FakeClock::default();
    clock.set_epoch_nanos(42);
    assert_eq!(clock.epoch_nanos(), 42);
}

#[test]
fn duration_nanos_saturates() {
    assert_eq!(duration_nanos(Duration::from_secs(u64::MAX)), i64::MAX);
    assert_eq!(duration_nanos(Duration::from_micros(3)), 3_000);
}
