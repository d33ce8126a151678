// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;
use yare::parameterized;

#[parameterized(
    zero = { Duration::ZERO, "0s" },
    nanos = { Duration::from_nanos(7), "7ns" },
    micros_fraction = { Duration::from_nanos(1_500), "1.5µs" },
    hundred_ms = { Duration::from_millis(100), "100ms" },
    one_and_half = { Duration::from_millis(1_500), "1.5s" },
    one_second = { Duration::from_secs(1), "1s" },
    one_minute = { Duration::from_secs(60), "1m0s" },
    one_hour = { Duration::from_secs(3600), "1h0m0s" },
    mixed = { Duration::from_millis(7_384_005), "2h3m4.005s" },
)]
fn formats(d: Duration, expected: &str) {
    assert_eq!(format_duration(d), expected);
}

#[parameterized(
    bare_zero = { "0", Duration::ZERO },
    millis = { "100ms", Duration::from_millis(100) },
    micro_ascii = { "3us", Duration::from_micros(3) },
    fraction = { "1.5s", Duration::from_millis(1_500) },
    leading_dot = { ".5s", Duration::from_millis(500) },
    compound = { "1h0m0s", Duration::from_secs(3600) },
    plus_sign = { "+2m", Duration::from_secs(120) },
)]
fn parses(text: &str, expected: Duration) {
    assert_eq!(parse_duration(text).unwrap(), expected);
}

#[parameterized(
    empty = { "" },
    negative = { "-1s" },
    no_unit = { "10" },
    bad_unit = { "10days" },
    only_unit = { "ms" },
    lone_dot = { ".s" },
)]
fn rejects(text: &str) {
    assert!(parse_duration(text).is_err());
}

proptest! {
    #[test]
    fn format_then_parse_is_identity(nanos in 0u64..(48 * 3600 * 1_000_000_000)) {
        let d = Duration::from_nanos(nanos);
        prop_assert_eq!(parse_duration(&format_duration(d)).unwrap(), d);
    }
}
