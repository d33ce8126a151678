// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compact duration text used in persisted trigger descriptions.
//!
//! Formats like `100ms`, `1.5s`, `1m0s`, `2h3m4.005s`; parsing accepts any
//! sequence of `<decimal><unit>` pairs with units `ns`, `us`, `µs`, `ms`,
//! `s`, `m`, `h`.

use std::time::Duration;

use thiserror::Error;

const NANOS_PER_SEC: u64 = 1_000_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid duration {0:?}")]
pub struct DurationError(pub String);

/// Render a duration in compact unit text.
pub fn format_duration(d: Duration) -> String {
    let n = u64::try_from(d.as_nanos()).unwrap_or(u64::MAX);
    if n == 0 {
        return "0s".to_string();
    }
    if n < NANOS_PER_SEC {
        let (unit, div, width) = if n < 1_000 {
            ("ns", 1, 0)
        } else if n < 1_000_000 {
            ("µs", 1_000, 3)
        } else {
            ("ms", 1_000_000, 6)
        };
        return format!("{}{unit}", with_fraction(n / div, n % div, width));
    }

    let total_secs = n / NANOS_PER_SEC;
    let frac = n % NANOS_PER_SEC;
    let hours = total_secs / 3600;
    let minutes = (total_secs / 60) % 60;
    let secs = total_secs % 60;

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{hours}h"));
    }
    if hours > 0 || minutes > 0 {
        out.push_str(&format!("{minutes}m"));
    }
    out.push_str(&with_fraction(secs, frac, 9));
    out.push('s');
    out
}

fn with_fraction(whole: u64, rem: u64, width: usize) -> String {
    if rem == 0 || width == 0 {
        return whole.to_string();
    }
    let digits = format!("{rem:0width$}");
    format!("{whole}.{}", digits.trim_end_matches('0'))
}

/// Parse compact unit text back into a duration.
pub fn parse_duration(text: &str) -> Result<Duration, DurationError> {
    let err = || DurationError(text.to_string());
    let s = text.strip_prefix('+').unwrap_or(text);
    if s.starts_with('-') {
        return Err(err());
    }
    if s == "0" {
        return Ok(Duration::ZERO);
    }
    if s.is_empty() {
        return Err(err());
    }

    let mut total: u128 = 0;
    let mut rest = s;
    while !rest.is_empty() {
        let num_len = rest.find(|c: char| !(c.is_ascii_digit() || c == '.')).ok_or_else(err)?;
        if num_len == 0 {
            return Err(err());
        }
        let (number, tail) = rest.split_at(num_len);
        let unit_len = tail.find(|c: char| c.is_ascii_digit() || c == '.').unwrap_or(tail.len());
        let (unit, next) = tail.split_at(unit_len);

        let scale: u128 = match unit {
            "ns" => 1,
            "us" | "µs" | "μs" => 1_000,
            "ms" => 1_000_000,
            "s" => 1_000_000_000,
            "m" => 60 * 1_000_000_000,
            "h" => 3600 * 1_000_000_000,
            _ => return Err(err()),
        };

        let (int_part, frac_part) = match number.split_once('.') {
            Some((i, f)) => (i, f),
            None => (number, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(err());
        }
        let int_val: u128 = if int_part.is_empty() { 0 } else { int_part.parse().map_err(|_| err())? };
        let mut value = int_val.checked_mul(scale).ok_or_else(err)?;

        let mut place = scale;
        for c in frac_part.chars() {
            let digit = u128::from(c.to_digit(10).ok_or_else(err)?);
            place /= 10;
            if place == 0 {
                break;
            }
            value += digit * place;
        }

        total = total.checked_add(value).ok_or_else(err)?;
        rest = next;
    }

    let nanos = u64::try_from(total).map_err(|_| err())?;
    Ok(Duration::from_nanos(nanos))
}

#[cfg(test)]
#[path = "time_fmt_tests.rs"]
mod tests;
