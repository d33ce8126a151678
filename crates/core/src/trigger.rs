// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Step trigger expressions and persisted schedule triggers.
//!
//! A step's `do` field selects its queue (`now`, `in.<N>.<unit>`,
//! `every.<N>.<unit>`). Once scheduled, the job carries a [`Trigger`] whose
//! textual description is what lands in the queue file.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use thiserror::Error;

use crate::clock::duration_nanos;
use crate::scope::QueueName;
use crate::time_fmt::{format_duration, parse_duration, DurationError};

/// Separator between description fields.
pub const SEP: char = '⇶';

/// Delay given to every freshly submitted recipe job.
pub const NOW_DELAY: Duration = Duration::from_millis(100);

#[allow(clippy::expect_used)]
static IN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^in\.(\d+)\.(\w+)$").expect("constant regex pattern is valid"));

#[allow(clippy::expect_used)]
static EVERY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^every\.(\d+)\.(\w+)$").expect("constant regex pattern is valid"));

#[allow(clippy::expect_used)]
static TIMEOUT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.(\w+)$").expect("constant regex pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TriggerError {
    #[error("unrecognized trigger expression {0:?}")]
    Expression(String),
    #[error("unknown time unit {0:?}")]
    Unit(String),
    #[error("invalid timeout {0:?}")]
    Timeout(String),
    #[error("malformed trigger description {0:?}")]
    Description(String),
    #[error(transparent)]
    Duration(#[from] DurationError),
}

/// Parsed form of a step's `do` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepTrigger {
    Now,
    In(Duration),
    Every(Duration),
}

impl StepTrigger {
    pub fn parse(expr: &str) -> Result<Self, TriggerError> {
        if expr == "now" {
            return Ok(Self::Now);
        }
        if let Some(caps) = IN_PATTERN.captures(expr) {
            return Ok(Self::In(scaled(&caps[1], &caps[2])?));
        }
        if let Some(caps) = EVERY_PATTERN.captures(expr) {
            return Ok(Self::Every(scaled(&caps[1], &caps[2])?));
        }
        Err(TriggerError::Expression(expr.to_string()))
    }

    pub fn queue(&self) -> QueueName {
        match self {
            Self::Now => QueueName::Now,
            Self::In(_) => QueueName::In,
            Self::Every(_) => QueueName::Every,
        }
    }
}

fn scaled(count: &str, unit: &str) -> Result<Duration, TriggerError> {
    let n: u64 = count.parse().map_err(|_| TriggerError::Expression(count.to_string()))?;
    let secs = match unit {
        "second" | "seconds" => 1,
        "minute" | "minutes" => 60,
        "hour" | "hours" => 3600,
        other => return Err(TriggerError::Unit(other.to_string())),
    };
    Ok(Duration::from_secs(n.saturating_mul(secs)))
}

/// Parse a step timeout such as `30.seconds` or `2.minutes`.
pub fn parse_step_timeout(text: &str) -> Result<Duration, TriggerError> {
    let caps = TIMEOUT_PATTERN.captures(text).ok_or_else(|| TriggerError::Timeout(text.to_string()))?;
    let n: u64 = caps[1].parse().map_err(|_| TriggerError::Timeout(text.to_string()))?;
    let secs = match &caps[2] {
        "second" | "seconds" => 1,
        "minute" | "minutes" => 60,
        _ => return Err(TriggerError::Timeout(text.to_string())),
    };
    Ok(Duration::from_secs(n.saturating_mul(secs)))
}

/// Schedule trigger attached to a queued job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Fire once after `delay`; `expired` once it has fired.
    RunOnce { delay: Duration, expired: bool },
    /// Fire every `interval`, forever.
    Simple { interval: Duration },
}

impl Trigger {
    pub fn run_once(delay: Duration) -> Self {
        Self::RunOnce { delay, expired: false }
    }

    pub fn simple(interval: Duration) -> Self {
        Self::Simple { interval }
    }

    /// First fire time when scheduled at `now`.
    pub fn first_fire(&self, now: i64) -> i64 {
        match self {
            Self::RunOnce { delay, .. } => now.saturating_add(duration_nanos(*delay)),
            Self::Simple { interval } => now.saturating_add(duration_nanos(*interval)),
        }
    }

    /// Next fire time after a fire at `prev`, or `None` when the trigger is spent.
    ///
    /// Recurring triggers skip whole intervals so the result is strictly after `now`.
    pub fn next_fire(&self, prev: i64, now: i64) -> Option<i64> {
        match self {
            Self::RunOnce { .. } => None,
            Self::Simple { interval } => {
                let step = duration_nanos(*interval).max(1);
                let next = prev.saturating_add(step);
                if next > now {
                    return Some(next);
                }
                let behind = now.saturating_sub(prev) / step + 1;
                Some(prev.saturating_add(behind.saturating_mul(step)))
            }
        }
    }

    pub fn is_expired(&self) -> bool {
        matches!(self, Self::RunOnce { expired: true, .. })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::RunOnce { .. } => "RunOnceTrigger",
            Self::Simple { .. } => "SimpleTrigger",
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RunOnce { delay, expired } => {
                let status = if *expired { "expired" } else { "valid" };
                write!(f, "RunOnceTrigger{SEP}{}{SEP}{status}", format_duration(*delay))
            }
            Self::Simple { interval } => write!(f, "SimpleTrigger{SEP}{}", format_duration(*interval)),
        }
    }
}

impl FromStr for Trigger {
    type Err = TriggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(SEP).collect();
        if !(2..=3).contains(&parts.len()) {
            return Err(TriggerError::Description(s.to_string()));
        }
        let duration = parse_duration(parts[1])?;
        match parts[0] {
            "RunOnceTrigger" => Ok(Self::RunOnce {
                delay: duration,
                expired: parts.get(2).is_some_and(|p| *p == "expired"),
            }),
            "SimpleTrigger" => Ok(Self::Simple { interval: duration }),
            _ => Err(TriggerError::Description(s.to_string())),
        }
    }
}

#[cfg(test)]
#[path = "trigger_tests.rs"]
mod tests;
