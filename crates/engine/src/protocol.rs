// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structured commands embedded in container stdout.
//!
//! One command per line, recognized by prefix:
//! `lemc.<target>.<verb>;<payload>`. Lines without a known prefix are plain
//! output.

use crate::files::CacheKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogCommand {
    CssTrunc,
    CssAppend,
    CssBuffer,
    HtmlTrunc,
    HtmlAppend,
    HtmlBuffer,
    JsExec,
    JsTrunc,
    Err,
    Env,
}

/// How a command changes its cache file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheWrite {
    Replace(CacheKind),
    Append(CacheKind),
}

impl LogCommand {
    pub const ALL: [LogCommand; 10] = [
        LogCommand::CssTrunc,
        LogCommand::CssAppend,
        LogCommand::CssBuffer,
        LogCommand::HtmlTrunc,
        LogCommand::HtmlAppend,
        LogCommand::HtmlBuffer,
        LogCommand::JsExec,
        LogCommand::JsTrunc,
        LogCommand::Err,
        LogCommand::Env,
    ];

    pub fn prefix(self) -> &'static str {
        match self {
            Self::CssTrunc => "lemc.css.trunc;",
            Self::CssAppend => "lemc.css.append;",
            Self::CssBuffer => "lemc.css.buffer;",
            Self::HtmlTrunc => "lemc.html.trunc;",
            Self::HtmlAppend => "lemc.html.append;",
            Self::HtmlBuffer => "lemc.html.buffer;",
            Self::JsExec => "lemc.js.exec;",
            Self::JsTrunc => "lemc.js.trunc;",
            Self::Err => "lemc.err;",
            Self::Env => "lemc.env;",
        }
    }

    /// Split a line into its command and payload.
    pub fn parse(line: &str) -> Option<(Self, &str)> {
        Self::ALL.iter().find_map(|cmd| line.strip_prefix(cmd.prefix()).map(|payload| (*cmd, payload)))
    }

    pub fn cache_write(self) -> Option<CacheWrite> {
        match self {
            Self::CssTrunc => Some(CacheWrite::Replace(CacheKind::Css)),
            Self::CssAppend | Self::CssBuffer => Some(CacheWrite::Append(CacheKind::Css)),
            Self::HtmlTrunc => Some(CacheWrite::Replace(CacheKind::Html)),
            Self::HtmlAppend | Self::HtmlBuffer => Some(CacheWrite::Append(CacheKind::Html)),
            Self::JsExec | Self::JsTrunc => Some(CacheWrite::Replace(CacheKind::Js)),
            Self::Err | Self::Env => None,
        }
    }

    pub fn is_trunc(self) -> bool {
        matches!(self, Self::CssTrunc | Self::HtmlTrunc | Self::JsTrunc)
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
