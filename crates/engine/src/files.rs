// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-page cache files and the per-recipe step log.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FilesError {
    #[error("{op} {}: {source}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FilesError {
    fn io<'a>(op: &'static str, path: &'a Path) -> impl FnOnce(io::Error) -> Self + 'a {
        move |source| Self::Io { op, path: path.to_path_buf(), source }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKind {
    Html,
    Css,
    Js,
}

impl CacheKind {
    pub const ALL: [CacheKind; 3] = [CacheKind::Html, CacheKind::Css, CacheKind::Js];

    pub fn file_name(self) -> &'static str {
        match self {
            Self::Html => "cache.html",
            Self::Css => "cache.css",
            Self::Js => "cache.js",
        }
    }
}

/// The rendered state of one page: what a reconnecting browser replays.
#[derive(Debug, Clone)]
pub struct CacheFiles {
    dir: PathBuf,
}

impl CacheFiles {
    /// Open the cache in `dir`, creating the directory and empty files.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, FilesError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(FilesError::io("create", &dir))?;
        let cache = Self { dir };
        for kind in CacheKind::ALL {
            let path = cache.path(kind);
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(FilesError::io("open", &path))?;
        }
        Ok(cache)
    }

    pub fn path(&self, kind: CacheKind) -> PathBuf {
        self.dir.join(kind.file_name())
    }

    /// Replace the file's content with `payload`.
    pub fn trunc(&self, kind: CacheKind, payload: &str) -> Result<(), FilesError> {
        let path = self.path(kind);
        let mut file = File::create(&path).map_err(FilesError::io("truncate", &path))?;
        file.write_all(payload.as_bytes()).map_err(FilesError::io("write", &path))?;
        file.sync_data().map_err(FilesError::io("sync", &path))
    }

    /// Append `payload` as one line.
    pub fn append(&self, kind: CacheKind, payload: &str) -> Result<(), FilesError> {
        let path = self.path(kind);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(FilesError::io("open", &path))?;
        writeln!(file, "{payload}").map_err(FilesError::io("append", &path))?;
        file.sync_data().map_err(FilesError::io("sync", &path))
    }

    pub fn read(&self, kind: CacheKind) -> Result<String, FilesError> {
        let path = self.path(kind);
        fs::read_to_string(&path).map_err(FilesError::io("read", &path))
    }
}

/// Go-style layout used in step log timestamps.
const STEP_LOG_TIME: &str = "%a %b %-d %H:%M:%S %Z %Y";

/// Append-only log of every line a recipe's containers print.
///
/// Format:
/// `[<ts>] [image:<hash>] [name:<image>] [event:<unix secs at open>] [step:<id>] <msg>`
pub struct StepLog {
    path: PathBuf,
    event_id: i64,
    writer: BufWriter<File>,
}

impl StepLog {
    pub fn open(path: impl Into<PathBuf>, opened_at: DateTime<Utc>) -> Result<Self, FilesError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(FilesError::io("create", parent))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(FilesError::io("open", &path))?;
        Ok(Self { event_id: opened_at.timestamp(), writer: BufWriter::new(file), path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn event_id(&self) -> i64 {
        self.event_id
    }

    pub fn write(
        &mut self,
        at: DateTime<Utc>,
        step_id: &str,
        image_hash: &str,
        image_name: &str,
        message: &str,
    ) -> Result<(), FilesError> {
        writeln!(
            self.writer,
            "[{}] [image:{image_hash}] [name:{image_name}] [event:{}] [step:{step_id}] {message}",
            at.format(STEP_LOG_TIME),
            self.event_id,
        )
        .map_err(FilesError::io("write", &self.path))
    }

    pub fn flush(&mut self) -> Result<(), FilesError> {
        self.writer.flush().map_err(FilesError::io("flush", &self.path))
    }
}

impl Drop for StepLog {
    fn drop(&mut self) {
        if let Err(e) = self.writer.flush() {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to flush step log");
        }
    }
}

#[cfg(test)]
#[path = "files_tests.rs"]
mod tests;
