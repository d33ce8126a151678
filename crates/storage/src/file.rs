// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Directory-backed queue: one JSON file per pending job, named by its
//! next run time in epoch nanoseconds.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lemc_core::{QueueName, RunningState, ScheduledJob};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::record::{decode, encode};
use crate::store::{check, QueueError, QueueStore};

/// Outcome of scanning a queue directory at startup.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RecoveryReport {
    pub kept: usize,
    pub removed: usize,
}

pub struct FileQueue {
    dir: PathBuf,
    name: QueueName,
    running: Arc<RunningState>,
    lock: Mutex<()>,
}

impl FileQueue {
    /// Open (creating if needed) the queue directory `root/<name>`.
    pub fn open(root: &Path, name: QueueName, running: Arc<RunningState>) -> Result<Self, QueueError> {
        let dir = root.join(name.dir_name());
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, name, running, lock: Mutex::new(()) })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, next_run_time: i64) -> PathBuf {
        self.dir.join(format!("{next_run_time}.json"))
    }

    /// Queue files sorted by next run time. Temp files and foreign names are ignored.
    fn entries(&self) -> Result<Vec<(i64, PathBuf)>, QueueError> {
        let mut out = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else { continue };
            if name.starts_with('.') {
                continue;
            }
            let stem = name.strip_suffix(".json").unwrap_or(name);
            match stem.parse::<i64>() {
                Ok(nrt) => out.push((nrt, entry.path())),
                Err(_) => debug!(queue = %self.name, file = name, "ignoring non-queue file"),
            }
        }
        out.sort_by_key(|(nrt, _)| *nrt);
        Ok(out)
    }

    fn load(&self, path: &Path) -> Result<ScheduledJob, QueueError> {
        let bytes = fs::read(path)?;
        let job = decode(self.name, &bytes)
            .map_err(|source| QueueError::Corrupt { path: path.to_path_buf(), source })?;
        check(self.name, &job)?;
        Ok(job)
    }

    fn discard(&self, path: &Path, err: &QueueError) {
        warn!(queue = %self.name, path = %path.display(), error = %err, "removing unreadable queue record");
        if let Err(e) = fs::remove_file(path) {
            warn!(queue = %self.name, path = %path.display(), error = %e, "failed to remove queue record");
        }
    }

    fn write(&self, job: &ScheduledJob) -> Result<(), QueueError> {
        let bytes = encode(job)?;
        let tmp = self.dir.join(format!(".{}.json.tmp", job.next_run_time));
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, self.path_for(job.next_run_time))?;
        Ok(())
    }

    /// Scan persisted records after a restart.
    ///
    /// Unreadable or invalid records and spent run-once records are deleted.
    /// Valid records keep their persisted next run time.
    pub fn recover(&self) -> Result<RecoveryReport, QueueError> {
        let _guard = self.lock.lock();
        let mut report = RecoveryReport::default();
        for (nrt, path) in self.entries()? {
            match self.load(&path) {
                Ok(job) if job.trigger.is_expired() => {
                    info!(queue = %self.name, job_key = %job.detail.key, "removing expired job");
                    fs::remove_file(&path)?;
                    report.removed += 1;
                }
                Ok(job) if job.next_run_time != nrt => {
                    // keep file name == next run time
                    fs::remove_file(&path)?;
                    self.push_locked(job)?;
                    report.kept += 1;
                }
                Ok(_) => report.kept += 1,
                Err(e) => {
                    self.discard(&path, &e);
                    report.removed += 1;
                }
            }
        }
        info!(queue = %self.name, kept = report.kept, removed = report.removed, "queue recovered");
        Ok(report)
    }

    fn push_locked(&self, mut job: ScheduledJob) -> Result<i64, QueueError> {
        check(self.name, &job)?;
        while self.path_for(job.next_run_time).exists() {
            job.next_run_time = job.next_run_time.saturating_add(1);
        }
        self.write(&job)?;
        debug!(queue = %self.name, job_key = %job.detail.key, next_run_time = job.next_run_time, "pushed job");
        Ok(job.next_run_time)
    }

    fn find(&self, key: &str) -> Result<(PathBuf, ScheduledJob), QueueError> {
        for (_, path) in self.entries()? {
            match self.load(&path) {
                Ok(job) if job.detail.key == key => return Ok((path, job)),
                Ok(_) => {}
                Err(e) => warn!(queue = %self.name, path = %path.display(), error = %e, "skipping unreadable queue record"),
            }
        }
        Err(QueueError::NotFound)
    }
}

impl QueueStore for FileQueue {
    fn name(&self) -> QueueName {
        self.name
    }

    fn push(&self, job: ScheduledJob) -> Result<i64, QueueError> {
        let _guard = self.lock.lock();
        self.push_locked(job)
    }

    fn pop(&self) -> Result<ScheduledJob, QueueError> {
        let _guard = self.lock.lock();
        for (_, path) in self.entries()? {
            match self.load(&path) {
                Ok(job) => {
                    fs::remove_file(&path)?;
                    self.running.add(&job.detail.key);
                    return Ok(job);
                }
                Err(e) => self.discard(&path, &e),
            }
        }
        Err(QueueError::NotFound)
    }

    fn head(&self) -> Result<ScheduledJob, QueueError> {
        let _guard = self.lock.lock();
        for (_, path) in self.entries()? {
            match self.load(&path) {
                Ok(job) => return Ok(job),
                Err(e) => warn!(queue = %self.name, path = %path.display(), error = %e, "skipping unreadable queue record"),
            }
        }
        Err(QueueError::NotFound)
    }

    fn get(&self, key: &str) -> Result<ScheduledJob, QueueError> {
        let _guard = self.lock.lock();
        self.find(key).map(|(_, job)| job)
    }

    fn remove(&self, key: &str) -> Result<ScheduledJob, QueueError> {
        let _guard = self.lock.lock();
        let (path, job) = self.find(key)?;
        fs::remove_file(&path)?;
        Ok(job)
    }

    fn size(&self) -> Result<usize, QueueError> {
        let _guard = self.lock.lock();
        Ok(self.entries()?.len())
    }

    fn clear(&self) -> Result<(), QueueError> {
        let _guard = self.lock.lock();
        for (_, path) in self.entries()? {
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    fn scheduled_jobs(&self) -> Result<Vec<ScheduledJob>, QueueError> {
        let _guard = self.lock.lock();
        let mut jobs = Vec::new();
        for (_, path) in self.entries()? {
            if let Ok(job) = self.load(&path) {
                jobs.push(job);
            }
        }
        Ok(jobs)
    }
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;
