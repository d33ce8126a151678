// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration.
//!
//! Resolved in order: built-in defaults, the TOML file, environment
//! variables. The data directory and config file location come from the
//! environment only, since the file cannot name its own location.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use lemc_engine::{EngineConfig, SchedulerConfig};
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_BIND: &str = "127.0.0.1:5362";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no data directory: set LEMC_DATA")]
    NoDataDir,
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Keys accepted in `lemc.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    locker: Option<PathBuf>,
    queues: Option<PathBuf>,
    host_locker_path: Option<PathBuf>,
    docker_host: Option<String>,
    bind: Option<String>,
    worker_limit: Option<usize>,
    poll_ms: Option<u64>,
    outdated_ms: Option<u64>,
    drain_timeout_ms: Option<u64>,
    apps_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub locker_dir: PathBuf,
    pub queues_dir: PathBuf,
    /// Locker path as seen by the container runtime's host
    pub host_locker: Option<PathBuf>,
    pub docker_host: Option<String>,
    pub bind: SocketAddr,
    pub worker_limit: usize,
    pub poll: Duration,
    pub outdated: Duration,
    pub drain_timeout: Duration,
    pub apps_file: PathBuf,
}

impl Config {
    /// Load from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::resolve(|key| std::env::var(key).ok().filter(|v| !v.is_empty()))
    }

    /// Resolve with `env` standing in for the process environment.
    pub fn resolve(env: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let data_dir = match env("LEMC_DATA") {
            Some(dir) => PathBuf::from(dir),
            None => dirs::data_local_dir().ok_or(ConfigError::NoDataDir)?.join("lemc"),
        };
        let file = match env("LEMC_CONFIG") {
            Some(path) => read_file(Path::new(&path))?,
            None => {
                let path = data_dir.join("lemc.toml");
                if path.exists() {
                    read_file(&path)?
                } else {
                    FileConfig::default()
                }
            }
        };

        let locker_dir = env("LEMC_LOCKER").map(PathBuf::from).or(file.locker).unwrap_or_else(|| data_dir.join("locker"));
        let queues_dir = env("LEMC_QUEUES").map(PathBuf::from).or(file.queues).unwrap_or_else(|| locker_dir.join("queues"));
        let bind_text = env("LEMC_BIND").or(file.bind).unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_text
            .parse()
            .map_err(|_| ConfigError::Invalid { key: "LEMC_BIND", value: bind_text.clone() })?;

        Ok(Self {
            host_locker: env("LEMC_HOST_LOCKER_PATH").map(PathBuf::from).or(file.host_locker_path),
            docker_host: env("LEMC_DOCKER_HOST").or(file.docker_host),
            bind,
            worker_limit: number(&env, "LEMC_WORKER_LIMIT", file.worker_limit, 10)?,
            poll: Duration::from_millis(number(&env, "LEMC_POLL_MS", file.poll_ms, 250)?),
            outdated: Duration::from_millis(number(&env, "LEMC_OUTDATED_MS", file.outdated_ms, 1000)?),
            drain_timeout: Duration::from_millis(number(&env, "LEMC_DRAIN_TIMEOUT_MS", file.drain_timeout_ms, 5000)?),
            apps_file: env("LEMC_APPS_FILE").map(PathBuf::from).or(file.apps_file).unwrap_or_else(|| data_dir.join("apps.json")),
            locker_dir,
            queues_dir,
            data_dir,
        })
    }

    pub fn lock_path(&self) -> PathBuf {
        self.data_dir.join("lemcd.lock")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }

    pub fn engine(&self) -> EngineConfig {
        EngineConfig {
            scheduler: SchedulerConfig {
                worker_limit: self.worker_limit,
                poll: self.poll,
                outdated: self.outdated,
            },
            drain_timeout: self.drain_timeout,
        }
    }
}

fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let text = std::fs::read_to_string(path)
        .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
    toml::from_str(&text).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
}

fn number<T: std::str::FromStr>(
    env: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    file: Option<T>,
    default: T,
) -> Result<T, ConfigError> {
    match env(key) {
        Some(text) => text.trim().parse().map_err(|_| ConfigError::Invalid { key, value: text }),
        None => Ok(file.unwrap_or(default)),
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
