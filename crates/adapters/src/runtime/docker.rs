// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Docker engine runtime over bollard.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use bollard::auth::DockerCredentials;
use bollard::container::LogOutput;
use bollard::errors::Error as BollardError;
use bollard::models::{ContainerCreateBody, HostConfig};
use bollard::query_parameters::{
    CreateContainerOptions, CreateImageOptions, InspectContainerOptions, ListContainersOptions,
    LogsOptions, RemoveContainerOptions, StartContainerOptions, StopContainerOptions,
    WaitContainerOptions,
};
use bollard::Docker;
use futures_util::stream::TryStreamExt;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::{ContainerRuntime, ContainerSpec, RegistryAuth, RuntimeError};
use crate::lines::LineSplitter;

const CONNECT_TIMEOUT_SECS: u64 = 120;
const LOG_CHANNEL: usize = 256;

impl From<BollardError> for RuntimeError {
    fn from(e: BollardError) -> Self {
        match e {
            BollardError::DockerResponseServerError { status_code: 404, message } => {
                RuntimeError::NoSuchContainer(message)
            }
            other => RuntimeError::Api(other.to_string()),
        }
    }
}

#[derive(Clone)]
pub struct DockerRuntime {
    docker: Docker,
}

impl DockerRuntime {
    /// Connect to `host` (`unix://...`, `tcp://...`, `http://...`), or the
    /// local defaults when unset.
    pub fn connect(host: Option<&str>) -> Result<Self, RuntimeError> {
        let docker = match host {
            None => Docker::connect_with_local_defaults(),
            Some(h) if h.starts_with("unix://") => {
                Docker::connect_with_socket(h, CONNECT_TIMEOUT_SECS, bollard::API_DEFAULT_VERSION)
            }
            Some(h) => Docker::connect_with_http(h, CONNECT_TIMEOUT_SECS, bollard::API_DEFAULT_VERSION),
        }
        .map_err(|e| RuntimeError::Unavailable(e.to_string()))?;
        Ok(Self { docker })
    }
}

fn is_not_found(e: &BollardError) -> bool {
    matches!(e, BollardError::DockerResponseServerError { status_code: 404, .. })
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn ping(&self) -> Result<(), RuntimeError> {
        self.docker.ping().await.map_err(|e| RuntimeError::Unavailable(e.to_string()))?;
        Ok(())
    }

    async fn image_exists(&self, image: &str) -> Result<bool, RuntimeError> {
        match self.docker.inspect_image(image).await {
            Ok(_) => Ok(true),
            Err(e) if is_not_found(&e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn pull_image(&self, image: &str, auth: Option<&RegistryAuth>) -> Result<(), RuntimeError> {
        debug!(image, "pulling image");
        let options = Some(CreateImageOptions { from_image: Some(image.to_string()), ..Default::default() });
        let credentials = auth.map(|a| DockerCredentials {
            username: Some(a.username.clone()),
            password: Some(a.password.clone()),
            ..Default::default()
        });
        let mut stream = self.docker.create_image(options, None, credentials);
        while let Some(progress) = stream.try_next().await.map_err(|e| RuntimeError::PullFailed {
            image: image.to_string(),
            message: e.to_string(),
        })? {
            if let Some(status) = progress.status {
                debug!(image, %status, "pull progress");
            }
        }
        Ok(())
    }

    async fn image_id(&self, image: &str) -> Result<String, RuntimeError> {
        let inspect = self.docker.inspect_image(image).await.map_err(|e| {
            if is_not_found(&e) {
                RuntimeError::ImageNotFound(image.to_string())
            } else {
                e.into()
            }
        })?;
        Ok(inspect.id.unwrap_or_default())
    }

    async fn remove_labeled(&self, labels: &BTreeMap<String, String>) -> Result<usize, RuntimeError> {
        let mut filters = HashMap::new();
        filters.insert(
            "label".to_string(),
            labels.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>(),
        );
        let options = ListContainersOptions { all: true, filters: Some(filters), ..Default::default() };
        let containers = self.docker.list_containers(Some(options)).await?;

        let mut removed = 0;
        for id in containers.into_iter().filter_map(|c| c.id) {
            let options = RemoveContainerOptions { force: true, v: true, link: false };
            match self.docker.remove_container(&id, Some(options)).await {
                Ok(()) => removed += 1,
                Err(e) => warn!(container = %id, error = %e, "failed to remove stale container"),
            }
        }
        Ok(removed)
    }

    async fn create_and_start(&self, spec: &ContainerSpec) -> Result<String, RuntimeError> {
        let host_config = HostConfig {
            binds: (!spec.mounts.is_empty()).then(|| spec.mounts.iter().map(|m| m.bind()).collect()),
            ..Default::default()
        };
        let body = ContainerCreateBody {
            image: Some(spec.image.clone()),
            env: Some(spec.env.clone()),
            labels: Some(spec.labels.clone().into_iter().collect()),
            entrypoint: (!spec.entrypoint.is_empty()).then(|| spec.entrypoint.clone()),
            cmd: (!spec.cmd.is_empty()).then(|| spec.cmd.clone()),
            stop_timeout: spec.stop_timeout.map(|d| d.as_secs() as i64),
            host_config: Some(host_config),
            ..Default::default()
        };
        let options = CreateContainerOptions { name: Some(spec.name.clone()), platform: String::new() };
        let created = self.docker.create_container(Some(options), body).await.map_err(|e| {
            if is_not_found(&e) {
                RuntimeError::ImageNotFound(spec.image.clone())
            } else {
                e.into()
            }
        })?;
        for warning in &created.warnings {
            warn!(container = %spec.name, %warning, "create warning");
        }
        self.docker.start_container(&created.id, None::<StartContainerOptions>).await?;
        Ok(created.id)
    }

    async fn log_lines(&self, id: &str) -> Result<mpsc::Receiver<String>, RuntimeError> {
        let (tx, rx) = mpsc::channel(LOG_CHANNEL);
        let docker = self.docker.clone();
        let id = id.to_string();
        tokio::spawn(async move {
            let options = LogsOptions {
                follow: true,
                stdout: true,
                stderr: true,
                tail: "all".to_string(),
                ..Default::default()
            };
            let mut stream = docker.logs(&id, Some(options));
            let mut splitter = LineSplitter::new();
            loop {
                match stream.try_next().await {
                    Ok(Some(
                        LogOutput::StdOut { message }
                        | LogOutput::StdErr { message }
                        | LogOutput::Console { message },
                    )) => {
                        for line in splitter.push(&message) {
                            if tx.send(line).await.is_err() {
                                return;
                            }
                        }
                    }
                    Ok(Some(LogOutput::StdIn { .. })) => {}
                    // end of stream is the normal exit path
                    Ok(None) => break,
                    Err(e) => {
                        debug!(container = %id, error = %e, "log stream ended");
                        break;
                    }
                }
            }
            if let Some(rest) = splitter.finish() {
                let _ = tx.send(rest).await;
            }
        });
        Ok(rx)
    }

    async fn wait(&self, id: &str) -> Result<i64, RuntimeError> {
        let mut stream = self.docker.wait_container(id, None::<WaitContainerOptions>);
        match stream.try_next().await {
            Ok(Some(status)) => Ok(status.status_code),
            // non-zero exits surface as an error carrying the code
            Err(BollardError::DockerContainerWaitError { code, .. }) => Ok(code),
            Ok(None) => {
                let details = self.docker.inspect_container(id, None::<InspectContainerOptions>).await?;
                Ok(details.state.and_then(|s| s.exit_code).unwrap_or(0))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn stop(&self, id: &str, grace: Duration) -> Result<(), RuntimeError> {
        let options = StopContainerOptions { t: Some(grace.as_secs() as i32), ..Default::default() };
        match self.docker.stop_container(id, Some(options)).await {
            Ok(()) => Ok(()),
            // already stopped
            Err(BollardError::DockerResponseServerError { status_code: 304, .. }) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn remove(&self, id: &str) -> Result<(), RuntimeError> {
        let options = RemoveContainerOptions { force: true, v: true, link: false };
        self.docker.remove_container(id, Some(options)).await?;
        Ok(())
    }
}
