// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Seam between the HTTP surface and the engine's submission path.

use async_trait::async_trait;
use lemc_adapters::{Broadcaster, ContainerRuntime};
use lemc_core::{Clock, JobRecipe};
use lemc_engine::{Engine, SubmitError};

#[async_trait]
pub trait Launcher: Send + Sync {
    /// Submit `job` for immediate execution. Returns the now-queue key.
    async fn launch(&self, job: JobRecipe) -> Result<String, SubmitError>;
}

#[async_trait]
impl<R, B, C> Launcher for Engine<R, B, C>
where
    R: ContainerRuntime,
    B: Broadcaster,
    C: Clock,
{
    async fn launch(&self, job: JobRecipe) -> Result<String, SubmitError> {
        self.submit(job).await
    }
}
