// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pull, create, attach and start one agent container.

use crate::error::LaunchError;
use crate::puller::pull_image;
use crate::reaper::Reaper;
use crate::stream::{SharedReader, SharedWriter};
use dh_adapters::{BuildLog, ContainerEngine, ContainerStreams, EngineError};
use dh_core::{ContainerId, ContainerSpec};

/// A started container with its attached stdio.
///
/// Owned by exactly one launch; reaping consumes it.
pub struct ContainerHandle {
    pub(crate) id: ContainerId,
    pub(crate) stdin: SharedWriter,
    pub(crate) stdout: SharedReader,
    pub(crate) stderr: SharedReader,
}

impl ContainerHandle {
    pub fn new(id: ContainerId, streams: ContainerStreams) -> Self {
        Self {
            id,
            stdin: SharedWriter::new(streams.stdin),
            stdout: SharedReader::new(streams.stdout),
            stderr: SharedReader::new(streams.stderr),
        }
    }

    pub fn id(&self) -> &ContainerId {
        &self.id
    }
}

/// Brings agent containers up
#[derive(Clone)]
pub struct Provisioner<E> {
    engine: E,
}

impl<E: ContainerEngine> Provisioner<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    /// Validate, pull, create, attach, start.
    ///
    /// No container is created unless the pull succeeds. Stdio is attached
    /// before start so early agent output is not lost. A container that was
    /// created but failed to attach or start is stopped and removed before
    /// the error is returned.
    pub async fn provision(
        &self,
        spec: &ContainerSpec,
        log: &dyn BuildLog,
    ) -> Result<ContainerHandle, LaunchError> {
        spec.validate().map_err(|e| LaunchError::CreateFailed(e.to_string()))?;

        pull_image(&self.engine, &spec.image, log).await?;
        log.info(&format!("### Running job with image {}", spec.image));

        tracing::info!(image = %spec.image, binds = spec.binds.len(), "creating container");
        let created = self.engine.create_container(spec).await.map_err(|e| {
            tracing::error!(image = %spec.image, error = %e, "container create failed");
            LaunchError::CreateFailed(e.to_string())
        })?;
        let id = created.id;
        for warning in &created.warnings {
            tracing::warn!(container_id = %id, warning = %warning, "container created with warning");
            log.info(&format!("WARN: {warning}"));
        }

        match self.attach_and_start(&id).await {
            Ok(streams) => {
                tracing::info!(container_id = %id, short_id = id.short(), "container started");
                Ok(ContainerHandle::new(id, streams))
            }
            Err(e) => {
                tracing::error!(container_id = %id, error = %e, "container start failed, retiring");
                Reaper::new(self.engine.clone()).retire(&id).await;
                Err(e.into())
            }
        }
    }

    async fn attach_and_start(&self, id: &ContainerId) -> Result<ContainerStreams, EngineError> {
        let streams = self.engine.attach_container(id).await?;
        self.engine.start_container(id).await?;
        Ok(streams)
    }
}

#[cfg(test)]
#[path = "provisioner_tests.rs"]
mod tests;
