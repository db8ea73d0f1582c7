// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Container engine adapters
//!
//! The `ContainerEngine` trait is the only way the launcher touches engine
//! state. It is shared by every concurrent provisioning request, so
//! implementations are stateless handles (`Clone + Send + Sync`).
//!
//! # Module layout
//!
//! - [`docker`]: Docker Engine API via `bollard`
//! - `fake`: in-memory engine recording every call (tests only)

mod docker;
#[cfg(any(test, feature = "test-support"))]
mod fake;

pub use docker::DockerEngine;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{EngineCall, FakeContainerIo, FakeEngine, FakeOp};

use async_trait::async_trait;
use dh_core::{CommitSpec, ContainerId, ContainerSpec, ImageName, LifecycleOutcome, ProgressEvent};
use futures_util::stream::BoxStream;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};

/// Errors from container engine operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The engine has no container with this id (already removed or never existed)
    #[error("container not found: {0}")]
    ContainerNotFound(String),
    #[error("engine error: {0}")]
    Engine(String),
}

impl EngineError {
    /// Fold a teardown step result into its outcome.
    pub fn outcome(result: Result<(), EngineError>) -> LifecycleOutcome {
        match result {
            Ok(()) => LifecycleOutcome::Success,
            Err(EngineError::ContainerNotFound(_)) => LifecycleOutcome::NotFound,
            Err(EngineError::Engine(detail)) => LifecycleOutcome::Failed(detail),
        }
    }
}

pub type BoxReader = Box<dyn AsyncRead + Send + Unpin>;
pub type BoxWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Pull progress, ending with `Err` if the pull itself failed.
pub type ProgressStream<'a> = BoxStream<'a, Result<ProgressEvent, EngineError>>;

/// Result of creating a container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedContainer {
    pub id: ContainerId,
    /// Non-fatal advisories from the engine (e.g. a deprecated option)
    pub warnings: Vec<String>,
}

/// A container's attached stdio, already split into separate streams
pub struct ContainerStreams {
    pub stdin: BoxWriter,
    pub stdout: BoxReader,
    pub stderr: BoxReader,
}

/// Adapter for a container engine
#[async_trait]
pub trait ContainerEngine: Clone + Send + Sync + 'static {
    /// Pull an image, yielding one event per progress tick.
    fn pull_image<'a>(&'a self, image: &ImageName) -> ProgressStream<'a>;

    async fn create_container(&self, spec: &ContainerSpec)
        -> Result<CreatedContainer, EngineError>;

    /// Attach to stdin/stdout/stderr. Must be called before `start_container`
    /// so no early output is lost.
    async fn attach_container(&self, id: &ContainerId) -> Result<ContainerStreams, EngineError>;

    async fn start_container(&self, id: &ContainerId) -> Result<(), EngineError>;

    async fn stop_container(&self, id: &ContainerId) -> Result<(), EngineError>;

    /// Persist the container's filesystem as `commit.repository:commit.tag`.
    async fn commit_container(
        &self,
        id: &ContainerId,
        commit: &CommitSpec,
    ) -> Result<(), EngineError>;

    async fn remove_container(&self, id: &ContainerId) -> Result<(), EngineError>;
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
