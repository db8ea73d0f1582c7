// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic teardown of agent containers.
//!
//! Teardown never fails: each step runs regardless of how the previous one
//! went, and its outcome is recorded in a [`ReapReport`].

use crate::forwarder::{Forwarder, DEFAULT_FORWARDER_JOIN};
use crate::provisioner::ContainerHandle;
use dh_adapters::{ContainerEngine, EngineError};
use dh_core::{CommitSpec, ContainerId, LifecycleOutcome};
use std::time::Duration;

/// Outcome of every step of one teardown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReapReport {
    pub stop: LifecycleOutcome,
    /// `None` when no commit was configured
    pub commit: Option<LifecycleOutcome>,
    pub remove: LifecycleOutcome,
}

impl ReapReport {
    /// True when every step completed (succeeded or found nothing to do)
    pub fn is_complete(&self) -> bool {
        self.stop.is_complete()
            && self.commit.as_ref().map_or(true, LifecycleOutcome::is_complete)
            && self.remove.is_complete()
    }

    /// Report for a teardown task that died before finishing
    pub(crate) fn aborted(detail: &str) -> Self {
        let failed = LifecycleOutcome::Failed(detail.to_string());
        Self { stop: failed.clone(), commit: None, remove: failed }
    }
}

/// Tears down containers: close stdio, stop, commit (optional), remove.
#[derive(Clone)]
pub struct Reaper<E> {
    engine: E,
    commit: Option<CommitSpec>,
    forwarder_join: Duration,
}

impl<E: ContainerEngine> Reaper<E> {
    pub fn new(engine: E) -> Self {
        Self { engine, commit: None, forwarder_join: DEFAULT_FORWARDER_JOIN }
    }

    /// Commit the container to this image after stopping it
    pub fn with_commit(mut self, commit: Option<CommitSpec>) -> Self {
        self.commit = commit;
        self
    }

    pub fn with_forwarder_join(mut self, timeout: Duration) -> Self {
        self.forwarder_join = timeout;
        self
    }

    /// Release everything a launched container holds.
    ///
    /// Streams close before the container stops, so the agent sees EOF on
    /// stdin rather than a kill mid-write. Consuming the handle makes a
    /// second reap of the same handle impossible.
    pub async fn reap(&self, handle: ContainerHandle, forwarder: Option<Forwarder>) -> ReapReport {
        let ContainerHandle { id, stdin, stdout, stderr } = handle;

        if let Err(e) = stdin.close().await {
            tracing::warn!(container_id = %id, error = %e, "failed to close container stdin");
        }
        stdout.close();
        stderr.close();

        if let Some(forwarder) = forwarder {
            forwarder.stop(self.forwarder_join).await;
        }

        self.retire(&id).await
    }

    /// Stop, commit (if configured) and remove a container by id.
    ///
    /// Used directly when there are no streams to close: provisioning
    /// failures after create, and containers leaked by a previous process.
    pub async fn retire(&self, id: &ContainerId) -> ReapReport {
        let stop = step(id, "stop", self.engine.stop_container(id).await);
        let commit = match &self.commit {
            Some(commit) => {
                tracing::info!(
                    container_id = %id,
                    repository = %commit.repository,
                    tag = %commit.tag,
                    "committing container"
                );
                Some(step(id, "commit", self.engine.commit_container(id, commit).await))
            }
            None => None,
        };
        let remove = step(id, "remove", self.engine.remove_container(id).await);

        let report = ReapReport { stop, commit, remove };
        tracing::info!(
            container_id = %id,
            stop = %report.stop,
            commit = %report.commit.as_ref().map_or("skipped".to_string(), ToString::to_string),
            remove = %report.remove,
            "container reaped"
        );
        report
    }
}

fn step(id: &ContainerId, name: &str, result: Result<(), EngineError>) -> LifecycleOutcome {
    let outcome = EngineError::outcome(result);
    match &outcome {
        LifecycleOutcome::Success => {}
        LifecycleOutcome::NotFound => {
            tracing::debug!(container_id = %id, step = name, "container already gone");
        }
        LifecycleOutcome::Failed(detail) => {
            tracing::warn!(container_id = %id, step = name, error = %detail, "teardown step failed");
        }
    }
    outcome
}

#[cfg(test)]
#[path = "reaper_tests.rs"]
mod tests;
