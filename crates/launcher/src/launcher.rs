// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hands a started container to a channel consumer and schedules its
//! teardown.

use crate::channel::{AgentChannel, ChannelSink, CloseCause, CloseSignal};
use crate::error::LaunchError;
use crate::forwarder::{Forwarder, DEFAULT_FORWARDER_JOIN};
use crate::provisioner::{ContainerHandle, Provisioner};
use crate::reaper::{ReapReport, Reaper};
use crate::request::LaunchRequest;
use dh_adapters::{BuildLog, ContainerEngine};
use dh_core::ContainerId;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::Instrument;

/// A launched agent.
///
/// Dropping the session does not tear the container down; closing the
/// channel does.
pub struct AgentSession {
    container_id: ContainerId,
    teardown: JoinHandle<ReapReport>,
}

impl AgentSession {
    pub fn container_id(&self) -> &ContainerId {
        &self.container_id
    }

    /// Resolves once the channel has closed and the container is reaped.
    pub async fn finished(self) -> ReapReport {
        match self.teardown.await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(container_id = %self.container_id, error = %e, "teardown task died");
                ReapReport::aborted(&e.to_string())
            }
        }
    }
}

/// Wires a started container into an [`AgentChannel`]
pub struct Launcher<E> {
    reaper: Reaper<E>,
}

impl<E: ContainerEngine> Launcher<E> {
    pub fn new(reaper: Reaper<E>) -> Self {
        Self { reaper }
    }

    /// Start forwarding stderr, give the channel to `sink`, and reap the
    /// container once the channel closes.
    ///
    /// If the sink refuses the channel the container is reaped before the
    /// error is returned.
    pub async fn launch(
        &self,
        handle: ContainerHandle,
        sink: &dyn ChannelSink,
        log: Arc<dyn BuildLog>,
    ) -> Result<AgentSession, LaunchError> {
        let container_id = handle.id.clone();
        let forwarder = Forwarder::spawn(container_id.clone(), handle.stderr.clone(), log);
        let (signal, closed) = CloseSignal::new();
        let channel = AgentChannel {
            container_id: container_id.clone(),
            reader: handle.stdout.clone(),
            writer: handle.stdin.clone(),
            close: signal.clone(),
        };

        let reaper = self.reaper.clone();
        let teardown = tokio::spawn(
            async move {
                let cause = closed.await.unwrap_or(CloseCause::Dropped);
                match &cause {
                    CloseCause::Failed(detail) => {
                        tracing::warn!(container_id = %handle.id, cause = %cause, error = %detail, "agent channel closed");
                    }
                    _ => tracing::info!(container_id = %handle.id, cause = %cause, "agent channel closed"),
                }
                reaper.reap(handle, Some(forwarder)).await
            }
            .in_current_span(),
        );

        match sink.establish(channel).await {
            Ok(()) => {
                tracing::info!(container_id = %container_id, "agent channel established");
                Ok(AgentSession { container_id, teardown })
            }
            Err(e) => {
                tracing::error!(container_id = %container_id, error = %e, "agent channel setup failed");
                signal.close(CloseCause::Failed(e.to_string()));
                AgentSession { container_id, teardown }.finished().await;
                Err(e.into())
            }
        }
    }
}

/// Entry point: provision and launch agents from [`LaunchRequest`]s
#[derive(Clone)]
pub struct AgentLauncher<E> {
    engine: E,
    forwarder_join: Duration,
}

impl<E: ContainerEngine> AgentLauncher<E> {
    pub fn new(engine: E) -> Self {
        Self { engine, forwarder_join: DEFAULT_FORWARDER_JOIN }
    }

    pub fn with_forwarder_join(mut self, timeout: Duration) -> Self {
        self.forwarder_join = timeout;
        self
    }

    pub async fn launch_agent(
        &self,
        request: LaunchRequest,
        sink: &dyn ChannelSink,
        log: Arc<dyn BuildLog>,
    ) -> Result<AgentSession, LaunchError> {
        let span = tracing::info_span!("agent.launch", image = %request.image);
        async {
            let start = Instant::now();
            let result = self.provision_and_launch(request, sink, log).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(session) => {
                    tracing::info!(container_id = %session.container_id, elapsed_ms, "agent launched")
                }
                Err(e) => tracing::error!(elapsed_ms, error = %e, "agent launch failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn provision_and_launch(
        &self,
        request: LaunchRequest,
        sink: &dyn ChannelSink,
        log: Arc<dyn BuildLog>,
    ) -> Result<AgentSession, LaunchError> {
        let spec = request.container_spec();
        let handle = Provisioner::new(self.engine.clone()).provision(&spec, log.as_ref()).await?;
        let reaper = Reaper::new(self.engine.clone())
            .with_commit(request.commit)
            .with_forwarder_join(self.forwarder_join);
        Launcher::new(reaper).launch(handle, sink, log).await
    }
}

#[cfg(test)]
#[path = "launcher_tests.rs"]
mod tests;
