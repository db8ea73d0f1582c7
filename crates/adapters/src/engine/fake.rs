// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory container engine for tests
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{ContainerEngine, ContainerStreams, CreatedContainer, EngineError, ProgressStream};
use async_trait::async_trait;
use dh_core::{CommitSpec, ContainerId, ContainerSpec, ImageName, ProgressEvent};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::io::{AsyncWrite, DuplexStream};

const PIPE_CAPACITY: usize = 64 * 1024;

/// Recorded engine call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    Pull(String),
    Create { image: String, binds: Vec<String>, command: Vec<String> },
    Attach(ContainerId),
    Start(ContainerId),
    /// The launcher shut down the container's stdin
    StdinClosed(ContainerId),
    Stop(ContainerId),
    Commit { id: ContainerId, repository: String, tag: String, author: String },
    Remove(ContainerId),
}

/// Engine operation that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FakeOp {
    Create,
    Attach,
    Start,
    Stop,
    Commit,
    Remove,
}

/// Test-side ends of a container's stdio.
///
/// Read `stdin` to see what the launcher sent; write `stdout`/`stderr` to
/// play the agent. Dropping a writer gives the launcher EOF.
pub struct FakeContainerIo {
    pub stdin: DuplexStream,
    pub stdout: DuplexStream,
    pub stderr: DuplexStream,
}

struct FakeContainer {
    io: Option<FakeContainerIo>,
    running: bool,
}

struct FakeEngineState {
    calls: Vec<EngineCall>,
    pull_events: Vec<ProgressEvent>,
    pull_error: Option<String>,
    warnings: Vec<String>,
    failures: HashMap<FakeOp, EngineError>,
    containers: HashMap<ContainerId, FakeContainer>,
    next_id: u64,
}

/// Fake container engine for testing
#[derive(Clone)]
pub struct FakeEngine {
    inner: Arc<Mutex<FakeEngineState>>,
}

impl Default for FakeEngine {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeEngineState {
                calls: Vec::new(),
                pull_events: Vec::new(),
                pull_error: None,
                warnings: Vec::new(),
                failures: HashMap::new(),
                containers: HashMap::new(),
                next_id: 0,
            })),
        }
    }
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events every pull yields, in order
    pub fn set_pull_events(&self, events: Vec<ProgressEvent>) {
        self.inner.lock().pull_events = events;
    }

    /// Make pulls fail after yielding their events
    pub fn set_pull_error(&self, message: &str) {
        self.inner.lock().pull_error = Some(message.to_string());
    }

    /// Warnings returned by every create
    pub fn set_warnings(&self, warnings: Vec<String>) {
        self.inner.lock().warnings = warnings;
    }

    /// Make `op` fail with an `Engine` error
    pub fn fail(&self, op: FakeOp, message: &str) {
        self.fail_with(op, EngineError::Engine(message.to_string()));
    }

    /// Make `op` fail with `err`, even if the container exists
    pub fn fail_with(&self, op: FakeOp, err: EngineError) {
        self.inner.lock().failures.insert(op, err);
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<EngineCall> {
        self.inner.lock().calls.clone()
    }

    /// Containers that exist (created and not removed)
    pub fn containers(&self) -> Vec<ContainerId> {
        let mut ids: Vec<_> = self.inner.lock().containers.keys().cloned().collect();
        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        ids
    }

    pub fn is_running(&self, id: &ContainerId) -> bool {
        self.inner.lock().containers.get(id).is_some_and(|c| c.running)
    }

    /// Take the test-side stdio of an attached container
    pub fn take_io(&self, id: &ContainerId) -> Option<FakeContainerIo> {
        self.inner.lock().containers.get_mut(id).and_then(|c| c.io.take())
    }

    /// Delete a container behind the launcher's back
    pub fn forget(&self, id: &ContainerId) {
        self.inner.lock().containers.remove(id);
    }

    fn check(state: &FakeEngineState, op: FakeOp) -> Result<(), EngineError> {
        match state.failures.get(&op) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn existing<'s>(
        state: &'s mut FakeEngineState,
        id: &ContainerId,
    ) -> Result<&'s mut FakeContainer, EngineError> {
        state
            .containers
            .get_mut(id)
            .ok_or_else(|| EngineError::ContainerNotFound(id.to_string()))
    }
}

/// Container stdin that records its shutdown
struct RecordingStdin {
    inner: DuplexStream,
    id: ContainerId,
    state: Arc<Mutex<FakeEngineState>>,
    closed: bool,
}

impl AsyncWrite for RecordingStdin {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.inner).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let result = Pin::new(&mut self.inner).poll_shutdown(cx);
        if result.is_ready() && !self.closed {
            self.closed = true;
            let id = self.id.clone();
            self.state.lock().calls.push(EngineCall::StdinClosed(id));
        }
        result
    }
}

#[async_trait]
impl ContainerEngine for FakeEngine {
    fn pull_image<'a>(&'a self, image: &ImageName) -> ProgressStream<'a> {
        let mut state = self.inner.lock();
        state.calls.push(EngineCall::Pull(image.to_string()));
        let mut items: Vec<Result<ProgressEvent, EngineError>> =
            state.pull_events.iter().cloned().map(Ok).collect();
        if let Some(message) = &state.pull_error {
            items.push(Err(EngineError::Engine(message.clone())));
        }
        Box::pin(futures_util::stream::iter(items))
    }

    async fn create_container(
        &self,
        spec: &ContainerSpec,
    ) -> Result<CreatedContainer, EngineError> {
        let mut state = self.inner.lock();
        state.calls.push(EngineCall::Create {
            image: spec.image.to_string(),
            binds: spec.binds.iter().map(|b| b.to_bind()).collect(),
            command: spec.command.clone(),
        });
        Self::check(&state, FakeOp::Create)?;

        state.next_id += 1;
        let id = ContainerId::new(format!("fake-{:012}", state.next_id));
        state.containers.insert(id.clone(), FakeContainer { io: None, running: false });
        Ok(CreatedContainer { id, warnings: state.warnings.clone() })
    }

    async fn attach_container(&self, id: &ContainerId) -> Result<ContainerStreams, EngineError> {
        let mut state = self.inner.lock();
        state.calls.push(EngineCall::Attach(id.clone()));
        Self::check(&state, FakeOp::Attach)?;
        let container = Self::existing(&mut state, id)?;

        let (stdin_tx, stdin_rx) = tokio::io::duplex(PIPE_CAPACITY);
        let (stdout_tx, stdout_rx) = tokio::io::duplex(PIPE_CAPACITY);
        let (stderr_tx, stderr_rx) = tokio::io::duplex(PIPE_CAPACITY);
        container.io = Some(FakeContainerIo { stdin: stdin_rx, stdout: stdout_tx, stderr: stderr_tx });

        let stdin = RecordingStdin {
            inner: stdin_tx,
            id: id.clone(),
            state: Arc::clone(&self.inner),
            closed: false,
        };
        Ok(ContainerStreams {
            stdin: Box::new(stdin),
            stdout: Box::new(stdout_rx),
            stderr: Box::new(stderr_rx),
        })
    }

    async fn start_container(&self, id: &ContainerId) -> Result<(), EngineError> {
        let mut state = self.inner.lock();
        state.calls.push(EngineCall::Start(id.clone()));
        Self::check(&state, FakeOp::Start)?;
        Self::existing(&mut state, id)?.running = true;
        Ok(())
    }

    async fn stop_container(&self, id: &ContainerId) -> Result<(), EngineError> {
        let mut state = self.inner.lock();
        state.calls.push(EngineCall::Stop(id.clone()));
        Self::check(&state, FakeOp::Stop)?;
        let container = Self::existing(&mut state, id)?;
        container.running = false;
        // The agent process is gone; its streams end
        container.io = None;
        Ok(())
    }

    async fn commit_container(
        &self,
        id: &ContainerId,
        commit: &CommitSpec,
    ) -> Result<(), EngineError> {
        let mut state = self.inner.lock();
        state.calls.push(EngineCall::Commit {
            id: id.clone(),
            repository: commit.repository.clone(),
            tag: commit.tag.clone(),
            author: commit.author.clone(),
        });
        Self::check(&state, FakeOp::Commit)?;
        Self::existing(&mut state, id)?;
        Ok(())
    }

    async fn remove_container(&self, id: &ContainerId) -> Result<(), EngineError> {
        let mut state = self.inner.lock();
        state.calls.push(EngineCall::Remove(id.clone()));
        Self::check(&state, FakeOp::Remove)?;
        state
            .containers
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| EngineError::ContainerNotFound(id.to_string()))
    }
}
