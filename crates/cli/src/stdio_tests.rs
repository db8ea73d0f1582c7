// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use dh_adapters::{EngineCall, FakeBuildLog, FakeEngine};
use dh_core::ImageName;
use dh_launcher::{AgentLauncher, AgentSession, LaunchRequest};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, DuplexStream};
use tokio::sync::{watch, Mutex};

/// Bridges the channel to in-memory pipes instead of the real stdio
struct PipeSink {
    ends: Mutex<Option<(DuplexStream, DuplexStream)>>,
    interrupt: Interrupt,
}

#[async_trait]
impl ChannelSink for PipeSink {
    async fn establish(&self, channel: AgentChannel) -> Result<(), ChannelError> {
        let (input, output) = self
            .ends
            .lock()
            .await
            .take()
            .ok_or_else(|| ChannelError::Establish("already used".to_string()))?;
        bridge(channel, input, output, self.interrupt.fired());
        Ok(())
    }
}

struct Harness {
    engine: FakeEngine,
    session: AgentSession,
    /// Our side of the process stdin
    input: DuplexStream,
    /// Our side of the process stdout
    output: DuplexStream,
    interrupt: watch::Sender<bool>,
}

async fn launch() -> Harness {
    let (interrupt, latch) = Interrupt::manual();
    launch_with(interrupt, latch).await
}

async fn launch_with(interrupt: watch::Sender<bool>, latch: Interrupt) -> Harness {
    let engine = FakeEngine::new();
    let (input, input_peer) = tokio::io::duplex(1024);
    let (output_peer, output) = tokio::io::duplex(1024);
    let sink = PipeSink { ends: Mutex::new(Some((input_peer, output_peer))), interrupt: latch };

    let request = LaunchRequest::new(ImageName::parse("alpine:3.18").unwrap())
        .command(vec!["agent".to_string()]);
    let session = AgentLauncher::new(engine.clone())
        .with_forwarder_join(Duration::from_millis(200))
        .launch_agent(request, &sink, Arc::new(FakeBuildLog::new()))
        .await
        .unwrap();
    Harness { engine, session, input, output, interrupt }
}

#[tokio::test]
async fn agent_output_end_closes_gracefully() {
    let mut h = launch().await;
    let mut io = h.engine.take_io(h.session.container_id()).unwrap();

    io.stdout.write_all(b"agent says hi").await.unwrap();
    drop(io.stdout);

    let mut out = String::new();
    h.output.read_to_string(&mut out).await.unwrap();
    assert_eq!(out, "agent says hi");

    let report = tokio::time::timeout(Duration::from_secs(2), h.session.finished()).await.unwrap();
    assert!(report.is_complete());
    assert!(h.engine.containers().is_empty());
}

#[tokio::test]
async fn input_reaches_agent_and_eof_closes_its_stdin() {
    let mut h = launch().await;
    let id = h.session.container_id().clone();
    let mut io = h.engine.take_io(&id).unwrap();

    h.input.write_all(b"job payload").await.unwrap();
    drop(h.input);

    let mut received = String::new();
    io.stdin.read_to_string(&mut received).await.unwrap();
    assert_eq!(received, "job payload");
    assert!(h.engine.calls().contains(&EngineCall::StdinClosed(id.clone())));
    // Agent still running: input EOF alone does not tear down
    assert!(h.engine.is_running(&id));

    h.interrupt.send(true).unwrap();
    h.session.finished().await;
    assert!(h.engine.containers().is_empty());
}

#[tokio::test]
async fn interrupt_tears_down() {
    let h = launch().await;
    let id = h.session.container_id().clone();

    h.interrupt.send(true).unwrap();
    let report = tokio::time::timeout(Duration::from_secs(2), h.session.finished()).await.unwrap();

    assert!(report.is_complete());
    assert!(h.engine.calls().contains(&EngineCall::Remove(id)));
}

#[tokio::test]
async fn interrupt_during_provisioning_tears_down_once_established() {
    let (interrupt, latch) = Interrupt::manual();
    interrupt.send(true).unwrap();

    let h = launch_with(interrupt, latch).await;
    let id = h.session.container_id().clone();
    let report = tokio::time::timeout(Duration::from_secs(2), h.session.finished()).await.unwrap();

    assert!(report.is_complete());
    assert!(h.engine.calls().contains(&EngineCall::Remove(id)));
    assert!(h.engine.containers().is_empty());
}
