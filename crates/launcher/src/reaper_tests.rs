// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use dh_adapters::{EngineCall, FakeBuildLog, FakeEngine, FakeOp};
use dh_core::{ContainerSpec, ImageName, COMMIT_AUTHOR};
use std::sync::Arc;

async fn started(engine: &FakeEngine) -> ContainerHandle {
    let spec = ContainerSpec::agent(
        ImageName::parse("alpine:3.18").unwrap(),
        Vec::new(),
        vec!["agent".to_string()],
    );
    let id = engine.create_container(&spec).await.unwrap().id;
    let streams = engine.attach_container(&id).await.unwrap();
    engine.start_container(&id).await.unwrap();
    ContainerHandle::new(id, streams)
}

fn snapshot() -> CommitSpec {
    CommitSpec::new(&ImageName::parse("snapshots/agent:job-1").unwrap())
}

fn teardown_calls(engine: &FakeEngine) -> Vec<EngineCall> {
    engine
        .calls()
        .into_iter()
        .filter(|c| {
            matches!(
                c,
                EngineCall::StdinClosed(_)
                    | EngineCall::Stop(_)
                    | EngineCall::Commit { .. }
                    | EngineCall::Remove(_)
            )
        })
        .collect()
}

#[tokio::test]
async fn closes_stdin_then_stops_then_removes() {
    let engine = FakeEngine::new();
    let handle = started(&engine).await;
    let id = handle.id().clone();

    let report = Reaper::new(engine.clone()).reap(handle, None).await;

    assert_eq!(
        report,
        ReapReport {
            stop: LifecycleOutcome::Success,
            commit: None,
            remove: LifecycleOutcome::Success,
        }
    );
    assert_eq!(
        teardown_calls(&engine),
        vec![
            EngineCall::StdinClosed(id.clone()),
            EngineCall::Stop(id.clone()),
            EngineCall::Remove(id),
        ]
    );
    assert!(engine.containers().is_empty());
}

#[tokio::test]
async fn commit_runs_between_stop_and_remove() {
    let engine = FakeEngine::new();
    let handle = started(&engine).await;
    let id = handle.id().clone();

    let report = Reaper::new(engine.clone()).with_commit(Some(snapshot())).reap(handle, None).await;

    assert_eq!(report.commit, Some(LifecycleOutcome::Success));
    assert_eq!(
        teardown_calls(&engine),
        vec![
            EngineCall::StdinClosed(id.clone()),
            EngineCall::Stop(id.clone()),
            EngineCall::Commit {
                id: id.clone(),
                repository: "snapshots/agent".to_string(),
                tag: "job-1".to_string(),
                author: COMMIT_AUTHOR.to_string(),
            },
            EngineCall::Remove(id),
        ]
    );
}

#[tokio::test]
async fn closes_all_streams() {
    let engine = FakeEngine::new();
    let handle = started(&engine).await;
    let (stdin, stdout, stderr) = (handle.stdin.clone(), handle.stdout.clone(), handle.stderr.clone());

    Reaper::new(engine).reap(handle, None).await;

    assert!(stdin.is_closed());
    assert!(stdout.is_closed());
    assert!(stderr.is_closed());
}

#[tokio::test]
async fn stops_forwarder() {
    let engine = FakeEngine::new();
    let handle = started(&engine).await;
    let log: Arc<dyn dh_adapters::BuildLog> = Arc::new(FakeBuildLog::new());
    let forwarder = Forwarder::spawn(handle.id().clone(), handle.stderr.clone(), log);

    let report = Reaper::new(engine)
        .with_forwarder_join(Duration::from_millis(200))
        .reap(handle, Some(forwarder))
        .await;

    assert!(report.is_complete());
}

#[tokio::test]
async fn retiring_twice_is_idempotent() {
    let engine = FakeEngine::new();
    let handle = started(&engine).await;
    let reaper = Reaper::new(engine.clone());

    let first = reaper.retire(handle.id()).await;
    let second = reaper.retire(handle.id()).await;

    assert!(first.is_complete());
    assert_eq!(second.stop, LifecycleOutcome::NotFound);
    assert_eq!(second.remove, LifecycleOutcome::NotFound);
    assert!(second.is_complete());
}

#[tokio::test]
async fn stop_not_found_still_removes() {
    let engine = FakeEngine::new();
    let handle = started(&engine).await;
    engine.fail_with(FakeOp::Stop, EngineError::ContainerNotFound(handle.id().to_string()));

    let report = Reaper::new(engine.clone()).reap(handle, None).await;

    assert_eq!(report.stop, LifecycleOutcome::NotFound);
    assert_eq!(report.remove, LifecycleOutcome::Success);
    assert!(report.is_complete());
    assert!(engine.containers().is_empty());
}

#[tokio::test]
async fn failed_steps_do_not_stop_later_steps() {
    let engine = FakeEngine::new();
    let handle = started(&engine).await;
    engine.fail(FakeOp::Stop, "timeout");
    engine.fail(FakeOp::Commit, "disk full");

    let report = Reaper::new(engine.clone()).with_commit(Some(snapshot())).reap(handle, None).await;

    assert_eq!(report.stop, LifecycleOutcome::Failed("timeout".to_string()));
    assert_eq!(report.commit, Some(LifecycleOutcome::Failed("disk full".to_string())));
    assert_eq!(report.remove, LifecycleOutcome::Success);
    assert!(!report.is_complete());
}

#[tokio::test]
async fn no_commit_call_without_commit_spec() {
    let engine = FakeEngine::new();
    let handle = started(&engine).await;

    let report = Reaper::new(engine.clone()).reap(handle, None).await;

    assert_eq!(report.commit, None);
    assert!(!engine.calls().iter().any(|c| matches!(c, EngineCall::Commit { .. })));
}
