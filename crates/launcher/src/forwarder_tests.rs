// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use dh_adapters::FakeBuildLog;
use tokio::io::AsyncWriteExt;

fn spawn(log: &FakeBuildLog) -> (Forwarder, tokio::io::DuplexStream, SharedReader) {
    let (tx, rx) = tokio::io::duplex(1024);
    let stderr = SharedReader::new(Box::new(rx));
    let forwarder = Forwarder::spawn(ContainerId::new("c1"), stderr.clone(), Arc::new(log.clone()));
    (forwarder, tx, stderr)
}

#[tokio::test]
async fn forwards_lines_until_eof() {
    let log = FakeBuildLog::new();
    let (forwarder, mut tx, _stderr) = spawn(&log);

    tx.write_all(b"Starting agent\r\nconnected\npartial").await.unwrap();
    drop(tx);
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(forwarder.stop(DEFAULT_FORWARDER_JOIN).await);
    assert_eq!(log.lines(), vec!["Starting agent", "connected", "partial"]);
}

#[tokio::test]
async fn invalid_utf8_is_replaced() {
    let log = FakeBuildLog::new();
    let (forwarder, mut tx, _stderr) = spawn(&log);

    tx.write_all(b"bad \xff byte\n").await.unwrap();
    drop(tx);
    tokio::time::sleep(Duration::from_millis(50)).await;

    forwarder.stop(DEFAULT_FORWARDER_JOIN).await;
    assert_eq!(log.lines(), vec!["bad \u{fffd} byte"]);
}

#[tokio::test]
async fn cancel_during_pending_read_exits_within_window() {
    let log = FakeBuildLog::new();
    // Writer kept alive: the read stays pending
    let (forwarder, _tx, _stderr) = spawn(&log);
    tokio::time::sleep(Duration::from_millis(20)).await;

    let start = std::time::Instant::now();
    assert!(forwarder.stop(Duration::from_millis(500)).await);
    assert!(start.elapsed() < Duration::from_millis(500));
    assert!(log.lines().is_empty());
}

#[tokio::test]
async fn closing_stream_ends_forwarder() {
    let log = FakeBuildLog::new();
    let (forwarder, _tx, stderr) = spawn(&log);
    tokio::time::sleep(Duration::from_millis(20)).await;

    stderr.close();
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert!(forwarder.task.is_finished());
    assert!(forwarder.stop(DEFAULT_FORWARDER_JOIN).await);
}

/// Build log whose `info` blocks until the gate sender is dropped
struct StuckLog {
    gate: parking_lot::Mutex<std::sync::mpsc::Receiver<()>>,
}

impl BuildLog for StuckLog {
    fn info(&self, _line: &str) {
        let _ = self.gate.lock().recv();
    }

    fn error(&self, _line: &str) {}
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stuck_forwarder_is_abandoned_after_join_window() {
    let (release, gate) = std::sync::mpsc::channel::<()>();
    let log = Arc::new(StuckLog { gate: parking_lot::Mutex::new(gate) });
    let (mut tx, rx) = tokio::io::duplex(1024);
    let forwarder = Forwarder::spawn(ContainerId::new("c1"), SharedReader::new(Box::new(rx)), log);

    tx.write_all(b"line that never lands\n").await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let start = std::time::Instant::now();
    assert!(!forwarder.stop(Duration::from_millis(100)).await);
    assert!(start.elapsed() < Duration::from_secs(1));
    drop(release);
}
