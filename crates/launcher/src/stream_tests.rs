// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

#[tokio::test]
async fn reader_passes_data_through() {
    let (mut tx, rx) = tokio::io::duplex(64);
    let mut reader = SharedReader::new(Box::new(rx));

    tx.write_all(b"hello").await.unwrap();
    drop(tx);

    let mut out = String::new();
    reader.read_to_string(&mut out).await.unwrap();
    assert_eq!(out, "hello");
}

#[tokio::test]
async fn closed_reader_reads_eof() {
    let (_tx, rx) = tokio::io::duplex(64);
    let mut reader = SharedReader::new(Box::new(rx));

    assert!(reader.close());
    assert!(!reader.close());
    assert!(reader.is_closed());

    let mut buf = [0u8; 8];
    assert_eq!(reader.read(&mut buf).await.unwrap(), 0);
}

#[tokio::test]
async fn close_wakes_pending_reader() {
    let (_tx, rx) = tokio::io::duplex(64);
    let reader = SharedReader::new(Box::new(rx));
    let mut pending = reader.clone();

    let task = tokio::spawn(async move {
        let mut buf = [0u8; 8];
        pending.read(&mut buf).await
    });
    tokio::time::sleep(Duration::from_millis(20)).await;
    reader.close();

    let read = tokio::time::timeout(Duration::from_secs(1), task).await.unwrap().unwrap();
    assert_eq!(read.unwrap(), 0);
}

#[tokio::test]
async fn writer_close_sends_eof_then_breaks_pipe() {
    let (tx, mut rx) = tokio::io::duplex(64);
    let writer = SharedWriter::new(Box::new(tx));
    let mut channel_side = writer.clone();

    channel_side.write_all(b"ping").await.unwrap();
    writer.close().await.unwrap();
    assert!(writer.is_closed());

    let mut received = String::new();
    rx.read_to_string(&mut received).await.unwrap();
    assert_eq!(received, "ping");

    let err = channel_side.write_all(b"late").await.unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
}

#[tokio::test]
async fn writer_close_twice_is_ok() {
    let (tx, _rx) = tokio::io::duplex(64);
    let writer = SharedWriter::new(Box::new(tx));

    writer.close().await.unwrap();
    writer.close().await.unwrap();
}
