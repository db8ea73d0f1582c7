// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Copies a container's stderr into the build log.

use crate::stream::SharedReader;
use dh_adapters::BuildLog;
use dh_core::ContainerId;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Default bound on waiting for the forwarder to exit during teardown
pub const DEFAULT_FORWARDER_JOIN: Duration = Duration::from_secs(2);

/// Background task forwarding stderr lines to the build log and to
/// `tracing` at debug level.
pub struct Forwarder {
    container_id: ContainerId,
    cancel: CancellationToken,
    task: JoinHandle<usize>,
}

impl Forwarder {
    pub fn spawn(container_id: ContainerId, stderr: SharedReader, log: Arc<dyn BuildLog>) -> Self {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(forward_lines(container_id.clone(), stderr, log, cancel.clone()));
        Self { container_id, cancel, task }
    }

    /// Cancel the task and wait up to `join_timeout` for it to exit.
    ///
    /// Returns false if the task had to be aborted.
    pub async fn stop(mut self, join_timeout: Duration) -> bool {
        self.cancel.cancel();
        match tokio::time::timeout(join_timeout, &mut self.task).await {
            Ok(Ok(lines)) => {
                tracing::debug!(container_id = %self.container_id, lines, "stderr forwarder stopped");
                true
            }
            Ok(Err(e)) => {
                tracing::warn!(container_id = %self.container_id, error = %e, "stderr forwarder failed");
                true
            }
            Err(_) => {
                tracing::warn!(
                    container_id = %self.container_id,
                    timeout_ms = join_timeout.as_millis() as u64,
                    "stderr forwarder did not exit, aborting"
                );
                self.task.abort();
                false
            }
        }
    }
}

async fn forward_lines(
    container_id: ContainerId,
    stderr: SharedReader,
    log: Arc<dyn BuildLog>,
    cancel: CancellationToken,
) -> usize {
    let mut reader = BufReader::new(stderr);
    let mut buf = Vec::new();
    let mut lines = 0usize;

    loop {
        buf.clear();
        let read = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            read = reader.read_until(b'\n', &mut buf) => read,
        };
        match read {
            Ok(0) => break,
            Ok(_) => {
                let text = String::from_utf8_lossy(&buf);
                let line = text.trim_end_matches(['\r', '\n']);
                tracing::debug!(container_id = %container_id, line, "agent stderr");
                log.info(line);
                lines += 1;
            }
            Err(e) => {
                tracing::debug!(container_id = %container_id, error = %e, "stderr read failed");
                break;
            }
        }
    }
    lines
}

#[cfg(test)]
#[path = "forwarder_tests.rs"]
mod tests;
