// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The byte channel handed to the consumer of a launched agent.

use crate::stream::{SharedReader, SharedWriter};
use async_trait::async_trait;
use dh_core::ContainerId;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::oneshot;

/// Why an agent channel closed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseCause {
    /// The consumer finished normally
    Graceful,
    /// The consumer hit an error
    Failed(String),
    /// Every handle to the channel was dropped without closing it
    Dropped,
}

dh_core::simple_display! {
    CloseCause {
        Graceful => "graceful",
        Failed(..) => "failed",
        Dropped => "dropped",
    }
}

struct SignalInner {
    done: AtomicBool,
    tx: Mutex<Option<oneshot::Sender<CloseCause>>>,
}

impl SignalInner {
    fn fire(&self, cause: CloseCause) -> bool {
        if self.done.swap(true, Ordering::AcqRel) {
            return false;
        }
        if let Some(tx) = self.tx.lock().take() {
            // Receiver gone means teardown already ran
            let _ = tx.send(cause);
        }
        true
    }
}

impl Drop for SignalInner {
    fn drop(&mut self) {
        self.fire(CloseCause::Dropped);
    }
}

/// One-shot close notification for an agent channel.
///
/// `close` fires at most once across all clones; later calls return false.
/// Dropping the last clone without closing fires `CloseCause::Dropped`.
#[derive(Clone)]
pub struct CloseSignal {
    inner: Arc<SignalInner>,
}

impl CloseSignal {
    pub(crate) fn new() -> (Self, oneshot::Receiver<CloseCause>) {
        let (tx, rx) = oneshot::channel();
        let inner = SignalInner { done: AtomicBool::new(false), tx: Mutex::new(Some(tx)) };
        (Self { inner: Arc::new(inner) }, rx)
    }

    /// Request teardown. Returns true if this call fired the signal.
    pub fn close(&self, cause: CloseCause) -> bool {
        self.inner.fire(cause)
    }

    pub fn is_closed(&self) -> bool {
        self.inner.done.load(Ordering::Acquire)
    }
}

/// Bidirectional byte channel to a running agent.
///
/// `reader` is the container's stdout, `writer` its stdin. The container's
/// stderr goes to the build log instead.
pub struct AgentChannel {
    pub container_id: ContainerId,
    pub reader: SharedReader,
    pub writer: SharedWriter,
    pub close: CloseSignal,
}

/// Errors from establishing an agent channel
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("channel setup failed: {0}")]
    Establish(String),
    #[error("channel io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Consumer of agent channels.
///
/// `establish` takes ownership of the channel and should return once the
/// consumer is wired up, not when the session ends. The consumer must call
/// `channel.close` (or drop every handle) when it is done.
#[async_trait]
pub trait ChannelSink: Send + Sync {
    async fn establish(&self, channel: AgentChannel) -> Result<(), ChannelError>;
}

#[cfg(test)]
#[path = "channel_tests.rs"]
mod tests;
