// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared slots for a container's stdio.
//!
//! A stream is shared between the agent channel, the stderr forwarder and
//! the reaper. Closing takes the stream out of its slot: later reads see
//! EOF, later writes fail with `BrokenPipe`, and a task parked on the
//! stream is woken so it observes the close.

use dh_adapters::{BoxReader, BoxWriter};
use parking_lot::Mutex;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, ReadBuf};

struct Slot<T> {
    stream: Option<T>,
    waker: Option<Waker>,
}

impl<T> Slot<T> {
    fn new(stream: T) -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(Self { stream: Some(stream), waker: None }))
    }

    fn park<R>(&mut self, cx: &Context<'_>, poll: Poll<R>) -> Poll<R> {
        if poll.is_pending() {
            self.waker = Some(cx.waker().clone());
        }
        poll
    }

    fn take(&mut self) -> Option<T> {
        let stream = self.stream.take();
        if let Some(waker) = self.waker.take() {
            waker.wake();
        }
        stream
    }
}

/// Read half of a container stream (stdout or stderr)
#[derive(Clone)]
pub struct SharedReader {
    slot: Arc<Mutex<Slot<BoxReader>>>,
}

impl SharedReader {
    pub fn new(reader: BoxReader) -> Self {
        Self { slot: Slot::new(reader) }
    }

    /// Drop the underlying stream. Returns false if it was already closed.
    pub fn close(&self) -> bool {
        self.slot.lock().take().is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.slot.lock().stream.is_none()
    }
}

impl AsyncRead for SharedReader {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let mut slot = self.slot.lock();
        let poll = match slot.stream.as_mut() {
            Some(reader) => Pin::new(reader).poll_read(cx, buf),
            None => return Poll::Ready(Ok(())),
        };
        slot.park(cx, poll)
    }
}

/// Write half of a container stream (stdin)
#[derive(Clone)]
pub struct SharedWriter {
    slot: Arc<Mutex<Slot<BoxWriter>>>,
}

fn closed() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "container stdin closed")
}

impl SharedWriter {
    pub fn new(writer: BoxWriter) -> Self {
        Self { slot: Slot::new(writer) }
    }

    /// Shut down and drop the underlying stream, signalling EOF to the
    /// container. Closing an already closed writer is a no-op.
    pub async fn close(&self) -> io::Result<()> {
        let writer = self.slot.lock().take();
        match writer {
            Some(mut writer) => writer.shutdown().await,
            None => Ok(()),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.slot.lock().stream.is_none()
    }
}

impl AsyncWrite for SharedWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let mut slot = self.slot.lock();
        let poll = match slot.stream.as_mut() {
            Some(writer) => Pin::new(writer).poll_write(cx, buf),
            None => return Poll::Ready(Err(closed())),
        };
        slot.park(cx, poll)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let mut slot = self.slot.lock();
        let poll = match slot.stream.as_mut() {
            Some(writer) => Pin::new(writer).poll_flush(cx),
            None => return Poll::Ready(Ok(())),
        };
        slot.park(cx, poll)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let mut slot = self.slot.lock();
        let poll = match slot.stream.as_mut() {
            Some(writer) => Pin::new(writer).poll_shutdown(cx),
            None => return Poll::Ready(Ok(())),
        };
        slot.park(cx, poll)
    }
}

#[cfg(test)]
#[path = "stream_tests.rs"]
mod tests;
