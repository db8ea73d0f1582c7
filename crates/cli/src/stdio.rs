// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bridges an agent channel to this process's stdin/stdout.

use crate::interrupt::Interrupt;
use async_trait::async_trait;
use dh_launcher::{AgentChannel, ChannelError, ChannelSink, CloseCause};
use std::future::Future;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

/// Channel sink for `dockhand launch`: our stdin feeds the agent, the
/// agent's stdout is ours. The interrupt latch closes the channel, even
/// when it fired before the channel existed.
pub struct StdioSink {
    interrupt: Interrupt,
}

impl StdioSink {
    pub fn new(interrupt: Interrupt) -> Self {
        Self { interrupt }
    }
}

#[async_trait]
impl ChannelSink for StdioSink {
    async fn establish(&self, channel: AgentChannel) -> Result<(), ChannelError> {
        bridge(channel, tokio::io::stdin(), tokio::io::stdout(), self.interrupt.fired());
        Ok(())
    }
}

/// Copy `input` into the agent and the agent's output into `output`.
///
/// The channel closes when the agent's output ends (graceful), when writing
/// `output` fails, or when `interrupt` resolves. End of `input` only closes
/// the agent's stdin.
pub(crate) fn bridge<I, O, S>(channel: AgentChannel, mut input: I, mut output: O, interrupt: S)
where
    I: AsyncRead + Send + Unpin + 'static,
    O: AsyncWrite + Send + Unpin + 'static,
    S: Future<Output = ()> + Send + 'static,
{
    let AgentChannel { container_id, mut reader, mut writer, close } = channel;

    let input_id = container_id.clone();
    tokio::spawn(async move {
        match tokio::io::copy(&mut input, &mut writer).await {
            Ok(bytes) => {
                tracing::debug!(container_id = %input_id, bytes, "input ended, closing agent stdin");
                if let Err(e) = writer.shutdown().await {
                    tracing::debug!(container_id = %input_id, error = %e, "agent stdin shutdown failed");
                }
            }
            Err(e) => {
                tracing::debug!(container_id = %input_id, error = %e, "copy to agent stopped");
            }
        }
    });

    tokio::spawn(async move {
        let cause = tokio::select! {
            copied = tokio::io::copy(&mut reader, &mut output) => match copied {
                Ok(bytes) => {
                    tracing::debug!(container_id = %container_id, bytes, "agent output ended");
                    CloseCause::Graceful
                }
                Err(e) => CloseCause::Failed(e.to_string()),
            },
            _ = interrupt => CloseCause::Failed("interrupted".to_string()),
        };
        if let Err(e) = output.flush().await {
            tracing::debug!(container_id = %container_id, error = %e, "output flush failed");
        }
        close.close(cause);
    });
}

#[cfg(test)]
#[path = "stdio_tests.rs"]
mod tests;
