// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::channel::ChannelError;
use dh_adapters::EngineError;
use thiserror::Error;

/// Errors from provisioning or launching an agent
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Pull, attach or start failed
    #[error(transparent)]
    Engine(#[from] EngineError),
    /// The container request was invalid or the engine refused to create the container
    #[error("container create failed: {0}")]
    CreateFailed(String),
    /// The consumer could not take the channel; the container was reaped
    #[error(transparent)]
    Channel(#[from] ChannelError),
}
