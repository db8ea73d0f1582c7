// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Ephemeral build-agent containers.
//!
//! [`AgentLauncher::launch_agent`] pulls an image, starts a container running
//! the agent, and hands its stdio to a [`ChannelSink`] as an [`AgentChannel`].
//! When the channel closes the container is torn down by the [`Reaper`].

pub mod channel;
pub mod error;
pub mod forwarder;
pub mod launcher;
pub mod provisioner;
pub mod puller;
pub mod reaper;
pub mod request;
pub mod stream;

pub use channel::{AgentChannel, ChannelError, ChannelSink, CloseCause, CloseSignal};
pub use error::LaunchError;
pub use forwarder::{Forwarder, DEFAULT_FORWARDER_JOIN};
pub use launcher::{AgentLauncher, AgentSession, Launcher};
pub use provisioner::{ContainerHandle, Provisioner};
pub use puller::{pull_image, PullSummary};
pub use reaper::{ReapReport, Reaper};
pub use request::LaunchRequest;
pub use stream::{SharedReader, SharedWriter};
