// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Adapters for external I/O: the container engine and build log sinks

pub mod engine;
pub mod log;

pub use engine::{
    BoxReader, BoxWriter, ContainerEngine, ContainerStreams, CreatedContainer, DockerEngine,
    EngineError, ProgressStream,
};
pub use log::{job_log_path, BuildLog, JobLogger};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use engine::{EngineCall, FakeContainerIo, FakeEngine, FakeOp};
#[cfg(any(test, feature = "test-support"))]
pub use log::{FakeBuildLog, LogLevel};
