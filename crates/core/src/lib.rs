// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! dh-core: data model for provisioning containerized build agents

pub mod macros;

pub mod container;
pub mod error;
pub mod id;
pub mod image;
pub mod outcome;
pub mod progress;

pub use container::{ContainerId, ContainerSpec, VolumeBinding};
pub use error::SpecError;
pub use id::{short, JobId};
pub use image::{CommitSpec, ImageName, COMMIT_AUTHOR};
pub use outcome::LifecycleOutcome;
pub use progress::{ProgressCode, ProgressEvent};
