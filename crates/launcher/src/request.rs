// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use dh_core::{CommitSpec, ContainerSpec, ImageName, VolumeBinding};

/// One request for an agent container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    pub image: ImageName,
    pub binds: Vec<VolumeBinding>,
    pub command: Vec<String>,
    /// Commit the container to this image during teardown
    pub commit: Option<CommitSpec>,
}

impl LaunchRequest {
    pub fn new(image: ImageName) -> Self {
        Self { image, binds: Vec::new(), command: Vec::new(), commit: None }
    }

    dh_core::setters! {
        set {
            binds: Vec<VolumeBinding>,
            command: Vec<String>,
        }
        option {
            commit: CommitSpec,
        }
    }

    pub fn container_spec(&self) -> ContainerSpec {
        ContainerSpec::agent(self.image.clone(), self.binds.clone(), self.command.clone())
    }
}
