// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Container configuration for running build agents.

use crate::error::SpecError;
use crate::image::ImageName;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Engine-assigned container identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerId(String);

impl ContainerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 characters, the form `docker ps` shows.
    pub fn short(&self) -> &str {
        crate::id::short(&self.0, 12)
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContainerId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Host directory mounted into the container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VolumeBinding {
    pub host_path: PathBuf,
    pub container_path: PathBuf,
    pub read_only: bool,
}

impl VolumeBinding {
    pub fn new(host_path: impl Into<PathBuf>, container_path: impl Into<PathBuf>) -> Self {
        Self { host_path: host_path.into(), container_path: container_path.into(), read_only: false }
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Parse `HOST:CONTAINER[:ro|:rw]`.
    pub fn parse(s: &str) -> Result<Self, SpecError> {
        let invalid = || SpecError::InvalidBinding(s.to_string());
        let parts: Vec<&str> = s.split(':').collect();
        let (host, container, read_only) = match parts.as_slice() {
            [host, container] => (*host, *container, false),
            [host, container, "ro"] => (*host, *container, true),
            [host, container, "rw"] => (*host, *container, false),
            _ => return Err(invalid()),
        };
        if !host.starts_with('/') || !container.starts_with('/') {
            return Err(invalid());
        }
        let binding = Self::new(host, container);
        Ok(if read_only { binding.read_only() } else { binding })
    }

    /// Engine bind string, e.g. `/opt/agent:/opt/agent:ro`.
    pub fn to_bind(&self) -> String {
        let mut bind = format!("{}:{}", self.host_path.display(), self.container_path.display());
        if self.read_only {
            bind.push_str(":ro");
        }
        bind
    }
}

impl FromStr for VolumeBinding {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for VolumeBinding {
    type Error = SpecError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<VolumeBinding> for String {
    fn from(binding: VolumeBinding) -> Self {
        binding.to_bind()
    }
}

/// Everything the engine needs to create one agent container.
///
/// Built once per provisioning request and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    pub image: ImageName,
    pub binds: Vec<VolumeBinding>,
    pub command: Vec<String>,
    pub attach_stdin: bool,
    pub attach_stdout: bool,
    pub attach_stderr: bool,
    pub open_stdin: bool,
    /// Close stdin after the first attached client detaches
    pub stdin_once: bool,
    pub tty: bool,
}

impl ContainerSpec {
    /// Spec for an agent that speaks its protocol over stdio.
    ///
    /// The TTY stays off so stdout and stderr arrive as separate,
    /// unframed byte streams.
    pub fn agent(image: ImageName, binds: Vec<VolumeBinding>, command: Vec<String>) -> Self {
        Self {
            image,
            binds,
            command,
            attach_stdin: true,
            attach_stdout: true,
            attach_stderr: true,
            open_stdin: true,
            stdin_once: true,
            tty: false,
        }
    }

    pub fn validate(&self) -> Result<(), SpecError> {
        match self.command.first() {
            Some(program) if !program.trim().is_empty() => Ok(()),
            _ => Err(SpecError::EmptyCommand),
        }
    }

    /// Container-side mount points, used for the engine's `Volumes` map.
    pub fn volume_paths(&self) -> impl Iterator<Item = String> + '_ {
        self.binds.iter().map(|b| b.container_path.display().to_string())
    }
}

#[cfg(test)]
#[path = "container_tests.rs"]
mod tests;
