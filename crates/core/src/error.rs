// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors from parsing or validating a container request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    #[error("invalid image reference {0:?}")]
    InvalidImage(String),
    #[error("invalid volume binding {0:?}: expected HOST:CONTAINER[:ro|:rw] with absolute paths")]
    InvalidBinding(String),
    #[error("agent command is empty")]
    EmptyCommand,
}
