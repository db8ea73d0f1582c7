// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `dockhand launch` specs that stop before a container exists

use crate::prelude::*;

#[test]
fn relative_bind_is_a_usage_error() {
    cli()
        .args(&["launch", "--bind", "cache:/cache", "alpine"])
        .fails_with(2)
        .stderr_has("invalid volume binding");
}

#[test]
fn empty_tag_is_a_usage_error() {
    cli().args(&["launch", "alpine:"]).fails_with(2).stderr_has("invalid image reference");
}

#[test]
fn unreachable_engine_fails_launch() {
    let project = Project::empty();
    let config = project.dead_engine_config();

    cli()
        .args(&["--config", &config.display().to_string(), "launch", "--job", "job-1", "alpine"])
        .fails_with(1)
        .stderr_has("dockhand:");
}
