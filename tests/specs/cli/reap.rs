// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `dockhand reap` specs

use crate::prelude::*;

#[test]
fn reap_requires_a_container() {
    cli().args(&["reap"]).fails_with(2).stderr_has("Usage:");
}

#[test]
fn unreachable_engine_fails_reap() {
    let project = Project::empty();
    let config = project.dead_engine_config();

    cli().args(&["--config", &config.display().to_string(), "reap", "abc123"]).fails_with(1);
}
