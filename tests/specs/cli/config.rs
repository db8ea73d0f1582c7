// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Config file loading specs

use crate::prelude::*;

#[test]
fn missing_config_file_fails() {
    let project = Project::empty();
    let missing = project.path().join("absent.toml");

    cli()
        .args(&["--config", &missing.display().to_string(), "reap", "abc123"])
        .fails_with(1)
        .stderr_has("failed to read config");
}

#[test]
fn config_from_env_is_honored() {
    let project = Project::empty();
    let missing = project.path().join("absent.toml");

    cli()
        .env("DOCKHAND_CONFIG", &missing)
        .args(&["reap", "abc123"])
        .fails_with(1)
        .stderr_has("failed to read config");
}

#[test]
fn unknown_config_keys_are_rejected() {
    let project = Project::empty();
    let config = project.config("log_dir = \"/tmp\"\ncolour = true\n");

    cli()
        .args(&["--config", &config.display().to_string(), "reap", "abc123"])
        .fails_with(1)
        .stderr_has("invalid config");
}

#[test]
fn invalid_bind_in_config_is_rejected() {
    let project = Project::empty();
    let config = project.config("[agent]\nbinds = [\"relative:/mnt\"]\n");

    cli()
        .args(&["--config", &config.display().to_string(), "reap", "abc123"])
        .fails_with(1)
        .stderr_has("invalid config");
}
