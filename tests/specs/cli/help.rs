// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI help output specs

use crate::prelude::*;

#[test]
fn help_lists_commands() {
    cli().args(&["--help"]).passes().stdout_has("Usage:").stdout_has("launch").stdout_has("reap");
}

#[test]
fn launch_help_shows_options() {
    cli()
        .args(&["launch", "--help"])
        .passes()
        .stdout_has("--bind")
        .stdout_has("--commit")
        .stdout_has("--job");
}

#[test]
fn version_prints_package_version() {
    cli().args(&["--version"]).passes().stdout_has(env!("CARGO_PKG_VERSION"));
}

#[test]
fn no_command_is_a_usage_error() {
    cli().fails_with(2).stderr_has("Usage:");
}
