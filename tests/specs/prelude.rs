// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Helpers for running the `dockhand` binary in specs.

use std::path::{Path, PathBuf};

use assert_cmd::Command;

/// Docker socket that never exists, so engine calls fail fast
pub const DEAD_SOCKET: &str = "unix:///nonexistent/dockhand-specs/docker.sock";

/// Command builder for the `dockhand` binary with a scrubbed environment
pub struct Cli {
    cmd: Command,
}

pub fn cli() -> Cli {
    let mut cmd = Command::cargo_bin("dockhand").expect("dockhand binary should be built");
    cmd.env_remove("DOCKHAND_CONFIG")
        .env_remove("DOCKHAND_LOG_DIR")
        .env_remove("RUST_LOG")
        .env("DOCKHAND_LOG", "off")
        .write_stdin("");
    Cli { cmd }
}

impl Cli {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<std::ffi::OsStr>) -> Self {
        self.cmd.env(key, value);
        self
    }

    pub fn passes(mut self) -> Output {
        Output(self.cmd.assert().success().get_output().clone())
    }

    /// Expect a failure with exactly this exit code
    pub fn fails_with(mut self, code: i32) -> Output {
        Output(self.cmd.assert().code(code).get_output().clone())
    }
}

pub struct Output(std::process::Output);

impl Output {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.0.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.0.stderr).into_owned()
    }

    pub fn stdout_has(self, needle: &str) -> Self {
        let stdout = self.stdout();
        assert!(stdout.contains(needle), "stdout missing {needle:?}:\n{stdout}");
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        let stderr = self.stderr();
        assert!(stderr.contains(needle), "stderr missing {needle:?}:\n{stderr}");
        self
    }
}

/// Temporary directory holding a config file
pub struct Project {
    dir: tempfile::TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self { dir: tempfile::tempdir().expect("tempdir") }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `dockhand.toml` and return its path
    pub fn config(&self, content: &str) -> PathBuf {
        let path = self.dir.path().join("dockhand.toml");
        std::fs::write(&path, content).expect("write config");
        path
    }

    /// Config whose engine is unreachable and whose logs stay in the project
    pub fn dead_engine_config(&self) -> PathBuf {
        self.config(&format!(
            "log_dir = {:?}\ndocker_host = {:?}\n\n[teardown]\nstop_timeout_secs = 1\n",
            self.path().join("logs").display().to_string(),
            DEAD_SOCKET,
        ))
    }
}
