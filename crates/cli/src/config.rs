// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! TOML configuration.
//!
//! ```toml
//! log_dir = "/var/log/dockhand"
//! docker_host = "unix:///var/run/docker.sock"
//!
//! [agent]
//! command = ["/usr/lib/agent/jre/bin/java", "-jar", "/usr/lib/agent/agent.jar"]
//! binds = ["/usr/lib/agent:/usr/lib/agent:ro"]
//!
//! [teardown]
//! stop_timeout_secs = 10
//! forwarder_join_ms = 2000
//! ```

use crate::env;
use anyhow::Context;
use dh_core::VolumeBinding;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Root of per-job build logs (`<log_dir>/job/<job_id>.log`)
    pub log_dir: PathBuf,
    /// Operator log file, rolled daily. Unset means stderr.
    pub log_file: Option<PathBuf>,
    /// Docker daemon address. Unset means the local default socket.
    pub docker_host: Option<String>,
    pub agent: AgentConfig,
    pub teardown: TeardownConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_dir: env::state_dir().join("logs"),
            log_file: None,
            docker_host: None,
            agent: AgentConfig::default(),
            teardown: TeardownConfig::default(),
        }
    }
}

/// What runs inside each container
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AgentConfig {
    pub command: Vec<String>,
    pub binds: Vec<VolumeBinding>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            command: vec![
                "/usr/lib/agent/jre/bin/java".to_string(),
                "-jar".to_string(),
                "/usr/lib/agent/agent.jar".to_string(),
            ],
            binds: vec![VolumeBinding::new("/usr/lib/agent", "/usr/lib/agent").read_only()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TeardownConfig {
    /// Grace period the engine gives the agent before killing it
    pub stop_timeout_secs: u64,
    /// Bound on waiting for the stderr forwarder to exit
    pub forwarder_join_ms: u64,
}

impl Default for TeardownConfig {
    fn default() -> Self {
        Self { stop_timeout_secs: 10, forwarder_join_ms: 2000 }
    }
}

impl TeardownConfig {
    pub fn stop_timeout(&self) -> Duration {
        Duration::from_secs(self.stop_timeout_secs)
    }

    pub fn forwarder_join(&self) -> Duration {
        Duration::from_millis(self.forwarder_join_ms)
    }
}

impl Config {
    /// Load from `path`, else `DOCKHAND_CONFIG`, else defaults.
    ///
    /// A path that was asked for must exist. `DOCKHAND_LOG_DIR` overrides
    /// the file's `log_dir`.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = path.map(Path::to_path_buf).or_else(env::config_path);
        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        if let Some(dir) = env::log_dir() {
            config.log_dir = dir;
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
