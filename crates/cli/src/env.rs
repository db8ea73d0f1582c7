// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the CLI.

use std::path::PathBuf;

/// Config file path override (`DOCKHAND_CONFIG`)
pub fn config_path() -> Option<PathBuf> {
    std::env::var("DOCKHAND_CONFIG").ok().filter(|s| !s.is_empty()).map(PathBuf::from)
}

/// Build log directory override (`DOCKHAND_LOG_DIR`)
pub fn log_dir() -> Option<PathBuf> {
    std::env::var("DOCKHAND_LOG_DIR").ok().filter(|s| !s.is_empty()).map(PathBuf::from)
}

/// Operator log filter: DOCKHAND_LOG > RUST_LOG > `info`
pub fn log_filter() -> String {
    std::env::var("DOCKHAND_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "info".to_string())
}

/// Resolve state directory: XDG_STATE_HOME/dockhand > ~/.local/state/dockhand
pub fn state_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return PathBuf::from(xdg).join("dockhand");
    }
    dirs::home_dir()
        .map(|home| home.join(".local/state/dockhand"))
        .unwrap_or_else(|| std::env::temp_dir().join("dockhand"))
}
