// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Caller-visible build logs.

use parking_lot::Mutex;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Line-oriented log the caller of a launch reads (as opposed to the
/// operator log, which goes through `tracing`).
pub trait BuildLog: Send + Sync {
    fn info(&self, line: &str);

    fn error(&self, line: &str);
}

/// Path of a job's build log: `<log_dir>/job/<job_id>.log`
pub fn job_log_path(log_dir: &Path, job_id: &str) -> PathBuf {
    log_dir.join("job").join(format!("{job_id}.log"))
}

/// Append-only build log for one job.
///
/// Format: `2026-01-30T08:14:09Z [info] message`
///
/// Lines from concurrent writers (the puller and the stderr forwarder)
/// never interleave: each line is one `write_all` under a lock. Failures
/// are logged via tracing but do not propagate.
pub struct JobLogger {
    path: PathBuf,
    job_id: String,
    lock: Mutex<()>,
}

impl JobLogger {
    pub fn new(log_dir: &Path, job_id: &str) -> Self {
        Self { path: job_log_path(log_dir, job_id), job_id: job_id.to_string(), lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, level: &str, message: &str) {
        let _guard = self.lock.lock();
        if let Err(e) = self.write_line(level, message) {
            tracing::warn!(
                job_id = %self.job_id,
                error = %e,
                "failed to write job log"
            );
        }
    }

    fn write_line(&self, level: &str, message: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
        let line = format!("{ts} [{level}] {}\n", message.trim_end_matches(['\r', '\n']));
        file.write_all(line.as_bytes())
    }
}

impl BuildLog for JobLogger {
    fn info(&self, line: &str) {
        self.append("info", line);
    }

    fn error(&self, line: &str) {
        self.append("error", line);
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::BuildLog;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum LogLevel {
        Info,
        Error,
    }

    /// Build log that records lines in memory
    #[derive(Clone, Default)]
    pub struct FakeBuildLog {
        lines: Arc<Mutex<Vec<(LogLevel, String)>>>,
    }

    impl FakeBuildLog {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn entries(&self) -> Vec<(LogLevel, String)> {
            self.lines.lock().clone()
        }

        /// All lines regardless of level
        pub fn lines(&self) -> Vec<String> {
            self.lines.lock().iter().map(|(_, line)| line.clone()).collect()
        }

        pub fn errors(&self) -> Vec<String> {
            self.lines
                .lock()
                .iter()
                .filter(|(level, _)| *level == LogLevel::Error)
                .map(|(_, line)| line.clone())
                .collect()
        }

        /// Number of lines equal to `line`
        pub fn count(&self, line: &str) -> usize {
            self.lines.lock().iter().filter(|(_, l)| l == line).count()
        }
    }

    impl BuildLog for FakeBuildLog {
        fn info(&self, line: &str) {
            self.lines.lock().push((LogLevel::Info, line.to_string()));
        }

        fn error(&self, line: &str) {
            self.lines.lock().push((LogLevel::Error, line.to_string()));
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeBuildLog, LogLevel};

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
