// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Image pull progress events.

/// Whether a progress tick reports normal progress or an engine-side error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressCode {
    Ok,
    Error,
}

crate::simple_display! {
    ProgressCode {
        Ok => "ok",
        Error => "error",
    }
}

/// One tick of a pull operation. Transient; never retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub code: ProgressCode,
    pub current: u64,
    pub total: u64,
    pub status: String,
    pub detail: String,
}

impl ProgressEvent {
    pub fn ok(status: impl Into<String>) -> Self {
        Self {
            code: ProgressCode::Ok,
            current: 0,
            total: 0,
            status: status.into(),
            detail: String::new(),
        }
    }

    pub fn error(status: impl Into<String>) -> Self {
        Self { code: ProgressCode::Error, ..Self::ok(status) }
    }

    pub fn with_progress(mut self, current: u64, total: u64) -> Self {
        self.current = current;
        self.total = total;
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = detail.into();
        self
    }

    /// False for `Ok` ticks without a total (layers already present,
    /// "Waiting", digest lines); those would only spam the build log.
    pub fn is_reportable(&self) -> bool {
        !(self.code == ProgressCode::Ok && self.total == 0)
    }

    /// `status`, or `status: detail` when there is a detail.
    pub fn message(&self) -> String {
        if self.detail.is_empty() {
            self.status.clone()
        } else {
            format!("{}: {}", self.status, self.detail)
        }
    }
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;
