// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

/// Result of one teardown step (stop, commit, remove).
///
/// `Success` and `NotFound` both complete the step: a container the engine
/// no longer knows about has nothing left to release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleOutcome {
    Success,
    NotFound,
    Failed(String),
}

crate::simple_display! {
    LifecycleOutcome {
        Success => "success",
        NotFound => "not found",
        Failed(..) => "failed",
    }
}

impl LifecycleOutcome {
    pub fn is_complete(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Failed(detail) => Some(detail),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "outcome_tests.rs"]
mod tests;
