// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    success   = { LifecycleOutcome::Success, true, "success" },
    not_found = { LifecycleOutcome::NotFound, true, "not found" },
    failed    = { LifecycleOutcome::Failed("daemon gone".to_string()), false, "failed" },
)]
fn completion_and_display(outcome: LifecycleOutcome, complete: bool, shown: &str) {
    assert_eq!(outcome.is_complete(), complete);
    assert_eq!(outcome.to_string(), shown);
}

#[test]
fn only_failures_carry_detail() {
    assert_eq!(LifecycleOutcome::Failed("disk full".to_string()).detail(), Some("disk full"));
    assert_eq!(LifecycleOutcome::NotFound.detail(), None);
}
