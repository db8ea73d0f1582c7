// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Image pulls with build-log progress reporting.

use dh_adapters::{BuildLog, ContainerEngine, EngineError};
use dh_core::{ImageName, ProgressCode};
use futures_util::StreamExt;
use std::time::Instant;

/// What a finished pull reported to the build log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PullSummary {
    /// Number of progress events written to the build log
    pub reported: usize,
}

/// Pull `image`, writing reportable progress to `log`.
///
/// Ticks without a total are skipped. The `### Pulling image` banner is
/// written before the first reported event and `### Done pulling image`
/// after a successful pull that reported anything, so a fully cached image
/// leaves the build log untouched.
///
/// The engine may report a failed pull as error events on an otherwise
/// healthy stream. Each one is logged; the pull then fails with the last.
pub async fn pull_image<E: ContainerEngine>(
    engine: &E,
    image: &ImageName,
    log: &dyn BuildLog,
) -> Result<PullSummary, EngineError> {
    tracing::info!(image = %image, "pulling image");
    let start = Instant::now();
    let mut reported = 0usize;
    let mut last_error = None;

    let mut events = engine.pull_image(image);
    while let Some(event) = events.next().await {
        let event = match event {
            Ok(event) => event,
            Err(e) => {
                tracing::error!(image = %image, reported, error = %e, "image pull failed");
                return Err(e);
            }
        };
        if !event.is_reportable() {
            continue;
        }
        if reported == 0 {
            log.info(&format!("### Pulling image {image}"));
        }
        reported += 1;

        match event.code {
            ProgressCode::Ok => log.info(&event.message()),
            ProgressCode::Error => {
                let message = event.message();
                log.error(&message);
                last_error = Some(message);
            }
        }
    }

    if let Some(message) = last_error {
        tracing::error!(image = %image, reported, error = %message, "image pull reported errors");
        return Err(EngineError::Engine(message));
    }

    if reported > 0 {
        log.info(&format!("### Done pulling image {image}"));
    }
    let elapsed_ms = start.elapsed().as_millis() as u64;
    tracing::info!(image = %image, reported, elapsed_ms, "image pulled");
    Ok(PullSummary { reported })
}

#[cfg(test)]
#[path = "puller_tests.rs"]
mod tests;
