// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ctrl-C / SIGTERM latch for `dockhand launch`.
//!
//! Installed before provisioning starts, so a signal that arrives while the
//! container is being created no longer kills the process and leaks the
//! container. The signal is latched and closes the channel as soon as it
//! is established, which reaps the container.

use std::future::Future;
use tokio::sync::watch;

#[derive(Clone)]
pub struct Interrupt {
    fired: watch::Receiver<bool>,
}

impl Interrupt {
    /// Start listening for Ctrl-C (and SIGTERM on unix). From now on those
    /// signals only set the latch.
    pub fn install() -> Self {
        let (tx, interrupt) = Self::manual();
        tokio::spawn(async move {
            wait_for_signal().await;
            tracing::info!("interrupt received");
            let _ = tx.send(true);
        });
        interrupt
    }

    /// A latch fired through the returned sender
    pub(crate) fn manual() -> (watch::Sender<bool>, Self) {
        let (tx, fired) = watch::channel(false);
        (tx, Self { fired })
    }

    pub fn is_fired(&self) -> bool {
        *self.fired.borrow()
    }

    /// Resolves once the latch is set, immediately if it already is.
    /// Never resolves if the latch can no longer fire.
    pub fn fired(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut fired = self.fired.clone();
        async move {
            if fired.wait_for(|fired| *fired).await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Returns once a termination signal arrives. An unavailable handler must
/// not look like a signal, so it pends instead.
async fn wait_for_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                if sigterm.recv().await.is_none() {
                    std::future::pending::<()>().await;
                }
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

#[cfg(test)]
#[path = "interrupt_tests.rs"]
mod tests;
