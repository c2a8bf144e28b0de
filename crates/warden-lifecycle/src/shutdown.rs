// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Opt-in process-scope shutdown hook. Not wired into any binary — process
//! entry glue is out of scope here — but offered for a host binary that
//! wants Ctrl-C to drain one top-level supervisor before exiting.

use std::sync::Arc;

use tokio::task::JoinHandle;
use warden_core::Service;

use crate::supervisor::Supervisor;

/// Spawns a task that waits for Ctrl-C, forwards `stop()` to `supervisor`,
/// and waits for its terminal notification before returning.
pub fn install<W: Service>(supervisor: Arc<Supervisor<W>>) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "failed to install ctrl-c handler");
            return;
        }
        tracing::info!(run_id = %supervisor.run_id(), "shutdown signal received, stopping supervisor");
        stop_and_await_terminal(&supervisor).await;
    })
}

/// Forwards `stop()` to `supervisor` and blocks until it reports a
/// terminal state. Split out from [`install`] so it can be exercised
/// without a real process signal.
pub(crate) async fn stop_and_await_terminal<W: Service>(supervisor: &Arc<Supervisor<W>>) {
    let mut notifications = supervisor.notifications();
    supervisor.stop().await;

    loop {
        if notifications.borrow().map(|s| s.is_terminal()).unwrap_or(false) {
            return;
        }
        if notifications.changed().await.is_err() {
            return;
        }
    }
}

#[cfg(test)]
#[path = "shutdown_tests.rs"]
mod tests;
