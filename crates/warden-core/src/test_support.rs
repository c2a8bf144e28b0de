// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test double for a hosted worker, exported behind `test-support` so
//! sibling crates (and the root integration tests) can script a worker's
//! lifecycle without depending on a real one.

use crate::service::{Service, ServiceError, ServiceListener};
use crate::state::LifecycleState;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

/// What happens when [`ScriptedWorker::stop`] is invoked.
#[derive(Debug, Clone)]
pub enum StopOutcome {
    Terminated,
    Failed(String),
}

/// A `Service` whose transitions are scripted by the test rather than
/// driven by any real subprocess or thread.
pub struct ScriptedWorker {
    listeners: Mutex<Vec<Arc<dyn ServiceListener>>>,
    current: Mutex<LifecycleState>,
    stop_outcome: Mutex<StopOutcome>,
    report_running_on_start: bool,
}

impl ScriptedWorker {
    /// A worker that reports RUNNING immediately after `start()` and
    /// TERMINATED immediately after `stop()` — the "happy path" script.
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(Vec::new()),
            current: Mutex::new(LifecycleState::Starting),
            stop_outcome: Mutex::new(StopOutcome::Terminated),
            report_running_on_start: true,
        }
    }

    /// A worker that transitions to STARTING but never self-reports RUNNING
    /// (the supervisor must drive it externally, e.g. via `stop()`).
    pub fn manual() -> Self {
        let mut w = Self::new();
        w.report_running_on_start = false;
        w
    }

    pub fn set_stop_outcome(&self, outcome: StopOutcome) {
        *self.stop_outcome.lock() = outcome;
    }

    fn notify_terminal(&self) {
        let from = *self.current.lock();
        let outcome = self.stop_outcome.lock().clone();
        let listeners = self.listeners.lock().clone();
        match outcome {
            StopOutcome::Terminated => {
                *self.current.lock() = LifecycleState::Terminated;
                for l in listeners {
                    l.terminated(from);
                }
            }
            StopOutcome::Failed(message) => {
                *self.current.lock() = LifecycleState::Failed;
                for l in listeners {
                    l.failed(from, Box::<dyn std::error::Error + Send + Sync>::from(message.clone()));
                }
            }
        }
    }
}

impl Default for ScriptedWorker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Service for ScriptedWorker {
    async fn start(&self) {
        *self.current.lock() = LifecycleState::Starting;
        for l in self.listeners.lock().clone() {
            l.starting();
        }
        if self.report_running_on_start {
            *self.current.lock() = LifecycleState::Running;
            for l in self.listeners.lock().clone() {
                l.running();
            }
        }
    }

    async fn stop(&self) {
        *self.current.lock() = LifecycleState::Stopping;
        for l in self.listeners.lock().clone() {
            l.stopping();
        }
        self.notify_terminal();
    }

    fn add_listener(&self, listener: Arc<dyn ServiceListener>) {
        self.listeners.lock().push(listener);
    }
}

/// Cause type used by failure-path tests — satisfies [`ServiceError`].
pub fn test_error(message: impl Into<String>) -> ServiceError {
    Box::<dyn std::error::Error + Send + Sync>::from(message.into())
}

#[cfg(test)]
#[path = "test_support_tests.rs"]
mod tests;
