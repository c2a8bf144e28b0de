// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Writes the current lifecycle state to the state path on every
//! transition, latching a shared failure flag on the first write error.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use warden_core::StateNode;
use warden_coordinator::CoordinatorClient;

use crate::error::PublishError;

pub struct StatePublisher {
    coordinator: Arc<dyn CoordinatorClient>,
    path: String,
    coordinator_failure: Arc<AtomicBool>,
}

impl StatePublisher {
    pub fn new(
        coordinator: Arc<dyn CoordinatorClient>,
        path: impl Into<String>,
        coordinator_failure: Arc<AtomicBool>,
    ) -> Self {
        Self { coordinator, path: path.into(), coordinator_failure }
    }

    /// Whether a write has ever failed. Once latched, the supervisor skips
    /// further coordinator writes for this instance.
    pub fn coordinator_failure(&self) -> bool {
        self.coordinator_failure.load(Ordering::SeqCst)
    }

    /// Encode and write `node`. On failure, latches `coordinator_failure`
    /// so later callers (and the supervisor's terminal handlers) know to
    /// stop issuing coordinator writes.
    pub async fn publish(&self, node: StateNode) -> Result<(), PublishError> {
        let data = warden_codec::encode_state_node(&node);
        self.coordinator.set_data(&self.path, data).await.map(|_| ()).map_err(|err| {
            self.coordinator_failure.store(true, Ordering::SeqCst);
            PublishError(err)
        })
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
