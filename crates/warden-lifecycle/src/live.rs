// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Creates and removes the ephemeral presence marker for one supervised
//! instance. Its disappearance is the only signal the outside world gets
//! that the owning session has died.

use std::sync::Arc;

use serde_json::Value;
use warden_coordinator::{ignore, CoordinatorClient, CoordinatorError, CreateMode};

pub struct LiveNode {
    coordinator: Arc<dyn CoordinatorClient>,
    path: String,
}

impl LiveNode {
    pub fn new(coordinator: Arc<dyn CoordinatorClient>, path: impl Into<String>) -> Self {
        Self { coordinator, path: path.into() }
    }

    /// Create the ephemeral node with `payload` as its caller-supplied
    /// content. A concurrent owner winning the race (`NodeExists`) is not
    /// an error — the prior owner's session will eventually expire, or
    /// ownership is ambiguous by design.
    pub async fn create(&self, payload: Value) -> Result<(), CoordinatorError> {
        let data = warden_codec::encode_live_node(payload);
        ignore(
            self.coordinator.create(&self.path, data, CreateMode::Ephemeral, true),
            CoordinatorError::is_node_exists,
        )
        .await
    }

    /// Best-effort delete; a node that's already gone is not an error.
    pub async fn remove(&self) -> Result<(), CoordinatorError> {
        ignore(self.coordinator.delete(&self.path, None), CoordinatorError::is_no_node).await
    }
}

#[cfg(test)]
#[path = "live_tests.rs"]
mod tests;
