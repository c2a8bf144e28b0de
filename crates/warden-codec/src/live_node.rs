// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Content of the ephemeral live node: `{"data": <caller-supplied value>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct LiveNode {
    data: Value,
}

pub fn encode_live_node(data: Value) -> Vec<u8> {
    serde_json::to_vec(&LiveNode { data }).unwrap_or_default()
}

pub fn decode_live_node(bytes: &[u8]) -> Option<Value> {
    match serde_json::from_slice::<LiveNode>(bytes) {
        Ok(node) => Some(node.data),
        Err(err) => {
            tracing::warn!(error = %err, "malformed live node payload");
            None
        }
    }
}

#[cfg(test)]
#[path = "live_node_tests.rs"]
mod tests;
