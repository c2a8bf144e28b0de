// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use warden_core::StateNode;

/// Encode a `StateNode` as the JSON bytes written to `/<RunId>/state`.
pub fn encode_state_node(node: &StateNode) -> Vec<u8> {
    // A StateNode is built entirely from this crate's own types, so
    // serialization cannot fail.
    serde_json::to_vec(node).unwrap_or_default()
}

/// Decode the bytes read from `/<RunId>/state`. Returns `None` on
/// malformed or unrecognized payloads; the caller logs and applies its
/// own policy (the state publisher never reads its own writes back, so
/// in practice this is exercised by tests and by any external reader).
pub fn decode_state_node(bytes: &[u8]) -> Option<StateNode> {
    match serde_json::from_slice(bytes) {
        Ok(node) => Some(node),
        Err(err) => {
            tracing::warn!(error = %err, "malformed StateNode payload");
            None
        }
    }
}

#[cfg(test)]
#[path = "state_node_tests.rs"]
mod tests;
