// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use warden_core::Discoverable;

pub fn encode_discoverable(discoverable: &Discoverable) -> Vec<u8> {
    serde_json::to_vec(discoverable).unwrap_or_default()
}

pub fn decode_discoverable(bytes: &[u8]) -> Option<Discoverable> {
    match serde_json::from_slice(bytes) {
        Ok(d) => Some(d),
        Err(err) => {
            tracing::warn!(error = %err, "malformed Discoverable payload");
            None
        }
    }
}

#[cfg(test)]
#[path = "discoverable_tests.rs"]
mod tests;
