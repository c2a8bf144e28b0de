// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use base64::Engine;
use serde::{Deserialize, Serialize};
use warden_core::{Message, MessageType};

/// Wire shape of a `Message` — identical fields to the domain type, except
/// the payload is base64-text rather than raw bytes, per spec.md §6.
#[derive(Serialize, Deserialize)]
struct WireMessage {
    #[serde(rename = "type")]
    message_type: MessageType,
    command: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    payload: Option<String>,
}

pub fn encode_message(message: &Message) -> Vec<u8> {
    let wire = WireMessage {
        message_type: message.message_type,
        command: message.command.clone(),
        payload: message.payload.as_ref().map(|p| base64::engine::general_purpose::STANDARD.encode(p)),
    };
    serde_json::to_vec(&wire).unwrap_or_default()
}

pub fn decode_message(bytes: &[u8]) -> Option<Message> {
    let wire: WireMessage = match serde_json::from_slice(bytes) {
        Ok(w) => w,
        Err(err) => {
            tracing::warn!(error = %err, "malformed Message payload");
            return None;
        }
    };
    let payload = match wire.payload {
        Some(encoded) => match base64::engine::general_purpose::STANDARD.decode(encoded) {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                tracing::warn!(error = %err, "malformed Message payload base64");
                return None;
            }
        },
        None => None,
    };
    Some(Message { message_type: wire.message_type, command: wire.command, payload })
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
