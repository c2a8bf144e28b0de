// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inbound command messages delivered through `/<RunId>/messages/<id>`.

use serde::{Deserialize, Serialize};

/// The one mandated built-in command: a request that the supervisor stop
/// its worker. Never delivered to the worker's own message callback.
pub const SYSTEM_STOP_COMMAND: &str = "stop";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageType {
    System,
    User,
}

/// A single command node under the messages path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub payload: Option<Vec<u8>>,
}

impl Message {
    pub fn system_stop() -> Self {
        Self {
            message_type: MessageType::System,
            command: SYSTEM_STOP_COMMAND.to_string(),
            payload: None,
        }
    }

    pub fn user(command: impl Into<String>, payload: Option<Vec<u8>>) -> Self {
        Self { message_type: MessageType::User, command: command.into(), payload }
    }

    /// Whether this is the mandated `SYSTEM/stop` command.
    pub fn is_system_stop(&self) -> bool {
        self.message_type == MessageType::System && self.command == SYSTEM_STOP_COMMAND
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
