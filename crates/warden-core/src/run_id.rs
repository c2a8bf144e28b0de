// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run identifier: the namespace root for one supervised instance.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Opaque, process-unique textual token naming one supervised instance's
/// subtree in the coordinator (`/<RunId>/...`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub String);

impl RunId {
    /// Create a new RunId from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh RunId from a random UUID.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the string value of this RunId.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path of this run's persistent state node, relative to the coordinator root.
    pub fn state_path(&self) -> String {
        format!("/{}/state", self.0)
    }

    /// Path of this run's messages container, relative to the coordinator root.
    pub fn messages_path(&self) -> String {
        format!("/{}/messages", self.0)
    }

    /// Path of a single message node under this run's messages container.
    pub fn message_path(&self, message_id: &str) -> String {
        format!("/{}/messages/{}", self.0, message_id)
    }

    /// Path of this run's ephemeral live node under `/instances`.
    pub fn live_path(&self) -> String {
        format!("/instances/{}", self.0)
    }

    /// Root path of this run's subtree (`/<RunId>`).
    pub fn root_path(&self) -> String {
        format!("/{}", self.0)
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RunId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RunId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl PartialEq<str> for RunId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for RunId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Borrow<str> for RunId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[path = "run_id_tests.rs"]
mod tests;
