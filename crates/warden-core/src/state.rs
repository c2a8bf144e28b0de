// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The lifecycle state machine mirrored into the coordinator.

use serde::{Deserialize, Serialize};

/// A worker's lifecycle state, as reflected into `/<RunId>/state`.
///
/// Transitions only ever move forward: `Starting -> Running -> Stopping ->
/// {Terminated, Failed}`. `is_valid_transition` encodes that monotonicity
/// so callers can assert it rather than trust it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LifecycleState {
    Starting,
    Running,
    Stopping,
    Terminated,
    Failed,
}

impl LifecycleState {
    /// Whether `self` may be followed by `next` per spec.md's monotonicity
    /// invariant. Terminal states (`Terminated`, `Failed`) have no valid
    /// successor; early failure may jump straight from any non-terminal
    /// state to `Failed`.
    pub fn is_valid_transition(self, next: LifecycleState) -> bool {
        use LifecycleState::*;
        match (self, next) {
            (Starting, Running) => true,
            (Running, Stopping) => true,
            (Stopping, Terminated) => true,
            (_, Failed) if !matches!(self, Terminated | Failed) => true,
            _ => false,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, LifecycleState::Terminated | LifecycleState::Failed)
    }
}

/// One stack frame of a recorded failure, serialized explicitly per
/// spec.md §3/§6 (`className`, `methodName`, `fileName`, `lineNumber`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackFrame {
    #[serde(rename = "className")]
    pub class_name: String,
    #[serde(rename = "methodName")]
    pub method_name: String,
    #[serde(rename = "fileName", skip_serializing_if = "Option::is_none", default)]
    pub file_name: Option<String>,
    #[serde(rename = "lineNumber", skip_serializing_if = "Option::is_none", default)]
    pub line_number: Option<i64>,
}

/// Failure detail attached to a `Failed` StateNode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
    #[serde(rename = "stackTrace", default)]
    pub stack_trace: Vec<StackFrame>,
}

impl ErrorDetail {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), stack_trace: Vec::new() }
    }
}

/// The payload written to `/<RunId>/state`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateNode {
    pub state: LifecycleState,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<ErrorDetail>,
}

impl StateNode {
    pub fn new(state: LifecycleState) -> Self {
        Self { state, error: None }
    }

    pub fn failed(error: ErrorDetail) -> Self {
        Self { state: LifecycleState::Failed, error: Some(error) }
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
