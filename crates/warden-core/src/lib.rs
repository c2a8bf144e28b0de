// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! warden-core: shared domain types for lifecycle supervision and discovery.
//!
//! This crate has no opinion about *how* a coordination store is reached —
//! that contract lives in `warden-coordinator`. It only defines the data
//! that flows across it and the interfaces a hosted worker must satisfy.

pub mod cancellable;
pub mod discoverable;
pub mod message;
pub mod message_callback;
pub mod run_id;
pub mod service;
pub mod state;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use cancellable::Cancellable;
pub use discoverable::Discoverable;
pub use message::{Message, MessageType, SYSTEM_STOP_COMMAND};
pub use message_callback::MessageCallback;
pub use run_id::RunId;
pub use service::{Service, ServiceError, ServiceListener};
pub use state::{ErrorDetail, LifecycleState, StackFrame, StateNode};
