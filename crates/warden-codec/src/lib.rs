// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON encoding for the payloads that flow across the coordinator.
//!
//! Every `decode_*` function is total: a malformed or unknown payload
//! yields `None` rather than an error, because the caller's policy on a
//! decode failure (log + delete the node, log + drop the child from a
//! discovery snapshot, ...) differs per call site and is never "propagate".

pub mod discoverable;
pub mod live_node;
pub mod message;
pub mod state_node;

pub use discoverable::{decode_discoverable, encode_discoverable};
pub use live_node::{decode_live_node, encode_live_node};
pub use message::{decode_message, encode_message};
pub use state_node::{decode_state_node, encode_state_node};
