// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The optional callback a worker exposes to receive USER messages.

use crate::message::Message;
use async_trait::async_trait;

/// Implemented by a worker that wants to receive non-`SYSTEM/stop` messages.
/// The returned future's completion (success or failure) gates deletion of
/// the message node — see spec.md 4.E.
#[async_trait]
pub trait MessageCallback: Send + Sync + 'static {
    async fn on_received(
        &self,
        message_id: &str,
        message: Message,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>;
}
