// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors surfaced by the lifecycle supervisor and its subordinate parts.

use thiserror::Error;
use warden_coordinator::CoordinatorError;

/// A write that encodes an observable state transition failed.
#[derive(Debug, Error)]
#[error("failed to publish state: {0}")]
pub struct PublishError(#[from] pub CoordinatorError);

/// A supervisor-level failure, surfaced through the worker's `failed`
/// notification as the underlying cause.
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error(transparent)]
    Publish(#[from] PublishError),
    #[error(transparent)]
    Coordinator(#[from] CoordinatorError),
}
