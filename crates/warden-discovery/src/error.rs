// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors the discovery registrar surfaces to callers.

use thiserror::Error;
use warden_coordinator::CoordinatorError;

/// `register` failed; per spec.md 4.G the caller is expected to treat this
/// as fatal and let its supervisor restart it.
#[derive(Debug, Error)]
#[error("failed to register with discovery: {0}")]
pub struct RegisterError(#[from] pub CoordinatorError);
