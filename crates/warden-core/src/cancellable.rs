// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Handle returned by `DiscoveryService::register`.

/// A live registration that can be torn down. `cancel` is idempotent:
/// calling it twice, or calling it after the registry has already dropped
/// the registration for another reason, is a no-op.
pub trait Cancellable: Send + Sync + 'static {
    fn cancel(&self);

    /// Whether `cancel` has been called.
    fn is_cancelled(&self) -> bool;
}
