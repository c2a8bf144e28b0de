// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The contract the lifecycle supervisor requires of a hosted worker.

use crate::state::LifecycleState;
use async_trait::async_trait;
use std::sync::Arc;

/// Opaque cause of a worker's `Failed` transition. Boxed so the worker
/// crate can carry whatever error type it likes without this crate
/// depending on it.
pub type ServiceError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Notifications the supervisor installs on the worker so it learns about
/// every transition the worker's own state machine makes.
///
/// Calls are synchronous and expected to return quickly — they run on
/// whichever thread the worker's state machine itself is running on; a
/// listener that wants to do I/O should hand off to its own task.
pub trait ServiceListener: Send + Sync + 'static {
    fn starting(&self) {}
    fn running(&self) {}
    fn stopping(&self) {}
    fn terminated(&self, from: LifecycleState);
    fn failed(&self, from: LifecycleState, cause: ServiceError);
}

/// The lifecycle contract a hosted worker must satisfy.
///
/// `start`/`stop` are the only operations the supervisor invokes directly;
/// everything else about the worker's behavior is observed through the
/// [`ServiceListener`] the supervisor installs via `add_listener`.
#[async_trait]
pub trait Service: Send + Sync + 'static {
    async fn start(&self);
    async fn stop(&self);

    /// Install a listener that will observe every lifecycle transition.
    /// May be called more than once; all installed listeners are notified.
    fn add_listener(&self, listener: Arc<dyn ServiceListener>);
}
