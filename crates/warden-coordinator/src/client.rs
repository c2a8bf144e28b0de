// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The thin async contract this crate requires of a coordination store.
//!
//! This is deliberately *not* an implementation of any particular wire
//! protocol — the concrete client (talking to a real coordination service
//! over its own protocol) is an external collaborator. What lives here is
//! the capability surface the rest of the workspace is built against, plus
//! an in-memory [`fake::FakeCoordinator`] double used by every test in this
//! workspace.

use crate::error::CoordinatorError;
use crate::events::{SessionEvent, WatchedEvent};
use async_trait::async_trait;
use tokio::sync::{broadcast, oneshot};

/// How a node is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CreateMode {
    /// Survives the creating session; must be deleted explicitly.
    Persistent,
    /// Removed by the coordinator when the creating session ends.
    Ephemeral,
    /// Ephemeral, with the coordinator appending a monotonically
    /// increasing sequence suffix to the requested path.
    EphemeralSequential,
}

/// A one-shot registration for a watch on a single path. Delivered at
/// most once; the caller must call `get_children`/`get_data` again with
/// `watch: true` to keep observing.
pub type WatchReceiver = oneshot::Receiver<WatchedEvent>;

/// Async CRUD + watches on a hierarchical, session-bound key/value store.
#[async_trait]
pub trait CoordinatorClient: Send + Sync + 'static {
    /// Create `path` with `data`. If `create_parents` is set, missing
    /// persistent parents are created first. Returns the path actually
    /// created — for `EphemeralSequential` this includes the coordinator's
    /// assigned suffix.
    async fn create(
        &self,
        path: &str,
        data: Vec<u8>,
        mode: CreateMode,
        create_parents: bool,
    ) -> Result<String, CoordinatorError>;

    /// Delete `path`. If `version` is `Some`, the delete only succeeds if
    /// the node's current version matches.
    async fn delete(&self, path: &str, version: Option<i64>) -> Result<(), CoordinatorError>;

    /// Fetch a node's data and current version.
    async fn get_data(&self, path: &str) -> Result<(Vec<u8>, i64), CoordinatorError>;

    /// Overwrite a node's data, returning its new version.
    async fn set_data(&self, path: &str, data: Vec<u8>) -> Result<i64, CoordinatorError>;

    /// List `path`'s children. When `watch` is set, also returns a
    /// one-shot receiver that resolves the next time the child set (or the
    /// node itself) changes.
    async fn get_children(
        &self,
        path: &str,
        watch: bool,
    ) -> Result<(Vec<String>, Option<WatchReceiver>), CoordinatorError>;

    /// Subscribe to this client's own session lifecycle. Every subscriber
    /// gets an independent view of the stream from the point it subscribes.
    fn session_events(&self) -> broadcast::Receiver<SessionEvent>;
}
