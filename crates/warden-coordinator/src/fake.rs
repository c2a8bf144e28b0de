// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! An in-memory [`CoordinatorClient`] used by every test in this workspace.
//!
//! Not a production backend — there is no network, no persistence, and one
//! `FakeCoordinator` represents exactly one client session. It exists so
//! the lifecycle supervisor and discovery registry can be exercised
//! end-to-end (spec.md §8's literal scenarios) without a real coordination
//! service.

use crate::client::{CoordinatorClient, CreateMode, WatchReceiver};
use crate::error::CoordinatorError;
use crate::events::{SessionEvent, WatchedEvent};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, oneshot};

struct FakeNode {
    data: Vec<u8>,
    version: i64,
    mode: CreateMode,
}

#[derive(Default)]
struct Inner {
    nodes: HashMap<String, FakeNode>,
    seq_counters: HashMap<String, u64>,
    /// Watches registered via `get_children(path, watch: true)`, keyed by
    /// `path`. Fired with `NodeChildrenChanged` when a direct child of
    /// `path` is created or removed, or with `NodeDeleted` when `path`
    /// itself is removed — mirroring a real coordinator's behavior that a
    /// children-watch also reports the watched node's own deletion.
    child_watches: HashMap<String, Vec<oneshot::Sender<WatchedEvent>>>,
}

/// In-memory coordinator double. Cheap to clone (shares its state via
/// `Arc`), so tests can hand out multiple handles that all observe the
/// same tree and the same session event stream.
#[derive(Clone)]
pub struct FakeCoordinator {
    inner: Arc<Mutex<Inner>>,
    session_tx: broadcast::Sender<SessionEvent>,
}

fn parent_dir(path: &str) -> String {
    match path.trim_end_matches('/').rfind('/') {
        Some(0) => "/".to_string(),
        Some(idx) => path[..idx].to_string(),
        None => "/".to_string(),
    }
}

impl FakeCoordinator {
    pub fn new() -> Self {
        let (session_tx, _) = broadcast::channel(64);
        Self { inner: Arc::new(Mutex::new(Inner::default())), session_tx }
    }

    /// Fire every pending watch registered on `path`'s children with
    /// `NodeChildrenChanged`, and remove them (watches are one-shot).
    fn fire_child_watches(inner: &mut Inner, path: &str) {
        if let Some(senders) = inner.child_watches.remove(path) {
            for tx in senders {
                let _ = tx.send(WatchedEvent::NodeChildrenChanged);
            }
        }
    }

    /// Fire watches registered directly on `path` (not its parent) with
    /// `NodeDeleted`, because `path` itself just went away.
    fn fire_node_deleted(inner: &mut Inner, path: &str) {
        if let Some(senders) = inner.child_watches.remove(path) {
            for tx in senders {
                let _ = tx.send(WatchedEvent::NodeDeleted);
            }
        }
    }

    /// Simulate the coordinator expiring this client's session: every
    /// ephemeral node it holds disappears and `Expired` is broadcast.
    pub fn expire_session(&self) {
        let mut inner = self.inner.lock();
        let ephemeral_paths: Vec<String> = inner
            .nodes
            .iter()
            .filter(|(_, n)| matches!(n.mode, CreateMode::Ephemeral | CreateMode::EphemeralSequential))
            .map(|(p, _)| p.clone())
            .collect();
        for path in &ephemeral_paths {
            inner.nodes.remove(path);
            let parent = parent_dir(path);
            Self::fire_child_watches(&mut inner, &parent);
            Self::fire_node_deleted(&mut inner, path);
        }
        drop(inner);
        let _ = self.session_tx.send(SessionEvent::Expired);
    }

    /// Simulate the coordinator reconnecting after an expiry (or on first
    /// connect).
    pub fn reconnect(&self) {
        let _ = self.session_tx.send(SessionEvent::SyncConnected);
    }

    /// Simulate a transient disconnect (no state change, no expiry).
    pub fn disconnect(&self) {
        let _ = self.session_tx.send(SessionEvent::Disconnected);
    }

    /// Snapshot of every live path, for assertions in tests.
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.inner.lock().nodes.keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Whether `path` currently exists.
    pub fn exists(&self, path: &str) -> bool {
        self.inner.lock().nodes.contains_key(path)
    }
}

impl Default for FakeCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CoordinatorClient for FakeCoordinator {
    async fn create(
        &self,
        path: &str,
        data: Vec<u8>,
        mode: CreateMode,
        create_parents: bool,
    ) -> Result<String, CoordinatorError> {
        let mut inner = self.inner.lock();

        let final_path = if mode == CreateMode::EphemeralSequential {
            let parent = parent_dir(path);
            let seq = inner.seq_counters.entry(parent).or_insert(0);
            let assigned = *seq;
            *seq += 1;
            format!("{path}{assigned:010}")
        } else {
            path.to_string()
        };

        if inner.nodes.contains_key(&final_path) {
            return Err(CoordinatorError::NodeExists(final_path));
        }

        let parent = parent_dir(&final_path);
        if parent != "/" && !inner.nodes.contains_key(&parent) {
            if create_parents {
                let mut to_create = Vec::new();
                let mut cur = parent.clone();
                loop {
                    if cur == "/" || inner.nodes.contains_key(&cur) {
                        break;
                    }
                    to_create.push(cur.clone());
                    cur = parent_dir(&cur);
                }
                for p in to_create.into_iter().rev() {
                    inner.nodes.insert(p, FakeNode { data: Vec::new(), version: 0, mode: CreateMode::Persistent });
                }
            } else {
                return Err(CoordinatorError::NoParent(final_path));
            }
        }

        inner.nodes.insert(final_path.clone(), FakeNode { data, version: 0, mode });
        Self::fire_child_watches(&mut inner, &parent);
        Ok(final_path)
    }

    async fn delete(&self, path: &str, version: Option<i64>) -> Result<(), CoordinatorError> {
        let mut inner = self.inner.lock();
        match inner.nodes.get(path) {
            None => return Err(CoordinatorError::NoNode(path.to_string())),
            Some(node) => {
                if let Some(expected) = version {
                    if node.version != expected {
                        return Err(CoordinatorError::BadVersion { path: path.to_string(), expected });
                    }
                }
            }
        }
        inner.nodes.remove(path);
        let parent = parent_dir(path);
        Self::fire_child_watches(&mut inner, &parent);
        Self::fire_node_deleted(&mut inner, path);
        Ok(())
    }

    async fn get_data(&self, path: &str) -> Result<(Vec<u8>, i64), CoordinatorError> {
        let inner = self.inner.lock();
        inner
            .nodes
            .get(path)
            .map(|n| (n.data.clone(), n.version))
            .ok_or_else(|| CoordinatorError::NoNode(path.to_string()))
    }

    async fn set_data(&self, path: &str, data: Vec<u8>) -> Result<i64, CoordinatorError> {
        let mut inner = self.inner.lock();
        let node = inner.nodes.get_mut(path).ok_or_else(|| CoordinatorError::NoNode(path.to_string()))?;
        node.data = data;
        node.version += 1;
        Ok(node.version)
    }

    async fn get_children(
        &self,
        path: &str,
        watch: bool,
    ) -> Result<(Vec<String>, Option<WatchReceiver>), CoordinatorError> {
        let mut inner = self.inner.lock();
        if path != "/" && !inner.nodes.contains_key(path) {
            return Err(CoordinatorError::NoNode(path.to_string()));
        }
        let prefix = if path.ends_with('/') { path.to_string() } else { format!("{path}/") };
        let mut children: Vec<String> = inner
            .nodes
            .keys()
            .filter_map(|p| {
                let rest = p.strip_prefix(&prefix)?;
                if rest.is_empty() || rest.contains('/') {
                    None
                } else {
                    Some(rest.to_string())
                }
            })
            .collect();
        children.sort();

        let watch_rx = if watch {
            let (tx, rx) = oneshot::channel();
            inner.child_watches.entry(path.to_string()).or_default().push(tx);
            Some(rx)
        } else {
            None
        };

        Ok((children, watch_rx))
    }

    fn session_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.session_tx.subscribe()
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
