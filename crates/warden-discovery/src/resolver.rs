// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Maintains a live snapshot of a service's members, refreshed by a
//! child watch on that service's path.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use futures_util::future::join_all;
use parking_lot::Mutex;

use warden_core::Discoverable;
use warden_coordinator::{CoordinatorClient, CoordinatorError, CreateMode, WatchedEvent};

/// How long `watch_loop` waits before retrying after the service path is
/// (transiently) missing, rather than giving up on the view for good.
const MISSING_PARENT_RETRY: Duration = Duration::from_millis(50);

/// A live, iterable view of one service's current members. Reads never
/// block; they reflect whatever snapshot was most recently installed.
pub struct MembershipView {
    snapshot: ArcSwap<Vec<Discoverable>>,
}

impl MembershipView {
    fn empty() -> Self {
        Self { snapshot: ArcSwap::from_pointee(Vec::new()) }
    }

    /// The current membership snapshot. Cheap: an `Arc` clone of the
    /// installed `Vec`, never a copy of its contents.
    pub fn members(&self) -> Arc<Vec<Discoverable>> {
        self.snapshot.load_full()
    }
}

/// Caches [`MembershipView`]s by service name, each backed by its own
/// child-watch loop installed lazily on first `discover`.
pub struct DiscoveryResolver {
    coordinator: Arc<dyn CoordinatorClient>,
    namespace: String,
    views: Mutex<HashMap<String, Arc<MembershipView>>>,
}

impl DiscoveryResolver {
    pub fn new(coordinator: Arc<dyn CoordinatorClient>, namespace: impl Into<String>) -> Arc<Self> {
        Arc::new(Self { coordinator, namespace: namespace.into(), views: Mutex::new(HashMap::new()) })
    }

    fn service_path(&self, service: &str) -> String {
        format!("{}/{}", self.namespace.trim_end_matches('/'), service)
    }

    /// Returns the live view for `service`, installing its watch loop the
    /// first time it's asked for. Subsequent calls for the same name
    /// return the same view.
    pub fn discover(self: &Arc<Self>, service: &str) -> Arc<MembershipView> {
        let mut views = self.views.lock();
        if let Some(view) = views.get(service) {
            return view.clone();
        }
        let view = Arc::new(MembershipView::empty());
        views.insert(service.to_string(), view.clone());
        drop(views);

        let resolver = self.clone();
        let service_name = service.to_string();
        let installed = view.clone();
        tokio::spawn(async move { resolver.watch_loop(service_name, installed).await });

        view
    }

    async fn watch_loop(self: Arc<Self>, service: String, view: Arc<MembershipView>) {
        let service_path = self.service_path(&service);
        loop {
            if let Err(err) = self.ensure_service_path(&service_path).await {
                tracing::warn!(error = %err, path = %service_path, "failed to ensure discovery path exists, retrying");
                tokio::time::sleep(MISSING_PARENT_RETRY).await;
                continue;
            }

            let (children, watch_rx) = match self.coordinator.get_children(&service_path, true).await {
                Ok(v) => v,
                Err(err) if err.is_no_node() => {
                    // Raced with a concurrent teardown of the parent itself;
                    // `ensure_service_path` will recreate it on the next turn.
                    tokio::time::sleep(MISSING_PARENT_RETRY).await;
                    continue;
                }
                Err(err) => {
                    tracing::warn!(error = %err, path = %service_path, "failed to watch service path, not re-arming");
                    return;
                }
            };

            self.refresh(&service_path, &children, &view).await;

            let Some(watch_rx) = watch_rx else { return };
            match watch_rx.await {
                Ok(WatchedEvent::NodeChildrenChanged) => continue,
                Ok(other) => {
                    tracing::warn!(?other, path = %service_path, "service watch fired unexpected event, not re-arming");
                    return;
                }
                Err(_) => return,
            }
        }
    }

    /// Creates the service's own node if it doesn't exist yet, mirroring
    /// `DiscoveryRegistrar`'s own `create_parents: true` convention — a
    /// service with no registrations yet must still resolve to an (empty)
    /// live view rather than a permanently-abandoned watch.
    async fn ensure_service_path(&self, service_path: &str) -> Result<(), CoordinatorError> {
        match self.coordinator.create(service_path, Vec::new(), CreateMode::Persistent, true).await {
            Ok(_) | Err(CoordinatorError::NodeExists(_)) => Ok(()),
            Err(err) => Err(err),
        }
    }

    /// Fetches every child's data in parallel. A child that fails to read
    /// or fails to decode is dropped from the snapshot rather than
    /// failing the whole refresh — availability over completeness; a
    /// later watch firing corrects a transient miss.
    async fn refresh(&self, service_path: &str, children: &[String], view: &MembershipView) {
        let fetches = children.iter().map(|name| {
            let path = format!("{}/{name}", service_path.trim_end_matches('/'));
            async move {
                match self.coordinator.get_data(&path).await {
                    Ok((data, _)) => warden_codec::decode_discoverable(&data),
                    Err(err) => {
                        tracing::debug!(error = %err, path = %path, "failed to fetch discovery child, dropping from snapshot");
                        None
                    }
                }
            }
        });

        let members: Vec<Discoverable> = join_all(fetches).await.into_iter().flatten().collect();
        view.snapshot.store(Arc::new(members));
    }
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
