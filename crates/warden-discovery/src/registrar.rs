// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Publishes ephemeral-sequential endpoint nodes and re-registers them
//! after a session expiry, since expiry wipes every ephemeral node the
//! old session held.

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::join_all;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use warden_core::{Cancellable, Discoverable};
use warden_coordinator::{ignore, CoordinatorClient, CoordinatorError, CreateMode, SessionEvent};

use crate::error::RegisterError;

/// Per-registration bookkeeping. `path` is `None` while a re-registration
/// is in flight (or permanently, after one has failed) — `cancel` treats
/// a `None` path as nothing to delete yet and defers to whichever
/// re-registration attempt completes next.
struct HandleState {
    path: Option<String>,
    cancelled: bool,
}

struct RegistrationHandle {
    coordinator: Arc<dyn CoordinatorClient>,
    discoverable: Discoverable,
    state: Mutex<HandleState>,
}

impl RegistrationHandle {
    fn new(coordinator: Arc<dyn CoordinatorClient>, discoverable: Discoverable, path: String) -> Self {
        Self { coordinator, discoverable, state: Mutex::new(HandleState { path: Some(path), cancelled: false }) }
    }

    /// Abandons the current path (the old node will be garbage-collected
    /// by the coordinator, having already died with the expired session)
    /// and creates a fresh one. A failure blanks the path, at which point
    /// `cancel` becomes a no-op.
    async fn reregister(&self, service_path: &str) {
        {
            let mut state = self.state.lock();
            if state.cancelled {
                return;
            }
            state.path = None;
        }

        let prefix = format!("{}/service-", service_path.trim_end_matches('/'));
        let data = warden_codec::encode_discoverable(&self.discoverable);
        match self.coordinator.create(&prefix, data, CreateMode::EphemeralSequential, true).await {
            Ok(new_path) => {
                let stale = {
                    let mut state = self.state.lock();
                    if state.cancelled {
                        true
                    } else {
                        state.path = Some(new_path.clone());
                        false
                    }
                };
                if stale {
                    let _ = ignore(self.coordinator.delete(&new_path, None), CoordinatorError::is_no_node).await;
                }
            }
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    service = %self.discoverable.service,
                    "discovery re-registration failed, leaving this handle unregistered",
                );
            }
        }
    }
}

impl Cancellable for RegistrationHandle {
    fn cancel(&self) {
        let path = {
            let mut state = self.state.lock();
            if state.cancelled {
                return;
            }
            state.cancelled = true;
            state.path.take()
        };
        let Some(path) = path else { return };

        let coordinator = self.coordinator.clone();
        tokio::spawn(async move {
            let _ = ignore(coordinator.delete(&path, None), CoordinatorError::is_no_node).await;
        });
    }

    fn is_cancelled(&self) -> bool {
        self.state.lock().cancelled
    }
}

/// Registers service endpoints under a shared discovery namespace and
/// keeps them alive across session loss. One registrar can hold many
/// registrations; a given [`Discoverable`] registers at most once per
/// instance — a caller wanting two live endpoints for the same tuple
/// should use two registrars or vary the tuple.
pub struct DiscoveryRegistrar {
    coordinator: Arc<dyn CoordinatorClient>,
    namespace: String,
    handles: Mutex<HashMap<Discoverable, Arc<RegistrationHandle>>>,
    session_task: Mutex<Option<JoinHandle<()>>>,
}

impl DiscoveryRegistrar {
    pub fn new(coordinator: Arc<dyn CoordinatorClient>, namespace: impl Into<String>) -> Arc<Self> {
        let registrar = Arc::new(Self {
            coordinator,
            namespace: namespace.into(),
            handles: Mutex::new(HashMap::new()),
            session_task: Mutex::new(None),
        });
        registrar.clone().spawn_session_watcher();
        registrar
    }

    fn service_path(&self, service: &str) -> String {
        format!("{}/{}", self.namespace.trim_end_matches('/'), service)
    }

    /// Creates an `EPHEMERAL_SEQUENTIAL` node for `discoverable`, creating
    /// its service parent if absent. Blocks on the initial create; a
    /// failure propagates so a worker that cannot advertise itself crashes
    /// fast and gets restarted by its supervisor.
    pub async fn register(self: &Arc<Self>, discoverable: Discoverable) -> Result<Arc<dyn Cancellable>, RegisterError> {
        let service_path = self.service_path(&discoverable.service);
        let prefix = format!("{}/service-", service_path);
        let data = warden_codec::encode_discoverable(&discoverable);
        let path = self.coordinator.create(&prefix, data, CreateMode::EphemeralSequential, true).await?;

        let handle = Arc::new(RegistrationHandle::new(self.coordinator.clone(), discoverable.clone(), path));
        self.handles.lock().insert(discoverable, handle.clone());
        Ok(handle)
    }

    fn spawn_session_watcher(self: Arc<Self>) {
        let mut events = self.coordinator.session_events();
        let handle = tokio::spawn(async move {
            let mut expired = false;
            loop {
                match events.recv().await {
                    Ok(SessionEvent::Expired) => expired = true,
                    Ok(SessionEvent::SyncConnected) if expired => {
                        expired = false;
                        self.reregister_all().await;
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => return,
                }
            }
        });
        *self.session_task.lock() = Some(handle);
    }

    async fn reregister_all(self: &Arc<Self>) {
        let handles: Vec<Arc<RegistrationHandle>> = self.handles.lock().values().cloned().collect();
        let tasks = handles.into_iter().filter(|h| !h.is_cancelled()).map(|handle| {
            let service_path = self.service_path(&handle.discoverable.service);
            async move { handle.reregister(&service_path).await }
        });
        join_all(tasks).await;
    }
}

#[cfg(test)]
#[path = "registrar_tests.rs"]
mod tests;
