// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Watches the messages path, orders messages, and dispatches them to the
//! worker's message callback (or, for `SYSTEM/STOP`, to the worker's own
//! `stop()`) on a single sequential loop — never a thread pool, so STOP
//! handling and user message handling are mutually exclusive and ordered.

use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use warden_core::{LifecycleState, MessageCallback, Service};
use warden_coordinator::{ignore, CoordinatorClient, CoordinatorError, WatchedEvent};

pub struct CommandListener {
    coordinator: Arc<dyn CoordinatorClient>,
    messages_path: String,
    worker: Arc<dyn Service>,
    callback: Option<Arc<dyn MessageCallback>>,
    terminal_rx: watch::Receiver<Option<LifecycleState>>,
    cancellation: CancellationToken,
}

impl CommandListener {
    pub fn new(
        coordinator: Arc<dyn CoordinatorClient>,
        messages_path: impl Into<String>,
        worker: Arc<dyn Service>,
        callback: Option<Arc<dyn MessageCallback>>,
        terminal_rx: watch::Receiver<Option<LifecycleState>>,
        cancellation: CancellationToken,
    ) -> Self {
        Self { coordinator, messages_path: messages_path.into(), worker, callback, terminal_rx, cancellation }
    }

    fn terminal_reached(&self) -> bool {
        self.terminal_rx.borrow().map(|s| s.is_terminal()).unwrap_or(false)
    }

    /// Drives the watch/sort/dispatch loop until the worker reaches a
    /// terminal state or the supervisor cancels the listener.
    pub async fn run(&self) {
        loop {
            if self.terminal_reached() {
                return;
            }

            let (children, watch_rx) = tokio::select! {
                biased;
                _ = self.cancellation.cancelled() => return,
                result = self.coordinator.get_children(&self.messages_path, true) => match result {
                    Ok(v) => v,
                    Err(err) => {
                        tracing::warn!(error = %err, path = %self.messages_path, "failed to watch messages path, not re-arming");
                        return;
                    }
                },
            };

            self.process_children(children).await;

            if self.terminal_reached() {
                return;
            }

            let Some(watch_rx) = watch_rx else { return };
            tokio::select! {
                biased;
                _ = self.cancellation.cancelled() => return,
                event = watch_rx => match event {
                    Ok(WatchedEvent::NodeChildrenChanged) => continue,
                    Ok(other) => {
                        tracing::warn!(?other, path = %self.messages_path, "messages watch fired unexpected event, not re-arming");
                        return;
                    }
                    Err(_) => return,
                },
            }
        }
    }

    async fn process_children(&self, mut children: Vec<String>) {
        children.sort();
        for name in children {
            self.process_one(&name).await;
        }
    }

    fn message_path(&self, name: &str) -> String {
        format!("{}/{name}", self.messages_path.trim_end_matches('/'))
    }

    async fn process_one(&self, name: &str) {
        let path = self.message_path(name);
        let (data, version) = match self.coordinator.get_data(&path).await {
            Ok(v) => v,
            Err(err) => {
                tracing::warn!(error = %err, path = %path, "failed to read message, leaving for next watch");
                return;
            }
        };

        let message = match warden_codec::decode_message(&data) {
            Some(message) => message,
            None => {
                tracing::warn!(path = %path, "malformed message payload, deleting undelivered");
                let _ = ignore(self.coordinator.delete(&path, Some(version)), CoordinatorError::is_no_node).await;
                return;
            }
        };

        if message.is_system_stop() {
            self.handle_stop(&path, version).await;
        } else {
            self.handle_user_message(name, message, &path, version).await;
        }
    }

    async fn handle_user_message(
        &self,
        message_id: &str,
        message: warden_core::Message,
        path: &str,
        version: i64,
    ) {
        if let Some(callback) = &self.callback {
            if let Err(err) = callback.on_received(message_id, message).await {
                tracing::warn!(error = %err, message_id, "message callback failed");
            }
        }
        let _ = ignore(self.coordinator.delete(path, Some(version)), CoordinatorError::is_no_node).await;
    }

    async fn handle_stop(&self, path: &str, version: i64) {
        self.worker.stop().await;
        self.wait_for_terminal().await;
        let _ = ignore(self.coordinator.delete(path, Some(version)), CoordinatorError::is_no_node).await;
    }

    async fn wait_for_terminal(&self) {
        let mut rx = self.terminal_rx.clone();
        loop {
            if rx.borrow().map(|s| s.is_terminal()).unwrap_or(false) {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

#[cfg(test)]
#[path = "messages_tests.rs"]
mod tests;
