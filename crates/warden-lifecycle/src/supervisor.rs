// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Orchestrates the live node, state publisher, and command listener
//! around a hosted worker's own state machine. Generic over the worker
//! type the way `Runtime<A, N, C>` is generic over its adapters.
//!
//! The worker's listener calls are synchronous and must return quickly,
//! so they only enqueue a [`WorkerEvent`] onto a channel; a single task
//! drains that channel and runs the actual coordinator I/O, which keeps
//! transitions in the order the worker's own state machine produced them
//! and avoids re-entrancy into the worker from inside a listener call.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use warden_core::{LifecycleState, MessageCallback, RunId, Service, ServiceError, ServiceListener, StateNode};
use warden_coordinator::{recursive_delete, CoordinatorClient, CreateMode};

use crate::error::SupervisorError;
use crate::live::LiveNode;
use crate::messages::CommandListener;
use crate::state::StatePublisher;

/// An optional hook that runs exactly once on either terminal branch.
/// Its failure is logged but never changes the reported terminal state.
#[async_trait]
pub trait Finalizer: Send + Sync + 'static {
    async fn run(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

enum WorkerEvent {
    Starting,
    Running,
    Stopping,
    Terminated,
    Failed(ServiceError),
}

struct SupervisorListener {
    events: mpsc::UnboundedSender<WorkerEvent>,
}

impl ServiceListener for SupervisorListener {
    fn starting(&self) {
        let _ = self.events.send(WorkerEvent::Starting);
    }

    fn running(&self) {
        let _ = self.events.send(WorkerEvent::Running);
    }

    fn stopping(&self) {
        let _ = self.events.send(WorkerEvent::Stopping);
    }

    fn terminated(&self, _from: LifecycleState) {
        let _ = self.events.send(WorkerEvent::Terminated);
    }

    fn failed(&self, _from: LifecycleState, cause: ServiceError) {
        let _ = self.events.send(WorkerEvent::Failed(cause));
    }
}

pub struct Supervisor<W: Service> {
    coordinator: Arc<dyn CoordinatorClient>,
    run_id: RunId,
    worker: Arc<W>,
    live: LiveNode,
    publisher: StatePublisher,
    state_tx: watch::Sender<Option<LifecycleState>>,
    cancellation: CancellationToken,
    message_callback: Option<Arc<dyn MessageCallback>>,
    live_payload: Value,
    terminal_latch: AtomicBool,
    failure_cause: Mutex<Option<String>>,
    finalizer: Mutex<Option<Arc<dyn Finalizer>>>,
    event_task: Mutex<Option<JoinHandle<()>>>,
    listener_task: Mutex<Option<JoinHandle<()>>>,
}

impl<W: Service> Supervisor<W> {
    pub fn new(
        coordinator: Arc<dyn CoordinatorClient>,
        run_id: RunId,
        worker: Arc<W>,
        live_payload: Value,
        message_callback: Option<Arc<dyn MessageCallback>>,
    ) -> Arc<Self> {
        let coordinator_failure = Arc::new(AtomicBool::new(false));
        let (state_tx, _) = watch::channel(None);
        let live = LiveNode::new(coordinator.clone(), run_id.live_path());
        let publisher = StatePublisher::new(coordinator.clone(), run_id.state_path(), coordinator_failure);

        Arc::new(Self {
            coordinator,
            run_id,
            worker,
            live,
            publisher,
            state_tx,
            cancellation: CancellationToken::new(),
            message_callback,
            live_payload,
            terminal_latch: AtomicBool::new(false),
            failure_cause: Mutex::new(None),
            finalizer: Mutex::new(None),
            event_task: Mutex::new(None),
            listener_task: Mutex::new(None),
        })
    }

    /// Install a finalizer to run exactly once when a terminal state is
    /// reached. Replaces any previously installed finalizer.
    pub fn set_finalizer(&self, finalizer: Arc<dyn Finalizer>) {
        *self.finalizer.lock() = Some(finalizer);
    }

    /// Subscribe to this instance's lifecycle notifications. Every
    /// transition the worker makes (as observed by this supervisor) is
    /// published here, including the two terminal states.
    pub fn notifications(&self) -> watch::Receiver<Option<LifecycleState>> {
        self.state_tx.subscribe()
    }

    /// The cause of a FAILED transition, if the most recent terminal
    /// transition was a failure.
    pub fn failure_cause(&self) -> Option<String> {
        self.failure_cause.lock().clone()
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    /// Create the live node, (re-)create this instance's namespace, attach
    /// our listener to the worker, and start it.
    pub async fn start(self: &Arc<Self>) -> Result<(), SupervisorError> {
        self.live.create(self.live_payload.clone()).await?;
        self.recreate_namespace().await?;

        let (tx, mut rx) = mpsc::unbounded_channel();
        let listener: Arc<dyn ServiceListener> = Arc::new(SupervisorListener { events: tx });
        self.worker.add_listener(listener);

        let supervisor = self.clone();
        let handle = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                supervisor.handle_event(event).await;
            }
        });
        *self.event_task.lock() = Some(handle);

        self.worker.start().await;
        Ok(())
    }

    /// Any pre-existing children under this run's namespace are removed
    /// and the state/messages nodes are re-created fresh.
    async fn recreate_namespace(&self) -> Result<(), SupervisorError> {
        recursive_delete(self.coordinator.as_ref(), &self.run_id.root_path()).await?;
        self.coordinator
            .create(
                &self.run_id.state_path(),
                warden_codec::encode_state_node(&StateNode::new(LifecycleState::Starting)),
                CreateMode::Persistent,
                true,
            )
            .await?;
        self.coordinator
            .create(&self.run_id.messages_path(), Vec::new(), CreateMode::Persistent, true)
            .await?;
        Ok(())
    }

    /// Forward an external stop request to the worker; the terminal
    /// branches drive the rest.
    pub async fn stop(&self) {
        self.worker.stop().await;
    }

    fn spawn_command_listener(self: &Arc<Self>) {
        let listener = CommandListener::new(
            self.coordinator.clone(),
            self.run_id.messages_path(),
            self.worker.clone(),
            self.message_callback.clone(),
            self.state_tx.subscribe(),
            self.cancellation.clone(),
        );
        let handle = tokio::spawn(async move { listener.run().await });
        *self.listener_task.lock() = Some(handle);
    }

    /// Processes exactly one worker-reported transition. Events are
    /// drained strictly in arrival order, so this never runs concurrently
    /// with itself for the same instance.
    async fn handle_event(self: &Arc<Self>, event: WorkerEvent) {
        match event {
            WorkerEvent::Starting => self.publish(LifecycleState::Starting).await,
            WorkerEvent::Running => {
                self.publish(LifecycleState::Running).await;
                if !self.terminal_latch.load(Ordering::SeqCst) {
                    self.spawn_command_listener();
                }
            }
            WorkerEvent::Stopping => self.publish(LifecycleState::Stopping).await,
            WorkerEvent::Terminated => self.teardown(LifecycleState::Terminated, None).await,
            WorkerEvent::Failed(cause) => self.teardown(LifecycleState::Failed, Some(cause)).await,
        }
    }

    /// Write `state` to the coordinator and notify local subscribers. A
    /// write failure latches `coordinator_failure`, forces the worker to
    /// stop, and reports FAILED upward without waiting for the worker's
    /// own terminal notification to arrive.
    ///
    /// No-ops once a terminal state has already been latched, so a
    /// non-terminal event still sitting in the queue from before teardown
    /// ran can't overwrite the terminal notification with a stale value.
    async fn publish(self: &Arc<Self>, state: LifecycleState) {
        if self.terminal_latch.load(Ordering::SeqCst) || self.publisher.coordinator_failure() {
            return;
        }
        let _ = self.state_tx.send(Some(state));
        if let Err(err) = self.publisher.publish(StateNode::new(state)).await {
            tracing::warn!(error = %err, run_id = %self.run_id, "coordinator write failed, forcing shutdown");
            self.force_fail(err.to_string()).await;
        }
    }

    async fn force_fail(self: &Arc<Self>, cause: String) {
        self.teardown(LifecycleState::Failed, Some(Box::<dyn std::error::Error + Send + Sync>::from(cause)))
            .await;
        let worker = self.worker.clone();
        tokio::spawn(async move { worker.stop().await });
    }

    /// Runs exactly once per instance, on whichever terminal branch gets
    /// there first.
    async fn teardown(&self, state: LifecycleState, error: Option<ServiceError>) {
        if self.terminal_latch.swap(true, Ordering::SeqCst) {
            return;
        }
        self.cancellation.cancel();

        if let Some(cause) = &error {
            *self.failure_cause.lock() = Some(cause.to_string());
        }

        if !self.publisher.coordinator_failure() {
            let _ = self.live.remove().await;
            let _ = recursive_delete(self.coordinator.as_ref(), &self.run_id.root_path()).await;
        }

        let _ = self.state_tx.send(Some(state));

        let finalizer = self.finalizer.lock().clone();
        if let Some(finalizer) = finalizer {
            if let Err(err) = finalizer.run().await {
                tracing::warn!(error = %err, run_id = %self.run_id, "finalizer failed");
            }
        }
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
