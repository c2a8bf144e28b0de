// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Decorates a hosted [`warden_core::Service`] so its lifecycle is
//! reflected into a coordination store: a live presence marker
//! ([`live`]), state publication on every transition ([`state`]), an
//! inbound command channel ([`messages`]), and the orchestrator that ties
//! them together around the worker's own state machine ([`supervisor`]).
//! [`shutdown`] offers an opt-in process-scope shutdown hook.

pub mod error;
pub mod live;
pub mod messages;
pub mod shutdown;
pub mod state;
pub mod supervisor;

pub use error::{PublishError, SupervisorError};
pub use live::LiveNode;
pub use messages::CommandListener;
pub use state::StatePublisher;
pub use supervisor::{Finalizer, Supervisor};
