// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Discovery registry payload: a service name and the endpoint advertising it.

use serde::{Deserialize, Serialize};

/// A service-name + network endpoint tuple advertised via the discovery
/// registry. `service` scopes the registration to a child path of the
/// discovery namespace; `hostname`/`port` are opaque to the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Discoverable {
    pub service: String,
    pub hostname: String,
    pub port: u16,
}

impl Discoverable {
    pub fn new(service: impl Into<String>, hostname: impl Into<String>, port: u16) -> Self {
        Self { service: service.into(), hostname: hostname.into(), port }
    }
}

#[cfg(test)]
#[path = "discoverable_tests.rs"]
mod tests;
