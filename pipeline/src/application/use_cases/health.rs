// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `GET /health` (spec.md §4.10, §6.1): folds the Service Registry's
//! per-component readiness into the overall status a load balancer or
//! CLI operator checks first.

use std::collections::BTreeMap;
use std::sync::Arc;

use evidence_domain::services::{ReadinessState, ServiceRegistry};

use crate::application::contracts::{HealthResponse, HealthStatus};

pub struct HealthCheckUseCase {
    registry: Arc<dyn ServiceRegistry>,
}

impl HealthCheckUseCase {
    pub fn new(registry: Arc<dyn ServiceRegistry>) -> Self {
        Self { registry }
    }

    /// A component with no registration entry at all is reported
    /// `Unhealthy` rather than silently omitted — an unregistered
    /// dependency is worse than a draining one. Overall status is the
    /// worst of any component's (`Unhealthy` > `Degraded` > `Healthy`).
    pub fn execute(&self) -> HealthResponse {
        let mut components = BTreeMap::new();
        let mut worst = HealthStatus::Healthy;

        for name in self.registry.registered_names() {
            let status = match self.registry.readiness(&name) {
                Some(ReadinessState::Ready) => HealthStatus::Healthy,
                Some(ReadinessState::Draining) => HealthStatus::Degraded,
                None => HealthStatus::Unhealthy,
            };
            worst = worse_of(worst, status);
            components.insert(name, status);
        }

        HealthResponse { status: worst, components }
    }
}

fn worse_of(a: HealthStatus, b: HealthStatus) -> HealthStatus {
    fn rank(s: HealthStatus) -> u8 {
        match s {
            HealthStatus::Healthy => 0,
            HealthStatus::Degraded => 1,
            HealthStatus::Unhealthy => 2,
        }
    }
    if rank(b) > rank(a) {
        b
    } else {
        a
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::registry::in_memory::InMemoryServiceRegistry;

    #[test]
    fn all_ready_is_healthy() {
        let registry = Arc::new(InMemoryServiceRegistry::new());
        registry.register("content_store");
        registry.register("metadata_store");
        let response = HealthCheckUseCase::new(registry).execute();
        assert_eq!(response.status, HealthStatus::Healthy);
        assert_eq!(response.components.len(), 2);
    }

    #[test]
    fn a_draining_component_degrades_overall_status() {
        let registry = Arc::new(InMemoryServiceRegistry::new());
        registry.register("content_store");
        registry.deregister("content_store");
        let response = HealthCheckUseCase::new(registry).execute();
        assert_eq!(response.status, HealthStatus::Degraded);
    }
}
