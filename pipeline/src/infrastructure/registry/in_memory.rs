// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! In-process [`ServiceRegistry`] (spec.md §4.10): registration is
//! idempotent; `deregister` marks an instance draining rather than removing
//! it, so in-flight lookups still resolve during shutdown.

use evidence_domain::services::{ReadinessState, ServiceRegistry};
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Default)]
pub struct InMemoryServiceRegistry {
    entries: RwLock<HashMap<String, ReadinessState>>,
}

impl InMemoryServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ServiceRegistry for InMemoryServiceRegistry {
    fn register(&self, name: &str) {
        self.entries.write().insert(name.to_string(), ReadinessState::Ready);
    }

    fn deregister(&self, name: &str) {
        if let Some(state) = self.entries.write().get_mut(name) {
            *state = ReadinessState::Draining;
        }
    }

    fn readiness(&self, name: &str) -> Option<ReadinessState> {
        self.entries.read().get(name).copied()
    }

    fn registered_names(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_is_idempotent_and_readiness_starts_ready() {
        let registry = InMemoryServiceRegistry::new();
        registry.register("cache");
        registry.register("cache");
        assert_eq!(registry.readiness("cache"), Some(ReadinessState::Ready));
        assert_eq!(registry.registered_names(), vec!["cache".to_string()]);
    }

    #[test]
    fn deregister_marks_draining_without_removing_the_entry() {
        let registry = InMemoryServiceRegistry::new();
        registry.register("queue");
        registry.deregister("queue");
        assert_eq!(registry.readiness("queue"), Some(ReadinessState::Draining));
        assert!(registry.registered_names().contains(&"queue".to_string()));
    }

    #[test]
    fn unknown_service_has_no_readiness() {
        let registry = InMemoryServiceRegistry::new();
        assert_eq!(registry.readiness("missing"), None);
    }
}
