// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! In-process [`EventBus`] (spec.md §4.10): `publish` dispatches
//! synchronously to every handler subscribed to the event's name, catching
//! handler panics so one bad subscriber never breaks the publisher.

use evidence_domain::events::DomainEvent;
use evidence_domain::services::{EventBus, EventHandler};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

#[derive(Default)]
pub struct InMemoryEventBus {
    subscribers: RwLock<HashMap<String, Vec<EventHandler>>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventBus for InMemoryEventBus {
    fn publish(&self, event: DomainEvent) {
        let handlers = {
            let subscribers = self.subscribers.read();
            subscribers.get(event.name()).cloned().unwrap_or_default()
        };
        for handler in handlers {
            if catch_unwind(AssertUnwindSafe(|| handler(&event))).is_err() {
                tracing::warn!(event = event.name(), "event bus handler panicked");
            }
        }
    }

    fn subscribe(&self, event_name: &str, handler: EventHandler) {
        self.subscribers.write().entry(event_name.to_string()).or_default().push(handler);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evidence_domain::value_objects::{ContentDigest, EvidenceId};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn delivers_to_subscribers_of_the_matching_name_only() {
        let bus = InMemoryEventBus::new();
        let matched = Arc::new(AtomicUsize::new(0));
        let unmatched = Arc::new(AtomicUsize::new(0));

        let matched_clone = matched.clone();
        bus.subscribe("evidence.ingested", Arc::new(move |_| { matched_clone.fetch_add(1, Ordering::SeqCst); }));
        let unmatched_clone = unmatched.clone();
        bus.subscribe("evidence.processed", Arc::new(move |_| { unmatched_clone.fetch_add(1, Ordering::SeqCst); }));

        bus.publish(DomainEvent::EvidenceIngested {
            evidence_id: EvidenceId::new(),
            content_digest: ContentDigest::of(b"x"),
            byte_size: 1,
        });

        assert_eq!(matched.load(Ordering::SeqCst), 1);
        assert_eq!(unmatched.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn a_panicking_handler_does_not_stop_later_handlers() {
        let bus = InMemoryEventBus::new();
        let ran = Arc::new(AtomicUsize::new(0));
        bus.subscribe("evidence.ingested", Arc::new(|_| panic!("boom")));
        let ran_clone = ran.clone();
        bus.subscribe("evidence.ingested", Arc::new(move |_| { ran_clone.fetch_add(1, Ordering::SeqCst); }));

        bus.publish(DomainEvent::EvidenceIngested {
            evidence_id: EvidenceId::new(),
            content_digest: ContentDigest::of(b"x"),
            byte_size: 1,
        });

        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }
}
