// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Event Bus port (spec.md §2, §4.10, §5). `publish` is non-blocking and
//! best-effort; delivery is at-most-once, unordered across subscribers,
//! ordered per subscriber for a given publisher. Handler panics/errors are
//! caught and logged, never surfaced to the publisher.

use crate::events::DomainEvent;
use async_trait::async_trait;
use std::sync::Arc;

pub type EventHandler = Arc<dyn Fn(&DomainEvent) + Send + Sync>;

#[async_trait]
pub trait EventBus: Send + Sync {
    fn publish(&self, event: DomainEvent);
    fn subscribe(&self, event_name: &str, handler: EventHandler);
}
