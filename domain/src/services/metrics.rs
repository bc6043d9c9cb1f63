// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Metrics Collector port (spec.md §2, §4.10): per-operation call-count,
//! error-count, and p50/p95/p99 durations over a rolling window.

use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct OperationSnapshot {
    pub call_count: u64,
    pub error_count: u64,
    pub p50_ms: u64,
    pub p95_ms: u64,
    pub p99_ms: u64,
}

#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    pub operations: std::collections::BTreeMap<String, OperationSnapshot>,
    pub counters: std::collections::BTreeMap<String, u64>,
}

pub trait MetricsCollector: Send + Sync {
    fn record_duration(&self, operation: &str, duration: Duration, is_error: bool);
    fn increment_counter(&self, name: &str, by: u64);
    fn snapshot(&self) -> MetricsSnapshot;
}
