// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Rolling-window [`MetricsCollector`]. Each operation keeps its most recent
//! `max_samples` durations; call/error counts are cumulative and are not
//! trimmed with the window.

use evidence_domain::services::{MetricsCollector, MetricsSnapshot, OperationSnapshot};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::time::Duration;

const DEFAULT_MAX_SAMPLES: usize = 500;

#[derive(Default)]
struct OperationStats {
    durations: VecDeque<Duration>,
    call_count: u64,
    error_count: u64,
}

pub struct RollingWindowMetrics {
    max_samples: usize,
    operations: RwLock<HashMap<String, OperationStats>>,
    counters: RwLock<HashMap<String, u64>>,
}

impl RollingWindowMetrics {
    pub fn new() -> Self {
        Self::with_window(DEFAULT_MAX_SAMPLES)
    }

    pub fn with_window(max_samples: usize) -> Self {
        Self { max_samples, operations: RwLock::new(HashMap::new()), counters: RwLock::new(HashMap::new()) }
    }

    fn percentile_ms(sorted_ms: &[u64], p: f64) -> u64 {
        if sorted_ms.is_empty() {
            return 0;
        }
        let rank = ((p * sorted_ms.len() as f64).ceil() as usize).clamp(1, sorted_ms.len());
        sorted_ms[rank - 1]
    }
}

impl Default for RollingWindowMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCollector for RollingWindowMetrics {
    fn record_duration(&self, operation: &str, duration: Duration, is_error: bool) {
        let mut operations = self.operations.write();
        let stats = operations.entry(operation.to_string()).or_default();
        stats.durations.push_back(duration);
        while stats.durations.len() > self.max_samples {
            stats.durations.pop_front();
        }
        stats.call_count += 1;
        if is_error {
            stats.error_count += 1;
        }
    }

    fn increment_counter(&self, name: &str, by: u64) {
        *self.counters.write().entry(name.to_string()).or_insert(0) += by;
    }

    fn snapshot(&self) -> MetricsSnapshot {
        let operations = self.operations.read();
        let mut snapshot_ops = BTreeMap::new();
        for (name, stats) in operations.iter() {
            let mut millis: Vec<u64> = stats.durations.iter().map(|d| d.as_millis() as u64).collect();
            millis.sort_unstable();
            snapshot_ops.insert(
                name.clone(),
                OperationSnapshot {
                    call_count: stats.call_count,
                    error_count: stats.error_count,
                    p50_ms: Self::percentile_ms(&millis, 0.50),
                    p95_ms: Self::percentile_ms(&millis, 0.95),
                    p99_ms: Self::percentile_ms(&millis, 0.99),
                },
            );
        }

        let counters = self.counters.read().iter().map(|(k, v)| (k.clone(), *v)).collect();
        MetricsSnapshot { operations: snapshot_ops, counters }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_across_calls() {
        let metrics = RollingWindowMetrics::new();
        metrics.increment_counter("pdf_documents_processed", 1);
        metrics.increment_counter("pdf_documents_processed", 2);
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.counters.get("pdf_documents_processed"), Some(&3));
    }

    #[test]
    fn percentiles_reflect_recorded_durations() {
        let metrics = RollingWindowMetrics::new();
        for ms in [10, 20, 30, 40, 100] {
            metrics.record_duration("ingest", Duration::from_millis(ms), false);
        }
        let snapshot = metrics.snapshot();
        let op = snapshot.operations.get("ingest").unwrap();
        assert_eq!(op.call_count, 5);
        assert_eq!(op.error_count, 0);
        assert_eq!(op.p50_ms, 30);
        assert_eq!(op.p99_ms, 100);
    }

    #[test]
    fn window_evicts_oldest_samples_beyond_capacity() {
        let metrics = RollingWindowMetrics::with_window(3);
        for ms in [10, 20, 30, 40] {
            metrics.record_duration("ingest", Duration::from_millis(ms), false);
        }
        let snapshot = metrics.snapshot();
        let op = snapshot.operations.get("ingest").unwrap();
        // call_count is cumulative even though the window holds only 3 samples.
        assert_eq!(op.call_count, 4);
        assert_eq!(op.p99_ms, 40);
    }

    #[test]
    fn error_count_tracks_failed_calls() {
        let metrics = RollingWindowMetrics::new();
        metrics.record_duration("ingest", Duration::from_millis(5), false);
        metrics.record_duration("ingest", Duration::from_millis(5), true);
        let snapshot = metrics.snapshot();
        let op = snapshot.operations.get("ingest").unwrap();
        assert_eq!(op.call_count, 2);
        assert_eq!(op.error_count, 1);
    }
}
