// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Token-bucket [`RateLimiterPort`] (spec.md §4.8, §5: "per-bucket lock is
//! never held across I/O"). One bucket per `(user, operation class)`,
//! sized from the caller's [`TierPolicy`] the first time that pair is seen.

use crate::application::services::{RateLimiterPort, TierPolicy};
use evidence_domain::entities::RateBucket;
use evidence_domain::services::Clock;
use evidence_domain::value_objects::UserId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

pub struct TokenBucketRateLimiter {
    clock: Arc<dyn Clock>,
    buckets: Mutex<HashMap<(UserId, String), RateBucket>>,
}

impl TokenBucketRateLimiter {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock, buckets: Mutex::new(HashMap::new()) }
    }
}

impl RateLimiterPort for TokenBucketRateLimiter {
    fn try_consume(&self, user_id: UserId, operation_class: &str, policy: &TierPolicy) -> (bool, u64) {
        let now = self.clock.now();
        let mut buckets = self.buckets.lock();
        let bucket = buckets
            .entry((user_id, operation_class.to_string()))
            .or_insert_with(|| RateBucket::new(policy.rate_capacity, policy.rate_refill_per_second, now));
        let granted = bucket.try_consume(now);
        let retry_after = if granted { 0 } else { bucket.retry_after_secs() };
        (granted, retry_after)
    }

    fn peek(&self, user_id: UserId, operation_class: &str, policy: &TierPolicy) -> (f64, f64) {
        let now = self.clock.now();
        let mut buckets = self.buckets.lock();
        let bucket = buckets
            .entry((user_id, operation_class.to_string()))
            .or_insert_with(|| RateBucket::new(policy.rate_capacity, policy.rate_refill_per_second, now));
        (bucket.peek(now), policy.rate_capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evidence_domain::services::SystemClock;
    use std::collections::HashMap as StdHashMap;

    fn policy(capacity: f64, refill: f64) -> TierPolicy {
        TierPolicy {
            rate_capacity: capacity,
            rate_refill_per_second: refill,
            monthly_limits: StdHashMap::new(),
            feature_flags: Vec::new(),
        }
    }

    #[test]
    fn grants_up_to_capacity_then_denies() {
        let limiter = TokenBucketRateLimiter::new(Arc::new(SystemClock::new()));
        let policy = policy(2.0, 0.0);
        let user = UserId::new();
        assert!(limiter.try_consume(user, "ingest", &policy).0);
        assert!(limiter.try_consume(user, "ingest", &policy).0);
        let (granted, _retry_after) = limiter.try_consume(user, "ingest", &policy);
        assert!(!granted);
    }

    #[test]
    fn distinct_operation_classes_have_independent_buckets() {
        let limiter = TokenBucketRateLimiter::new(Arc::new(SystemClock::new()));
        let policy = policy(1.0, 0.0);
        let user = UserId::new();
        assert!(limiter.try_consume(user, "ingest", &policy).0);
        assert!(limiter.try_consume(user, "process", &policy).0);
    }

    #[test]
    fn peek_reports_without_consuming() {
        let limiter = TokenBucketRateLimiter::new(Arc::new(SystemClock::new()));
        let policy = policy(3.0, 0.0);
        let user = UserId::new();
        let (remaining, capacity) = limiter.peek(user, "ingest", &policy);
        assert_eq!(remaining, 3.0);
        assert_eq!(capacity, 3.0);
        // Peeking never consumes a token.
        let (remaining_again, _) = limiter.peek(user, "ingest", &policy);
        assert_eq!(remaining_again, 3.0);
        assert!(limiter.try_consume(user, "ingest", &policy).0);
        let (after_consume, _) = limiter.peek(user, "ingest", &policy);
        assert_eq!(after_consume, 2.0);
    }
}
