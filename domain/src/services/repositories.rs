// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Metadata Store repository ports (spec.md §2, §3). The Metadata Store is
//! the single writer of durable state (spec.md §5); every component
//! reaches it exclusively through these traits.

use crate::entities::{ApiKey, AuditEvent, Evidence, UsageCounter, User};
use crate::error::CoreError;
use crate::value_objects::{AnalysisId, ApiKeyId, ContentDigest, EvidenceId, UserId, YearMonth};
use async_trait::async_trait;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: &User) -> Result<(), CoreError>;
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, CoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, CoreError>;
    async fn update(&self, user: &User) -> Result<(), CoreError>;
}

#[async_trait]
pub trait ApiKeyRepository: Send + Sync {
    async fn insert(&self, key: &ApiKey) -> Result<(), CoreError>;
    async fn find_by_digest(&self, digest: &ContentDigest) -> Result<Option<ApiKey>, CoreError>;
    async fn find_by_id(&self, id: ApiKeyId) -> Result<Option<ApiKey>, CoreError>;
    async fn update(&self, key: &ApiKey) -> Result<(), CoreError>;
}

#[async_trait]
pub trait EvidenceRepository: Send + Sync {
    async fn insert(&self, evidence: &Evidence) -> Result<(), CoreError>;
    async fn find_by_id(&self, id: EvidenceId) -> Result<Option<Evidence>, CoreError>;
    async fn update(&self, evidence: &Evidence) -> Result<(), CoreError>;
}

#[async_trait]
pub trait AnalysisRepository: Send + Sync {
    async fn upsert(&self, analysis: &crate::entities::AnalysisResult) -> Result<(), CoreError>;
    async fn find_by_id(&self, id: AnalysisId) -> Result<Option<crate::entities::AnalysisResult>, CoreError>;
    async fn find_by_evidence_id(
        &self,
        evidence_id: EvidenceId,
    ) -> Result<Option<crate::entities::AnalysisResult>, CoreError>;
}

#[async_trait]
pub trait UsageRepository: Send + Sync {
    async fn get_or_create(&self, user_id: UserId, year_month: YearMonth) -> Result<UsageCounter, CoreError>;

    /// Atomically increments `counter_name` by `amount` for the given
    /// user/month (spec.md §4.8 `Charge`, §5: "MUST use a single atomic
    /// increment"). Returns the counter value *after* the increment.
    async fn increment(
        &self,
        user_id: UserId,
        year_month: YearMonth,
        counter_name: &str,
        amount: u64,
    ) -> Result<u64, CoreError>;
}

#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// Appends one event, assigning it the next sequence number within
    /// its partition (spec.md §4.9). Implementations MUST make this
    /// atomic with respect to concurrent appenders in the same partition.
    async fn append(&self, event: AuditEvent) -> Result<AuditEvent, CoreError>;

    /// Returns events in a partition range, deterministically ordered by
    /// `(partition, sequence)` ascending (spec.md §4.9 `verify`).
    async fn range(&self, from_partition: &str, to_partition: &str) -> Result<Vec<AuditEvent>, CoreError>;

    async fn for_subject_evidence(&self, evidence_id: EvidenceId) -> Result<Vec<AuditEvent>, CoreError>;
}
