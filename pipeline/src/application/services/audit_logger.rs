// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Chain-of-Custody & Audit Logger (spec.md §4.9).

use evidence_domain::entities::{AuditEvent, Subject};
use evidence_domain::error::CoreError;
use evidence_domain::services::AuditRepository;
use evidence_domain::value_objects::{AuditEventId, ContentDigest, EvidenceId, UserId, sha256_of_parts};
use std::sync::Arc;

pub struct AuditLogger {
    repository: Arc<dyn AuditRepository>,
}

impl AuditLogger {
    pub fn new(repository: Arc<dyn AuditRepository>) -> Self {
        Self { repository }
    }

    /// Appends one event, assigning it a sequence number scoped to its
    /// calendar-day partition (spec.md §4.9). The repository is the
    /// only place that knows the next sequence value for a partition;
    /// this method passes `sequence = 0` as a placeholder the
    /// repository is expected to overwrite atomically on insert.
    pub async fn append(
        &self,
        actor: Option<UserId>,
        subject: Subject,
        action: impl Into<String>,
        outcome: impl Into<String>,
        request_fingerprint: Option<String>,
    ) -> Result<AuditEvent, CoreError> {
        let now = chrono::Utc::now();
        let event = AuditEvent {
            id: AuditEventId::new(),
            sequence: 0,
            partition: AuditEvent::partition_for(now),
            actor,
            subject,
            action: action.into(),
            outcome: outcome.into(),
            request_fingerprint,
            timestamp: now,
            corrects: None,
        };
        self.repository.append(event).await
    }

    pub async fn append_evidence_event(
        &self,
        actor: Option<UserId>,
        evidence_id: EvidenceId,
        content_digest: Option<ContentDigest>,
        action: impl Into<String>,
        outcome: impl Into<String>,
    ) -> Result<AuditEvent, CoreError> {
        self.append(
            actor,
            Subject::Evidence { id: evidence_id.to_string(), content_digest },
            action,
            outcome,
            None,
        )
        .await
    }

    /// Records a correction that never mutates the original row
    /// (spec.md §4.9: "corrections are new events whose action name is
    /// `correction`").
    pub async fn correct(&self, original: AuditEventId, reason: impl Into<String>) -> Result<AuditEvent, CoreError> {
        let now = chrono::Utc::now();
        let event = AuditEvent {
            id: AuditEventId::new(),
            sequence: 0,
            partition: AuditEvent::partition_for(now),
            actor: None,
            subject: Subject::None,
            action: "correction".to_string(),
            outcome: reason.into(),
            request_fingerprint: None,
            timestamp: now,
            corrects: Some(original),
        };
        self.repository.append(event).await
    }

    /// Returns events in `[from_partition, to_partition]`, deterministically
    /// ordered, together with a digest over their canonical bytes that
    /// downstream tooling may re-compute (spec.md §4.9 `verify`).
    pub async fn verify(&self, from_partition: &str, to_partition: &str) -> Result<(Vec<AuditEvent>, ContentDigest), CoreError> {
        let mut events = self.repository.range(from_partition, to_partition).await?;
        events.sort_by(|a, b| a.partition.cmp(&b.partition).then_with(|| a.sequence.cmp(&b.sequence)));
        let parts: Vec<Vec<u8>> = events.iter().map(|e| e.canonical_bytes()).collect();
        let part_refs: Vec<&[u8]> = parts.iter().map(|p| p.as_slice()).collect();
        let digest = sha256_of_parts(&part_refs);
        Ok((events, digest))
    }

    pub async fn chain_for_evidence(&self, evidence_id: EvidenceId) -> Result<Vec<AuditEvent>, CoreError> {
        let mut events = self.repository.for_subject_evidence(evidence_id).await?;
        events.sort_by(|a, b| a.partition.cmp(&b.partition).then_with(|| a.sequence.cmp(&b.sequence)));
        Ok(events)
    }
}
