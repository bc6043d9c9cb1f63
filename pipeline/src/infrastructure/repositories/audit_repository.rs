// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! SQLite [`AuditRepository`].
//!
//! [`append`] assigns the next sequence number within the event's
//! partition inside a transaction so two concurrent appenders to the same
//! partition can never be handed the same sequence (spec.md §4.9,
//! invariant "Audit append-only"). SQLite serializes writers at the
//! connection-pool level, so the read-then-insert pair inside the
//! transaction is race-free.

use super::db_err;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use evidence_domain::entities::{AuditEvent, Subject};
use evidence_domain::error::CoreError;
use evidence_domain::services::AuditRepository;
use evidence_domain::value_objects::{AuditEventId, ContentDigest, EvidenceId, UserId};
use sqlx::{Row, SqlitePool};

pub struct SqliteAuditRepository {
    pool: SqlitePool,
}

impl SqliteAuditRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn subject_columns(subject: &Subject) -> (&'static str, Option<String>, Option<String>) {
    match subject {
        Subject::Evidence { id, content_digest } => {
            ("evidence", Some(id.clone()), content_digest.as_ref().map(|d| d.to_hex()))
        }
        Subject::User { id } => ("user", Some(id.clone()), None),
        Subject::ApiKey { id } => ("api_key", Some(id.clone()), None),
        Subject::None => ("none", None, None),
    }
}

fn subject_from_columns(kind: &str, id: Option<String>, digest: Option<String>) -> Result<Subject, CoreError> {
    Ok(match kind {
        "evidence" => Subject::Evidence {
            id: id.unwrap_or_default(),
            content_digest: digest.map(|d| ContentDigest::from_hex(&d)).transpose()?,
        },
        "user" => Subject::User { id: id.unwrap_or_default() },
        "api_key" => Subject::ApiKey { id: id.unwrap_or_default() },
        _ => Subject::None,
    })
}

fn event_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<AuditEvent, CoreError> {
    let actor: Option<String> = row.get("actor");
    let corrects: Option<String> = row.get("corrects");
    let timestamp: String = row.get("timestamp");

    Ok(AuditEvent {
        id: AuditEventId::parse(&row.get::<String, _>("id"))?,
        sequence: row.get::<i64, _>("sequence") as u64,
        partition: row.get("partition"),
        actor: actor.map(|a| UserId::parse(&a)).transpose()?,
        subject: subject_from_columns(
            &row.get::<String, _>("subject_kind"),
            row.get("subject_id"),
            row.get("subject_content_digest"),
        )?,
        action: row.get("action"),
        outcome: row.get("outcome"),
        request_fingerprint: row.get("request_fingerprint"),
        timestamp: DateTime::parse_from_rfc3339(&timestamp)
            .map_err(|e| CoreError::internal(format!("corrupt audit timestamp: {e}")))?
            .with_timezone(&Utc),
        corrects: corrects.map(|c| AuditEventId::parse(&c)).transpose()?,
    })
}

#[async_trait]
impl AuditRepository for SqliteAuditRepository {
    async fn append(&self, mut event: AuditEvent) -> Result<AuditEvent, CoreError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let next_sequence: i64 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(sequence), 0) + 1 FROM audit_events WHERE partition = ?",
        )
        .bind(&event.partition)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err)?;
        event.sequence = next_sequence as u64;

        let (subject_kind, subject_id, subject_digest) = subject_columns(&event.subject);

        sqlx::query(
            "INSERT INTO audit_events
                (id, partition, sequence, actor, subject_kind, subject_id, subject_content_digest,
                 action, outcome, request_fingerprint, timestamp, corrects)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(event.id.to_string())
        .bind(&event.partition)
        .bind(next_sequence)
        .bind(event.actor.map(|a| a.to_string()))
        .bind(subject_kind)
        .bind(subject_id)
        .bind(subject_digest)
        .bind(&event.action)
        .bind(&event.outcome)
        .bind(&event.request_fingerprint)
        .bind(event.timestamp.to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
        .bind(event.corrects.map(|c| c.to_string()))
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok(event)
    }

    async fn range(&self, from_partition: &str, to_partition: &str) -> Result<Vec<AuditEvent>, CoreError> {
        let rows = sqlx::query(
            "SELECT * FROM audit_events WHERE partition >= ? AND partition <= ?
             ORDER BY partition ASC, sequence ASC",
        )
        .bind(from_partition)
        .bind(to_partition)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(event_from_row).collect()
    }

    async fn for_subject_evidence(&self, evidence_id: EvidenceId) -> Result<Vec<AuditEvent>, CoreError> {
        let rows = sqlx::query(
            "SELECT * FROM audit_events WHERE subject_kind = 'evidence' AND subject_id = ?
             ORDER BY partition ASC, sequence ASC",
        )
        .bind(evidence_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(event_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::repositories::schema::ensure_schema;

    async fn pool() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        ensure_schema(&pool).await.unwrap();
        pool
    }

    fn event(partition: &str, evidence_id: EvidenceId) -> AuditEvent {
        AuditEvent {
            id: AuditEventId::new(),
            sequence: 0,
            partition: partition.to_string(),
            actor: None,
            subject: Subject::Evidence { id: evidence_id.to_string(), content_digest: None },
            action: "ingest".to_string(),
            outcome: "success".to_string(),
            request_fingerprint: None,
            timestamp: Utc::now(),
            corrects: None,
        }
    }

    #[tokio::test]
    async fn append_assigns_increasing_sequence_within_a_partition() {
        let repo = SqliteAuditRepository::new(pool().await);
        let evidence_id = EvidenceId::new();

        let first = repo.append(event("2026-08-01", evidence_id)).await.unwrap();
        let second = repo.append(event("2026-08-01", evidence_id)).await.unwrap();

        assert_eq!(first.sequence, 1);
        assert_eq!(second.sequence, 2);
    }

    #[tokio::test]
    async fn concurrent_appends_to_same_partition_get_distinct_sequences() {
        let repo = std::sync::Arc::new(SqliteAuditRepository::new(pool().await));
        let evidence_id = EvidenceId::new();

        let mut handles = Vec::new();
        for _ in 0..10 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move { repo.append(event("2026-08-01", evidence_id)).await.unwrap() }));
        }
        let mut sequences: Vec<u64> = Vec::new();
        for h in handles {
            sequences.push(h.await.unwrap().sequence);
        }
        sequences.sort_unstable();
        assert_eq!(sequences, (1..=10).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn range_and_for_subject_evidence_return_ordered_events() {
        let repo = SqliteAuditRepository::new(pool().await);
        let evidence_id = EvidenceId::new();
        repo.append(event("2026-08-01", evidence_id)).await.unwrap();
        repo.append(event("2026-08-02", evidence_id)).await.unwrap();

        let ranged = repo.range("2026-08-01", "2026-08-02").await.unwrap();
        assert_eq!(ranged.len(), 2);
        assert_eq!(ranged[0].partition, "2026-08-01");

        let for_evidence = repo.for_subject_evidence(evidence_id).await.unwrap();
        assert_eq!(for_evidence.len(), 2);
    }
}
