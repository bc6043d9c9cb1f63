// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! SQLite [`AnalysisRepository`].
//!
//! `upsert` is keyed on `id`, not `(evidence_id, fingerprint)`: a reprocess
//! creates a new [`AnalysisResult`] with a fresh id, so
//! [`find_by_evidence_id`] always returns the most recently created row
//! (spec.md §4.1 state machine, §4.10 `Reprocess`).

use super::{db_err, serde_err};
use async_trait::async_trait;
use evidence_domain::entities::AnalysisResult;
use evidence_domain::error::CoreError;
use evidence_domain::services::AnalysisRepository;
use evidence_domain::value_objects::{AnalysisId, EvidenceId};
use sqlx::SqlitePool;

pub struct SqliteAnalysisRepository {
    pool: SqlitePool,
}

impl SqliteAnalysisRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnalysisRepository for SqliteAnalysisRepository {
    async fn upsert(&self, analysis: &AnalysisResult) -> Result<(), CoreError> {
        let data = serde_json::to_string(analysis).map_err(serde_err)?;
        sqlx::query(
            "INSERT INTO analysis_results (id, evidence_id, fingerprint, created_at, data)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT (id) DO UPDATE SET data = excluded.data",
        )
        .bind(analysis.id.to_string())
        .bind(analysis.evidence_id.to_string())
        .bind(analysis.fingerprint.to_hex())
        .bind(analysis.created_at.to_rfc3339())
        .bind(data)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn find_by_id(&self, id: AnalysisId) -> Result<Option<AnalysisResult>, CoreError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT data FROM analysis_results WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.map(|(data,)| serde_json::from_str(&data).map_err(serde_err)).transpose()
    }

    async fn find_by_evidence_id(&self, evidence_id: EvidenceId) -> Result<Option<AnalysisResult>, CoreError> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT data FROM analysis_results WHERE evidence_id = ? ORDER BY created_at DESC LIMIT 1",
        )
        .bind(evidence_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.map(|(data,)| serde_json::from_str(&data).map_err(serde_err)).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::repositories::schema::ensure_schema;
    use evidence_domain::value_objects::{sha256_of_parts, AnalyzerProfileVersion, DeclaredType, Fingerprint};

    async fn pool() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        ensure_schema(&pool).await.unwrap();
        pool
    }

    fn fingerprint() -> Fingerprint {
        let digest = sha256_of_parts(&[b"body"]);
        Fingerprint::compute(&digest, DeclaredType::Audio, &AnalyzerProfileVersion::new("2026-01"), None)
    }

    #[tokio::test]
    async fn upsert_then_find_by_id_round_trip() {
        let repo = SqliteAnalysisRepository::new(pool().await);
        let evidence_id = EvidenceId::new();
        let analysis = AnalysisResult::pending(evidence_id, fingerprint(), AnalyzerProfileVersion::new("2026-01"));
        repo.upsert(&analysis).await.unwrap();

        let found = repo.find_by_id(analysis.id).await.unwrap().unwrap();
        assert_eq!(found.evidence_id, evidence_id);
    }

    #[tokio::test]
    async fn find_by_evidence_id_returns_most_recent_reprocess() {
        let repo = SqliteAnalysisRepository::new(pool().await);
        let evidence_id = EvidenceId::new();

        let first = AnalysisResult::pending(evidence_id, fingerprint(), AnalyzerProfileVersion::new("2026-01"));
        repo.upsert(&first).await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let second = AnalysisResult::pending(evidence_id, fingerprint(), AnalyzerProfileVersion::new("2026-01"));
        repo.upsert(&second).await.unwrap();

        let found = repo.find_by_evidence_id(evidence_id).await.unwrap().unwrap();
        assert_eq!(found.id, second.id);
    }

    #[tokio::test]
    async fn upsert_is_idempotent_on_repeated_id() {
        let repo = SqliteAnalysisRepository::new(pool().await);
        let evidence_id = EvidenceId::new();
        let mut analysis = AnalysisResult::pending(evidence_id, fingerprint(), AnalyzerProfileVersion::new("2026-01"));
        repo.upsert(&analysis).await.unwrap();

        analysis.executive_summary = "updated".into();
        repo.upsert(&analysis).await.unwrap();

        let found = repo.find_by_id(analysis.id).await.unwrap().unwrap();
        assert_eq!(found.executive_summary, "updated");
    }
}
