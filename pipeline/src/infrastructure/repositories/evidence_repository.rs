// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! SQLite [`EvidenceRepository`].

use super::{db_err, serde_err};
use async_trait::async_trait;
use evidence_domain::entities::Evidence;
use evidence_domain::error::CoreError;
use evidence_domain::services::EvidenceRepository;
use evidence_domain::value_objects::EvidenceId;
use sqlx::SqlitePool;

pub struct SqliteEvidenceRepository {
    pool: SqlitePool,
}

impl SqliteEvidenceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EvidenceRepository for SqliteEvidenceRepository {
    async fn insert(&self, evidence: &Evidence) -> Result<(), CoreError> {
        let data = serde_json::to_string(evidence).map_err(serde_err)?;
        sqlx::query("INSERT INTO evidence (id, owner, data) VALUES (?, ?, ?)")
            .bind(evidence.id.to_string())
            .bind(evidence.owner.to_string())
            .bind(data)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn find_by_id(&self, id: EvidenceId) -> Result<Option<Evidence>, CoreError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT data FROM evidence WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.map(|(data,)| serde_json::from_str(&data).map_err(serde_err)).transpose()
    }

    async fn update(&self, evidence: &Evidence) -> Result<(), CoreError> {
        let data = serde_json::to_string(evidence).map_err(serde_err)?;
        sqlx::query("UPDATE evidence SET owner = ?, data = ? WHERE id = ?")
            .bind(evidence.owner.to_string())
            .bind(data)
            .bind(evidence.id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::repositories::schema::ensure_schema;
    use evidence_domain::value_objects::{sha256_of_parts, DeclaredType, UserId};

    async fn pool() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        ensure_schema(&pool).await.unwrap();
        pool
    }

    fn sample(owner: UserId) -> Evidence {
        Evidence::received(
            owner,
            DeclaredType::Audio,
            sha256_of_parts(&[b"body"]),
            1024,
            "interview.wav",
            "cs/aa/aabbcc",
            None,
            true,
            true,
        )
    }

    #[tokio::test]
    async fn insert_then_find_round_trip() {
        let repo = SqliteEvidenceRepository::new(pool().await);
        let evidence = sample(UserId::new());
        repo.insert(&evidence).await.unwrap();

        let found = repo.find_by_id(evidence.id).await.unwrap().unwrap();
        assert_eq!(found.original_filename, "interview.wav");
        assert_eq!(found.status, evidence_domain::entities::EvidenceStatus::Received);
    }

    #[tokio::test]
    async fn update_persists_status_transition() {
        let repo = SqliteEvidenceRepository::new(pool().await);
        let mut evidence = sample(UserId::new());
        repo.insert(&evidence).await.unwrap();

        evidence.mark_processing();
        repo.update(&evidence).await.unwrap();

        let found = repo.find_by_id(evidence.id).await.unwrap().unwrap();
        assert_eq!(found.status, evidence_domain::entities::EvidenceStatus::Processing);
    }
}
