// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! SQLite [`ApiKeyRepository`].

use super::{db_err, serde_err};
use async_trait::async_trait;
use evidence_domain::entities::ApiKey;
use evidence_domain::error::CoreError;
use evidence_domain::services::ApiKeyRepository;
use evidence_domain::value_objects::{ApiKeyId, ContentDigest};
use sqlx::SqlitePool;

pub struct SqliteApiKeyRepository {
    pool: SqlitePool,
}

impl SqliteApiKeyRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApiKeyRepository for SqliteApiKeyRepository {
    async fn insert(&self, key: &ApiKey) -> Result<(), CoreError> {
        let data = serde_json::to_string(key).map_err(serde_err)?;
        sqlx::query("INSERT INTO api_keys (id, owner, key_digest, data) VALUES (?, ?, ?, ?)")
            .bind(key.id.to_string())
            .bind(key.owner.to_string())
            .bind(key.key_digest.to_hex())
            .bind(data)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn find_by_digest(&self, digest: &ContentDigest) -> Result<Option<ApiKey>, CoreError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT data FROM api_keys WHERE key_digest = ?")
            .bind(digest.to_hex())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.map(|(data,)| serde_json::from_str(&data).map_err(serde_err)).transpose()
    }

    async fn find_by_id(&self, id: ApiKeyId) -> Result<Option<ApiKey>, CoreError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT data FROM api_keys WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.map(|(data,)| serde_json::from_str(&data).map_err(serde_err)).transpose()
    }

    async fn update(&self, key: &ApiKey) -> Result<(), CoreError> {
        let data = serde_json::to_string(key).map_err(serde_err)?;
        sqlx::query("UPDATE api_keys SET data = ? WHERE id = ?")
            .bind(data)
            .bind(key.id.to_string())
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
    use evidence_domain::value_objects::UserId;

    async fn pool() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        ensure_schema(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn insert_then_find_by_digest_and_id_round_trip() {
        let repo = SqliteApiKeyRepository::new(pool().await);
        let issued = ApiKey::issue(UserId::new(), "ci key", None);
        repo.insert(&issued.record).await.unwrap();

        let by_digest = repo.find_by_digest(&issued.record.key_digest).await.unwrap().unwrap();
        assert_eq!(by_digest.id, issued.record.id);

        let by_id = repo.find_by_id(issued.record.id).await.unwrap().unwrap();
        assert_eq!(by_id.display_name, "ci key");
    }

    #[tokio::test]
    async fn update_persists_deactivation() {
        let repo = SqliteApiKeyRepository::new(pool().await);
        let mut issued = ApiKey::issue(UserId::new(), "ci key", None);
        repo.insert(&issued.record).await.unwrap();

        issued.record.deactivate();
        repo.update(&issued.record).await.unwrap();

        let reloaded = repo.find_by_id(issued.record.id).await.unwrap().unwrap();
        assert!(!reloaded.active);
    }
}
