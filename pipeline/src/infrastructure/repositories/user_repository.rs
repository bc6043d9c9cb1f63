// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! SQLite [`UserRepository`].

use super::{db_err, serde_err};
use async_trait::async_trait;
use evidence_domain::entities::User;
use evidence_domain::error::CoreError;
use evidence_domain::services::UserRepository;
use evidence_domain::value_objects::UserId;
use sqlx::SqlitePool;

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn insert(&self, user: &User) -> Result<(), CoreError> {
        let data = serde_json::to_string(user).map_err(serde_err)?;
        sqlx::query("INSERT INTO users (id, email, data) VALUES (?, ?, ?)")
            .bind(user.id.to_string())
            .bind(&user.email)
            .bind(data)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, CoreError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT data FROM users WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.map(|(data,)| serde_json::from_str(&data).map_err(serde_err)).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, CoreError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT data FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.map(|(data,)| serde_json::from_str(&data).map_err(serde_err)).transpose()
    }

    async fn update(&self, user: &User) -> Result<(), CoreError> {
        let data = serde_json::to_string(user).map_err(serde_err)?;
        sqlx::query("UPDATE users SET email = ?, data = ? WHERE id = ?")
            .bind(&user.email)
            .bind(data)
            .bind(user.id.to_string())
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
    use evidence_domain::entities::PasswordVerifier;
    use evidence_domain::value_objects::Tier;

    async fn pool() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        ensure_schema(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn insert_then_find_by_id_and_email_round_trip() {
        let repo = SqliteUserRepository::new(pool().await);
        let user = User::new("jane@example.com", PasswordVerifier::from_hash("hash".into()), Tier::Starter);
        repo.insert(&user).await.unwrap();

        let by_id = repo.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "jane@example.com");

        let by_email = repo.find_by_email("jane@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
    }

    #[tokio::test]
    async fn update_persists_tier_changes() {
        let repo = SqliteUserRepository::new(pool().await);
        let mut user = User::new("jane@example.com", PasswordVerifier::from_hash("hash".into()), Tier::Free);
        repo.insert(&user).await.unwrap();

        user.tier = Tier::Professional;
        repo.update(&user).await.unwrap();

        let reloaded = repo.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(reloaded.tier, Tier::Professional);
    }

    #[tokio::test]
    async fn unknown_id_is_none_not_an_error() {
        let repo = SqliteUserRepository::new(pool().await);
        assert!(repo.find_by_id(UserId::new()).await.unwrap().is_none());
    }
}
