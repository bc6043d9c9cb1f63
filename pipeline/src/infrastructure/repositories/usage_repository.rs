// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! SQLite [`UsageRepository`].
//!
//! Counters are stored one-per-column rather than as a JSON blob so that
//! [`increment`] can issue a single atomic `UPDATE ... SET col = col + ?`
//! (spec.md §4.8 `Charge`, invariant "Charge atomicity": SQLite serializes
//! writers, so this statement alone is enough — no read-modify-write race
//! is possible between two concurrent callers). The counter name is never
//! interpolated into SQL; it is matched against the six known names to
//! select a fixed statement string.

use async_trait::async_trait;
use evidence_domain::entities::{CounterValues, UsageCounter};
use evidence_domain::error::CoreError;
use evidence_domain::services::UsageRepository;
use evidence_domain::value_objects::{UserId, YearMonth};
use sqlx::{Row, SqlitePool};

use super::db_err;

pub struct SqliteUsageRepository {
    pool: SqlitePool,
}

impl SqliteUsageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn counters_from_row(row: &sqlx::sqlite::SqliteRow) -> CounterValues {
    CounterValues {
        pdf_documents_processed: row.get::<i64, _>("pdf_documents_processed") as u64,
        videos_processed: row.get::<i64, _>("videos_processed") as u64,
        video_hours: row.get::<i64, _>("video_hours") as u64,
        transcription_minutes: row.get::<i64, _>("transcription_minutes") as u64,
        api_calls: row.get::<i64, _>("api_calls") as u64,
        cases_created: row.get::<i64, _>("cases_created") as u64,
    }
}

#[async_trait]
impl UsageRepository for SqliteUsageRepository {
    async fn get_or_create(&self, user_id: UserId, year_month: YearMonth) -> Result<UsageCounter, CoreError> {
        sqlx::query("INSERT OR IGNORE INTO usage_counters (user_id, year_month) VALUES (?, ?)")
            .bind(user_id.to_string())
            .bind(year_month.as_key())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        let row = sqlx::query(
            "SELECT pdf_documents_processed, videos_processed, video_hours, transcription_minutes,
                    api_calls, cases_created
             FROM usage_counters WHERE user_id = ? AND year_month = ?",
        )
        .bind(user_id.to_string())
        .bind(year_month.as_key())
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(UsageCounter { user_id, year_month, counters: counters_from_row(&row) })
    }

    async fn increment(
        &self,
        user_id: UserId,
        year_month: YearMonth,
        counter_name: &str,
        amount: u64,
    ) -> Result<u64, CoreError> {
        self.get_or_create(user_id, year_month.clone()).await?;

        let sql = match counter_name {
            "pdf_documents_processed" => {
                "UPDATE usage_counters SET pdf_documents_processed = pdf_documents_processed + ?
                 WHERE user_id = ? AND year_month = ?
                 RETURNING pdf_documents_processed"
            }
            "videos_processed" => {
                "UPDATE usage_counters SET videos_processed = videos_processed + ?
                 WHERE user_id = ? AND year_month = ?
                 RETURNING videos_processed"
            }
            "video_hours" => {
                "UPDATE usage_counters SET video_hours = video_hours + ?
                 WHERE user_id = ? AND year_month = ?
                 RETURNING video_hours"
            }
            "transcription_minutes" => {
                "UPDATE usage_counters SET transcription_minutes = transcription_minutes + ?
                 WHERE user_id = ? AND year_month = ?
                 RETURNING transcription_minutes"
            }
            "api_calls" => {
                "UPDATE usage_counters SET api_calls = api_calls + ?
                 WHERE user_id = ? AND year_month = ?
                 RETURNING api_calls"
            }
            "cases_created" => {
                "UPDATE usage_counters SET cases_created = cases_created + ?
                 WHERE user_id = ? AND year_month = ?
                 RETURNING cases_created"
            }
            other => return Err(CoreError::internal(format!("unknown usage counter: {other}"))),
        };

        let row = sqlx::query(sql)
            .bind(amount as i64)
            .bind(user_id.to_string())
            .bind(year_month.as_key())
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.get::<i64, usize>(0) as u64)
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

    #[tokio::test]
    async fn get_or_create_starts_at_zero_and_is_idempotent() {
        let repo = SqliteUsageRepository::new(pool().await);
        let user_id = UserId::new();
        let ym = YearMonth::new(2026, 1);

        let first = repo.get_or_create(user_id, ym.clone()).await.unwrap();
        assert_eq!(first.counters.api_calls, 0);

        repo.increment(user_id, ym.clone(), "api_calls", 3).await.unwrap();
        let second = repo.get_or_create(user_id, ym).await.unwrap();
        assert_eq!(second.counters.api_calls, 3);
    }

    #[tokio::test]
    async fn increment_is_additive_and_returns_new_total() {
        let repo = SqliteUsageRepository::new(pool().await);
        let user_id = UserId::new();
        let ym = YearMonth::new(2026, 2);

        let after_first = repo.increment(user_id, ym.clone(), "video_hours", 2).await.unwrap();
        assert_eq!(after_first, 2);

        let after_second = repo.increment(user_id, ym, "video_hours", 5).await.unwrap();
        assert_eq!(after_second, 7);
    }

    #[tokio::test]
    async fn concurrent_increments_are_not_lost() {
        let repo = std::sync::Arc::new(SqliteUsageRepository::new(pool().await));
        let user_id = UserId::new();
        let ym = YearMonth::new(2026, 3);
        repo.get_or_create(user_id, ym.clone()).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..10 {
            let repo = repo.clone();
            let ym = ym.clone();
            handles.push(tokio::spawn(async move {
                repo.increment(user_id, ym, "api_calls", 1).await.unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let total = repo.get_or_create(user_id, ym).await.unwrap();
        assert_eq!(total.counters.api_calls, 10);
    }
}
