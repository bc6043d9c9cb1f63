// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! SQLite schema bootstrap, run once at startup so tests and the binary see
//! a consistent database.

use sqlx::migrate::MigrateDatabase;
use sqlx::{Sqlite, SqlitePool};
use tracing::{debug, info};

pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    debug!("ensuring metadata store schema is up to date");
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("metadata store schema is up to date");
    Ok(())
}

pub async fn create_database_if_missing(database_url: &str) -> Result<(), sqlx::Error> {
    if !Sqlite::database_exists(database_url).await? {
        debug!(database_url, "database does not exist, creating");
        Sqlite::create_database(database_url).await?;
    }
    Ok(())
}

/// Creates the database if needed, connects, and runs migrations —
/// everything a fresh deployment needs to start serving requests.
pub async fn initialize_database(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    create_database_if_missing(database_url).await?;
    let pool = SqlitePool::connect(database_url).await?;
    ensure_schema(&pool).await?;
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn initializes_a_fresh_database_idempotently() {
        let temp = NamedTempFile::new().unwrap();
        let db_url = format!("sqlite://{}", temp.path().display());
        drop(temp);

        let pool = initialize_database(&db_url).await.unwrap();
        ensure_schema(&pool).await.unwrap();
    }
}
