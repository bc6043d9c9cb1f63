// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! SQLite-backed Metadata Store repositories (spec.md §2, §3). Every
//! non-scalar entity is persisted as a JSON document in a `data` column;
//! columns outside `data` exist only to support the lookups each port
//! requires.

pub mod analysis_repository;
pub mod api_key_repository;
pub mod audit_repository;
pub mod evidence_repository;
pub mod schema;
pub mod usage_repository;
pub mod user_repository;

pub use analysis_repository::SqliteAnalysisRepository;
pub use api_key_repository::SqliteApiKeyRepository;
pub use audit_repository::SqliteAuditRepository;
pub use evidence_repository::SqliteEvidenceRepository;
pub use usage_repository::SqliteUsageRepository;
pub use user_repository::SqliteUserRepository;

use evidence_domain::error::CoreError;

fn db_err(e: sqlx::Error) -> CoreError {
    CoreError::internal(format!("database error: {e}"))
}

fn serde_err(e: serde_json::Error) -> CoreError {
    CoreError::internal(format!("corrupt metadata store row: {e}"))
}
