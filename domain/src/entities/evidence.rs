// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Evidence — an ingested artifact (spec.md §3).

use crate::value_objects::{CaseNumber, ContentDigest, DeclaredType, EvidenceId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceStatus {
    Received,
    Processing,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evidence {
    pub id: EvidenceId,
    pub owner: UserId,
    pub declared_type: DeclaredType,
    pub content_digest: ContentDigest,
    pub byte_size: u64,
    pub original_filename: String,
    pub storage_path: String,
    pub status: EvidenceStatus,
    /// Whether this is the original artifact rather than a copy or
    /// derivative (spec.md §4.5 `COMP-ORIG-001`).
    pub is_original: bool,
    /// Whether the evidence's authenticity has been established — e.g.
    /// a verified device export or a signed acquisition manifest
    /// (spec.md §4.5 `COMP-AUTH-002`).
    pub authenticated: bool,
    #[serde(with = "crate::services::datetime_serde")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "crate::services::datetime_serde::optional")]
    pub completed_at: Option<DateTime<Utc>>,
    pub case_number: Option<CaseNumber>,
}

impl Evidence {
    #[allow(clippy::too_many_arguments)]
    pub fn received(
        owner: UserId,
        declared_type: DeclaredType,
        content_digest: ContentDigest,
        byte_size: u64,
        original_filename: impl Into<String>,
        storage_path: impl Into<String>,
        case_number: Option<CaseNumber>,
        is_original: bool,
        authenticated: bool,
    ) -> Self {
        Self {
            id: EvidenceId::new(),
            owner,
            declared_type,
            content_digest,
            byte_size,
            original_filename: original_filename.into(),
            storage_path: storage_path.into(),
            status: EvidenceStatus::Received,
            is_original,
            authenticated,
            created_at: Utc::now(),
            completed_at: None,
            case_number,
        }
    }

    pub fn mark_processing(&mut self) {
        self.status = EvidenceStatus::Processing;
    }

    pub fn mark_completed(&mut self, at: DateTime<Utc>) {
        self.status = EvidenceStatus::Completed;
        self.completed_at = Some(at);
    }

    pub fn mark_failed(&mut self) {
        self.status = EvidenceStatus::Failed;
    }

    pub fn case_number_str(&self) -> Option<&str> {
        self.case_number.as_ref().map(|c| c.as_str())
    }
}
