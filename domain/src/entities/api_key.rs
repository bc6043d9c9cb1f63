// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! ApiKey — long-lived bearer token (spec.md §3).
//!
//! Invariant: the plaintext key is shown once at creation and never
//! persisted; only its SHA-256 digest is stored.

use crate::value_objects::{sha256_of_parts, ApiKeyId, ContentDigest, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKey {
    pub id: ApiKeyId,
    pub owner: UserId,
    pub key_digest: ContentDigest,
    pub display_name: String,
    pub active: bool,
    #[serde(with = "crate::services::datetime_serde")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "crate::services::datetime_serde::optional")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(with = "crate::services::datetime_serde::optional")]
    pub last_used_at: Option<DateTime<Utc>>,
    pub request_count: u64,
}

/// The plaintext key and the record that will be persisted. Returned only
/// from key issuance; the plaintext half is dropped after the caller reads
/// it once.
pub struct IssuedApiKey {
    pub plaintext: String,
    pub record: ApiKey,
}

impl ApiKey {
    /// Generates a new key, computing its digest. The caller receives the
    /// plaintext exactly once via [`IssuedApiKey`].
    pub fn issue(owner: UserId, display_name: impl Into<String>, expires_at: Option<DateTime<Utc>>) -> IssuedApiKey {
        let plaintext = format!("ep_{}", uuid::Uuid::new_v4().simple());
        let key_digest = sha256_of_parts(&[plaintext.as_bytes()]);
        let record = ApiKey {
            id: ApiKeyId::new(),
            owner,
            key_digest,
            display_name: display_name.into(),
            active: true,
            created_at: Utc::now(),
            expires_at,
            last_used_at: None,
            request_count: 0,
        };
        IssuedApiKey { plaintext, record }
    }

    pub fn digest_of(plaintext: &str) -> ContentDigest {
        sha256_of_parts(&[plaintext.as_bytes()])
    }

    pub fn is_expired(&self, at: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| exp <= at)
    }

    pub fn record_use(&mut self, at: DateTime<Utc>) {
        self.last_used_at = Some(at);
        self.request_count += 1;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }
}
