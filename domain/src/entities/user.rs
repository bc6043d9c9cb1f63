// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! User — the identity principal (spec.md §3).

use crate::value_objects::{Tier, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An irreversible password verifier. Never holds plaintext; comparison
/// happens through [`crate::services::PasswordHasher`], never by equality
/// on this type.
#[derive(Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordVerifier(String);

impl PasswordVerifier {
    pub fn from_hash(hash: String) -> Self {
        Self(hash)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for PasswordVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PasswordVerifier(<redacted>)")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub password_verifier: PasswordVerifier,
    pub tier: Tier,
    pub active: bool,
    #[serde(with = "crate::services::datetime_serde")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "crate::services::datetime_serde::optional")]
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    pub fn new(email: impl Into<String>, password_verifier: PasswordVerifier, tier: Tier) -> Self {
        Self {
            id: UserId::new(),
            email: email.into(),
            password_verifier,
            tier,
            active: true,
            created_at: Utc::now(),
            last_login: None,
        }
    }

    pub fn record_login(&mut self, at: DateTime<Utc>) {
        self.last_login = Some(at);
    }
}
