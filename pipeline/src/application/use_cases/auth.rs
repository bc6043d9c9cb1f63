// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Authentication and API key use cases (spec.md §6.1 `/api/auth/*`,
//! `/api/keys*`). Thin orchestration over [`AccessQuotaGate`]: each
//! function borrows the gate, does no I/O of its own, and returns a typed
//! value a caller (CLI or a future HTTP binding) can render directly.

use std::sync::Arc;

use evidence_domain::error::CoreError;
use evidence_domain::value_objects::ApiKeyId;

use crate::application::services::{AccessQuotaGate, Principal};
use crate::application::use_cases::operations;

/// `POST /api/auth/login` with email/password credentials.
pub struct AuthenticatePasswordUseCase {
    gate: Arc<AccessQuotaGate>,
}

impl AuthenticatePasswordUseCase {
    pub fn new(gate: Arc<AccessQuotaGate>) -> Self {
        Self { gate }
    }

    pub async fn execute(&self, email: &str, password: &str) -> Result<(Principal, String), CoreError> {
        let (principal, session) = self.gate.authenticate_password(email, password).await?;
        Ok((principal, session.to_string()))
    }
}

/// `POST /api/auth/login` with an API key presented as a bearer token.
pub struct AuthenticateApiKeyUseCase {
    gate: Arc<AccessQuotaGate>,
}

impl AuthenticateApiKeyUseCase {
    pub fn new(gate: Arc<AccessQuotaGate>) -> Self {
        Self { gate }
    }

    pub async fn execute(&self, plaintext: &str) -> Result<(Principal, String), CoreError> {
        let (principal, session) = self.gate.authenticate_api_key(plaintext).await?;
        Ok((principal, session.to_string()))
    }
}

/// `POST /api/auth/logout`. Always succeeds (spec.md §6.1).
pub struct LogoutUseCase {
    gate: Arc<AccessQuotaGate>,
}

impl LogoutUseCase {
    pub fn new(gate: Arc<AccessQuotaGate>) -> Self {
        Self { gate }
    }

    pub async fn execute(&self, session_handle: &str) -> Result<(), CoreError> {
        let session_id = session_handle
            .parse()
            .map_err(|_| CoreError::malformed_request("invalid session handle"))?;
        self.gate.logout(session_id).await;
        Ok(())
    }
}

/// `POST /api/keys`: issues a new API key for the acting principal
/// (spec.md §4.8). Gated and charged like any other protected operation.
pub struct IssueApiKeyUseCase {
    gate: Arc<AccessQuotaGate>,
}

impl IssueApiKeyUseCase {
    pub fn new(gate: Arc<AccessQuotaGate>) -> Self {
        Self { gate }
    }

    pub async fn execute(
        &self,
        actor: Principal,
        display_name: String,
        expires_in_days: Option<i64>,
    ) -> Result<(String, ApiKeyId), CoreError> {
        let token = self.gate.gate(Some(actor), &operations::ISSUE_API_KEY).await?;
        let expires_at = expires_in_days.map(|days| chrono::Utc::now() + chrono::Duration::days(days));
        let issued = self.gate.issue_api_key(actor.user_id, display_name, expires_at).await?;
        self.gate.charge(token, 1).await?;
        Ok(issued)
    }
}

/// `DELETE /api/keys/{id}`.
pub struct RevokeApiKeyUseCase {
    gate: Arc<AccessQuotaGate>,
}

impl RevokeApiKeyUseCase {
    pub fn new(gate: Arc<AccessQuotaGate>) -> Self {
        Self { gate }
    }

    pub async fn execute(&self, actor: Principal, api_key_id: ApiKeyId) -> Result<(), CoreError> {
        let token = self.gate.gate(Some(actor), &operations::REVOKE_API_KEY).await?;
        self.gate.revoke_api_key(actor.user_id, api_key_id).await?;
        self.gate.charge(token, 1).await
    }
}

/// `GET /api/rate-limit/status` (SPEC_FULL.md §6.1 expansion).
pub struct RateLimitStatusUseCase {
    gate: Arc<AccessQuotaGate>,
}

impl RateLimitStatusUseCase {
    pub fn new(gate: Arc<AccessQuotaGate>) -> Self {
        Self { gate }
    }

    pub async fn execute(&self, actor: Principal) -> Result<crate::application::contracts::RateLimitStatusResponse, CoreError> {
        self.gate.rate_limit_status(actor, "process").await
    }
}
