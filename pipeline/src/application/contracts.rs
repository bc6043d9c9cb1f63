// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! HTTP surface contracts (spec.md §6.1).
//!
//! The HTTP/session transport itself is out of scope — there is no axum
//! or warp dependency in this crate. What lives here is the stable,
//! typed boundary a thin HTTP crate would bind to: request/response
//! bodies and the error-kind-to-status mapping, so routes can be added
//! later without renegotiating what they carry.
//!
//! Each DTO's doc comment names the route it backs; none of them are
//! wired to a router in this repository.

use evidence_domain::CoreError;
use serde::{Deserialize, Serialize};

/// `POST /api/auth/login`
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub user_id: String,
    pub tier: String,
    pub is_admin: bool,
    pub session_handle: String,
    pub session_expires_at: String,
}

/// `POST /api/auth/logout`
#[derive(Debug, Clone, Deserialize)]
pub struct LogoutRequest {
    pub session_handle: String,
}

/// `POST /api/keys`
#[derive(Debug, Clone, Deserialize)]
pub struct IssueApiKeyRequest {
    pub display_name: String,
    pub expires_in_days: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IssueApiKeyResponse {
    pub api_key_id: String,
    /// Shown exactly once (spec.md §3).
    pub plaintext: String,
}

/// `DELETE /api/keys/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct RevokeApiKeyRequest {
    pub api_key_id: String,
}

/// `POST /api/evidence/upload`
#[derive(Debug, Clone, Deserialize)]
pub struct UploadEvidenceRequest {
    pub case_number: Option<String>,
    pub declared_type: String,
    pub description: Option<String>,
    pub original_filename: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadEvidenceResponse {
    pub evidence_id: String,
    pub content_digest: String,
    pub bytes: u64,
}

/// `POST /api/evidence/{id}/process`
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessEvidenceRequest {
    pub analyzer_profile_version: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessEvidenceResponse {
    pub analysis_id: String,
    pub state: String,
    pub cached: bool,
}

/// `GET /api/analysis/{id}/report`
#[derive(Debug, Clone, Deserialize)]
pub struct GetReportRequest {
    pub analysis_id: String,
    pub format: String,
}

/// `GET /api/rate-limit/status`
#[derive(Debug, Clone, Serialize)]
pub struct RateLimitStatusResponse {
    pub tokens_remaining: f64,
    pub capacity: f64,
    pub monthly_counters: std::collections::BTreeMap<String, u64>,
}

/// `GET /health`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub components: std::collections::BTreeMap<String, HealthStatus>,
}

/// Uniform error body for every gated/HTTP-adjacent operation (spec.md §7:
/// "clients always receive `{error, message}`").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

impl From<&CoreError> for ErrorBody {
    fn from(err: &CoreError) -> Self {
        Self { error: err.kind().to_string(), message: err.to_string() }
    }
}

/// Headers surfaced on every gated route (spec.md §6.1).
#[derive(Debug, Clone, Copy)]
pub struct RateLimitHeaders {
    pub limit: u64,
    pub remaining: u64,
    pub retry_after_secs: Option<u64>,
}
