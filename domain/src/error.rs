// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The one error currency crossing the domain/application boundary
//! (spec.md §7). Every variant maps to a stable `kind` string surfaced to
//! clients, never a stack trace.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Whether a failure should be retried by the Evidence Processor's backoff
/// loop (spec.md §4.1) or surfaced immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retryability {
    Retryable,
    Fatal,
}

#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum CoreError {
    #[error("unauthenticated")]
    Unauthenticated,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account disabled")]
    AccountDisabled,

    #[error("insufficient tier: requires {required}, has {actual}")]
    InsufficientTier { required: String, actual: String },

    #[error("feature not available: {feature}")]
    FeatureNotAvailable { feature: String },

    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("quota exceeded for {counter}, resets at {reset_at}")]
    QuotaExceeded { counter: String, reset_at: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("too large: {0}")]
    TooLarge(String),

    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("integrity error: {0}")]
    IntegrityError(String),

    #[error("dependency unavailable: {0}")]
    DependencyUnavailable(String),

    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("internal error (correlation id {correlation_id}): {message}")]
    Internal { message: String, correlation_id: String },
}

impl CoreError {
    /// Stable kind string surfaced in `{error, message}` responses
    /// (spec.md §7, §6.1).
    pub fn kind(&self) -> &'static str {
        match self {
            CoreError::Unauthenticated => "Unauthenticated",
            CoreError::InvalidCredentials => "InvalidCredentials",
            CoreError::AccountDisabled => "AccountDisabled",
            CoreError::InsufficientTier { .. } => "InsufficientTier",
            CoreError::FeatureNotAvailable { .. } => "FeatureNotAvailable",
            CoreError::RateLimited { .. } => "RateLimited",
            CoreError::QuotaExceeded { .. } => "QuotaExceeded",
            CoreError::NotFound(_) => "NotFound",
            CoreError::AlreadyExists(_) => "AlreadyExists",
            CoreError::Conflict(_) => "Conflict",
            CoreError::TooLarge(_) => "TooLarge",
            CoreError::UnsupportedType(_) => "UnsupportedType",
            CoreError::MalformedRequest(_) => "MalformedRequest",
            CoreError::IntegrityError(_) => "IntegrityError",
            CoreError::DependencyUnavailable(_) => "DependencyUnavailable",
            CoreError::DeadlineExceeded => "DeadlineExceeded",
            CoreError::Internal { .. } => "Internal",
        }
    }

    /// `IntegrityError` and `MalformedRequest` are never retried;
    /// `DependencyUnavailable` is retryable until the Processor's retry
    /// budget (spec.md §4.1, §7) is exhausted. Everything else is fatal by
    /// default — stage adapters decide retryability for their own
    /// transient failures via [`Retryability`] directly rather than
    /// through this blanket classification.
    pub fn retryability(&self) -> Retryability {
        match self {
            CoreError::DependencyUnavailable(_) => Retryability::Retryable,
            _ => Retryability::Fatal,
        }
    }

    /// 4xx for caller-attributable kinds, 5xx for `Internal` and
    /// `DependencyUnavailable` (spec.md §6.1, §7).
    pub fn http_status(&self) -> u16 {
        match self {
            CoreError::Unauthenticated => 401,
            CoreError::InvalidCredentials => 401,
            CoreError::AccountDisabled => 403,
            CoreError::InsufficientTier { .. } => 403,
            CoreError::FeatureNotAvailable { .. } => 403,
            CoreError::RateLimited { .. } => 429,
            CoreError::QuotaExceeded { .. } => 429,
            CoreError::NotFound(_) => 404,
            CoreError::AlreadyExists(_) => 409,
            CoreError::Conflict(_) => 409,
            CoreError::TooLarge(_) => 413,
            CoreError::UnsupportedType(_) => 415,
            CoreError::MalformedRequest(_) => 400,
            CoreError::IntegrityError(_) => 500,
            CoreError::DependencyUnavailable(_) => 503,
            CoreError::DeadlineExceeded => 504,
            CoreError::Internal { .. } => 500,
        }
    }

    pub fn malformed_request(message: impl Into<String>) -> Self {
        CoreError::MalformedRequest(message.into())
    }

    pub fn unsupported_type(message: impl Into<String>) -> Self {
        CoreError::UnsupportedType(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        CoreError::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        CoreError::Internal { message: message.into(), correlation_id: uuid::Uuid::new_v4().to_string() }
    }
}
