// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Access & Quota Gate (spec.md §4.8): authenticate, authorize, rate
//! limit, and meter every protected call to the Evidence Processor.
//!
//! The short-circuit order in [`AccessQuotaGate::gate`] is the one
//! piece of this component a caller can depend on (spec.md §9: "a
//! single Gate object with one method ... called exactly once at the
//! top of each protected handler").

use super::audit_logger::AuditLogger;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use evidence_domain::entities::{Subject, User};
use evidence_domain::error::CoreError;
use evidence_domain::services::{ApiKeyRepository, PasswordHasher, UsageRepository, UserRepository};
use evidence_domain::value_objects::{ApiKeyId, ChargeToken, SessionId, Tier, UserId, YearMonth};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// The authenticated actor (GLOSSARY: "Principal").
#[derive(Debug, Clone, Copy)]
pub struct Principal {
    pub user_id: UserId,
    pub tier: Tier,
    pub is_admin: bool,
}

/// Names the operation, its tier floor, its optional feature flag, and
/// the monthly counter it charges (spec.md §4.8 "operation descriptor").
#[derive(Debug, Clone)]
pub struct OperationDescriptor {
    pub name: &'static str,
    pub tier_floor: Tier,
    pub feature_flag: Option<&'static str>,
    pub counter_name: &'static str,
    /// Whether a grant/denial for this operation is audit-worthy
    /// (spec.md §4.8: "evidence ingest, processing, export, key
    /// issuance, tier change").
    pub audit_worthy: bool,
}

/// Per-tier rate and quota policy (spec.md §6.4 `tier_limits`).
#[derive(Debug, Clone)]
pub struct TierPolicy {
    pub rate_capacity: f64,
    pub rate_refill_per_second: f64,
    /// `-1` is the `unlimited` sentinel (spec.md §6.4).
    pub monthly_limits: HashMap<&'static str, i64>,
    pub feature_flags: Vec<&'static str>,
}

#[derive(Debug, Clone, Default)]
pub struct TierLimitsTable(pub HashMap<Tier, TierPolicy>);

impl TierLimitsTable {
    pub fn policy_for(&self, tier: Tier) -> TierPolicy {
        self.0.get(&tier).cloned().unwrap_or(TierPolicy {
            rate_capacity: 1_000_000_000.0,
            rate_refill_per_second: 1_000_000.0,
            monthly_limits: HashMap::new(),
            feature_flags: Vec::new(),
        })
    }
}

/// Port over the token-bucket rate limiter (spec.md §4.8, §5: "per-bucket
/// lock is never held across I/O"). Concrete implementation lives in
/// infrastructure so the bucket-storage strategy stays swappable.
pub trait RateLimiterPort: Send + Sync {
    /// Attempts to consume one token for `(principal, operation_class)`.
    /// Returns `(granted, retry_after_secs)`.
    fn try_consume(&self, user_id: UserId, operation_class: &str, policy: &TierPolicy) -> (bool, u64);

    /// Reports the current bucket state for `(principal, operation_class)`
    /// without consuming a token (spec.md §6.1 `GET /api/rate-limit/status`).
    /// Returns `(tokens_remaining, capacity)`.
    fn peek(&self, user_id: UserId, operation_class: &str, policy: &TierPolicy) -> (f64, f64);
}

struct Session {
    principal: Principal,
    expires_at: DateTime<Utc>,
}

/// Duration a session handle stays valid (spec.md §4.8: "absolute
/// expiry").
const SESSION_LIFETIME_HOURS: i64 = 12;

pub struct AccessQuotaGate {
    users: Arc<dyn UserRepository>,
    api_keys: Arc<dyn ApiKeyRepository>,
    usage: Arc<dyn UsageRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
    rate_limiter: Arc<dyn RateLimiterPort>,
    tier_limits: TierLimitsTable,
    audit: Arc<AuditLogger>,
    sessions: Mutex<HashMap<SessionId, Session>>,
}

impl AccessQuotaGate {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        users: Arc<dyn UserRepository>,
        api_keys: Arc<dyn ApiKeyRepository>,
        usage: Arc<dyn UsageRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
        rate_limiter: Arc<dyn RateLimiterPort>,
        tier_limits: TierLimitsTable,
        audit: Arc<AuditLogger>,
    ) -> Self {
        Self {
            users,
            api_keys,
            usage,
            password_hasher,
            rate_limiter,
            tier_limits,
            audit,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Authenticates by (email, password), returning a principal and a
    /// session handle with an absolute expiry (spec.md §4.8).
    pub async fn authenticate_password(&self, email: &str, password: &str) -> Result<(Principal, SessionId), CoreError> {
        let user = self.users.find_by_email(email).await?;
        let user = match user {
            Some(u) if u.active => u,
            Some(_) => {
                self.audit.append(None, Subject::None, "auth.failure", "account_disabled", None).await?;
                return Err(CoreError::AccountDisabled);
            }
            None => {
                self.audit.append(None, Subject::None, "auth.failure", "unknown_principal", None).await?;
                return Err(CoreError::InvalidCredentials);
            }
        };
        if !self.password_hasher.verify(password, &user.password_verifier) {
            self.audit
                .append(Some(user.id), Subject::User { id: user.id.to_string() }, "auth.failure", "bad_password", None)
                .await?;
            return Err(CoreError::InvalidCredentials);
        }
        self.finish_login(user).await
    }

    /// Authenticates by API key digest (spec.md §4.8: "API keys are
    /// compared by digest only").
    pub async fn authenticate_api_key(&self, plaintext: &str) -> Result<(Principal, SessionId), CoreError> {
        let digest = evidence_domain::entities::ApiKey::digest_of(plaintext);
        let key = self
            .api_keys
            .find_by_digest(&digest)
            .await?
            .filter(|k| k.active && !k.is_expired(Utc::now()))
            .ok_or(CoreError::InvalidCredentials)?;
        let user = self.users.find_by_id(key.owner).await?.filter(|u| u.active).ok_or(CoreError::AccountDisabled)?;
        let mut key = key;
        key.record_use(Utc::now());
        self.api_keys.update(&key).await?;
        self.finish_login(user).await
    }

    async fn finish_login(&self, mut user: User) -> Result<(Principal, SessionId), CoreError> {
        let now = Utc::now();
        user.record_login(now);
        self.users.update(&user).await?;
        let principal = Principal { user_id: user.id, tier: user.tier, is_admin: user.tier == Tier::Admin };
        let session_id = SessionId::new();
        let expires_at = now + ChronoDuration::hours(SESSION_LIFETIME_HOURS);
        self.sessions.lock().await.insert(session_id, Session { principal, expires_at });
        self.audit
            .append(Some(user.id), Subject::User { id: user.id.to_string() }, "auth.success", "granted", None)
            .await?;
        Ok((principal, session_id))
    }

    /// Resolves a previously issued session handle to its principal,
    /// rejecting expired handles.
    pub async fn resolve_session(&self, session_id: SessionId) -> Result<Principal, CoreError> {
        let sessions = self.sessions.lock().await;
        let session = sessions.get(&session_id).ok_or(CoreError::Unauthenticated)?;
        if session.expires_at <= Utc::now() {
            return Err(CoreError::Unauthenticated);
        }
        Ok(session.principal)
    }

    /// Invalidates a session handle; always succeeds (spec.md §6.1:
    /// `POST /api/auth/logout` "always 200").
    pub async fn logout(&self, session_id: SessionId) {
        self.sessions.lock().await.remove(&session_id);
    }

    /// The short-circuit chain of spec.md §4.8: identity, tier floor,
    /// feature flag, rate bucket, monthly counter — in that order, each
    /// returning on first failure (spec.md §8 invariant 6).
    pub async fn gate(&self, principal: Option<Principal>, op: &OperationDescriptor) -> Result<ChargeToken, CoreError> {
        let result = self.gate_inner(principal, op).await;
        match &result {
            // spec.md §4.8: a successful grant is only audited when the
            // operation itself is marked audit-worthy.
            Ok(_) if op.audit_worthy => {
                self.audit
                    .append(principal.map(|p| p.user_id), Subject::None, format!("{}.granted", op.name), "granted", None)
                    .await
                    .ok();
            }
            Ok(_) => {}
            // Every denial is audited regardless of `audit_worthy` — a
            // denied call never reached the operation it describes.
            Err(err) => {
                self.audit
                    .append(principal.map(|p| p.user_id), Subject::None, "gate.denied", err.kind(), None)
                    .await
                    .ok();
            }
        }
        result
    }

    async fn gate_inner(&self, principal: Option<Principal>, op: &OperationDescriptor) -> Result<ChargeToken, CoreError> {
        // 1. Identity.
        let principal = principal.ok_or(CoreError::Unauthenticated)?;

        // 2. Tier floor.
        if !principal.tier.meets_floor(op.tier_floor) {
            return Err(CoreError::InsufficientTier {
                required: op.tier_floor.to_string(),
                actual: principal.tier.to_string(),
            });
        }

        let policy = self.tier_limits.policy_for(principal.tier);

        // 3. Feature flag.
        if let Some(flag) = op.feature_flag {
            if !policy.feature_flags.contains(&flag) {
                return Err(CoreError::FeatureNotAvailable { feature: flag.to_string() });
            }
        }

        // 4. Rate bucket.
        let (granted, retry_after) = self.rate_limiter.try_consume(principal.user_id, op.name, &policy);
        if !granted {
            return Err(CoreError::RateLimited { retry_after_secs: retry_after });
        }

        // 5. Monthly counter.
        let year_month = YearMonth::from_date(Utc::now());
        let limit = policy.monthly_limits.get(op.counter_name).copied().unwrap_or(-1);
        if limit >= 0 {
            let counter = self.usage.get_or_create(principal.user_id, year_month.clone()).await?;
            if counter.counters.get(op.counter_name) as i64 >= limit {
                return Err(CoreError::QuotaExceeded {
                    counter: op.counter_name.to_string(),
                    reset_at: next_month_start(year_month),
                });
            }
        }

        Ok(ChargeToken::new(op.counter_name, principal.user_id))
    }

    /// Redeems a charge token, atomically incrementing its counter
    /// (spec.md §4.8 `Charge`). Idempotent per token is the
    /// responsibility of the caller not redeeming the same token twice;
    /// the repository's increment itself is always atomic.
    pub async fn charge(&self, token: ChargeToken, amount: u64) -> Result<(), CoreError> {
        let year_month = YearMonth::from_date(Utc::now());
        self.usage.increment(token.user_id, year_month, &token.counter_name, amount).await?;
        Ok(())
    }

    pub async fn issue_api_key(
        &self,
        owner: UserId,
        display_name: impl Into<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<(String, ApiKeyId), CoreError> {
        let issued = evidence_domain::entities::ApiKey::issue(owner, display_name, expires_at);
        self.api_keys.insert(&issued.record).await?;
        self.audit
            .append(Some(owner), Subject::ApiKey { id: issued.record.id.to_string() }, "api_key.issued", "granted", None)
            .await?;
        Ok((issued.plaintext, issued.record.id))
    }

    /// `GET /api/rate-limit/status` (SPEC_FULL.md §6.1 expansion): the
    /// current token bucket level for `operation_class` plus the
    /// principal's monthly counters, both read without consuming
    /// anything (spec.md §8 invariant 9: observing state must not perturb it).
    pub async fn rate_limit_status(
        &self,
        principal: Principal,
        operation_class: &str,
    ) -> Result<crate::application::contracts::RateLimitStatusResponse, CoreError> {
        let policy = self.tier_limits.policy_for(principal.tier);
        let (tokens_remaining, capacity) = self.rate_limiter.peek(principal.user_id, operation_class, &policy);
        let year_month = YearMonth::from_date(Utc::now());
        let usage = self.usage.get_or_create(principal.user_id, year_month).await?;
        let monthly_counters = [
            "pdf_documents_processed",
            "videos_processed",
            "video_hours",
            "transcription_minutes",
            "api_calls",
            "cases_created",
        ]
        .into_iter()
        .map(|name| (name.to_string(), usage.counters.get(name)))
        .collect();
        Ok(crate::application::contracts::RateLimitStatusResponse { tokens_remaining, capacity, monthly_counters })
    }

    pub async fn revoke_api_key(&self, actor: UserId, api_key_id: ApiKeyId) -> Result<(), CoreError> {
        let mut key = self.api_keys.find_by_id(api_key_id).await?.ok_or_else(|| CoreError::not_found("api key"))?;
        key.deactivate();
        self.api_keys.update(&key).await?;
        self.audit
            .append(Some(actor), Subject::ApiKey { id: api_key_id.to_string() }, "api_key.revoked", "granted", None)
            .await?;
        Ok(())
    }
}

fn next_month_start(year_month: YearMonth) -> String {
    let (year, month) = if year_month.month == 12 { (year_month.year + 1, 1) } else { (year_month.year, year_month.month + 1) };
    format!("{year:04}-{month:02}-01T00:00:00Z")
}
