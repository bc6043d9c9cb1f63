// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Evidence Processor (spec.md §4.1): the fingerprint-keyed, single-flight,
//! cache-aware pipeline that orchestrates transcription, OCR, violation
//! analysis, compliance analysis, and report synthesis.
//!
//! `Process` is the one operation worth reading carefully end to end:
//! cache consult, single-flight lease, stage dispatch in the fixed order
//! of spec.md §4.1, retry/backoff, and the `evidence.processed[.cached]`
//! / `evidence.processing_failed` events. Everything else
//! ([`EvidenceProcessor::ingest`], [`EvidenceProcessor::report`],
//! [`EvidenceProcessor::reprocess`]) is a thin operation around it.

use evidence_domain::aggregates::EvidenceAggregate;
use evidence_domain::entities::{AnalysisResult, Evidence, StageTimings};
use evidence_domain::error::{CoreError, Retryability};
use evidence_domain::events::DomainEvent;
use evidence_domain::services::{
    AnalysisRepository, Cache, ComplianceAttributes, ComplianceCheckerStage, ContentStore, EventBus,
    EvidenceRepository, MetricsCollector, MotionRecommenderStage, OcrRequest, OcrStage, ReportSynthesizerStage,
    Synthesis, SynthesisInput, TranscriptionRequest, TranscriptionStage, ViolationContext, ViolationScannerStage,
};
use evidence_domain::value_objects::{
    AnalysisId, AnalyzerProfileVersion, CaseNumber, ContentDigest, DeclaredType, EvidenceId, Fingerprint, UserId,
};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;

use super::audit_logger::AuditLogger;

/// The fixed per-stage retry budget (spec.md §4.1: "at most three
/// attempts with exponential backoff per stage, base 1s, factor 2,
/// jitter ±25%").
const MAX_ATTEMPTS: u32 = 3;
const BACKOFF_BASE: Duration = Duration::from_secs(1);

/// How long a `DependencyUnavailable` stage failure is retried before it
/// degrades to fatal (spec.md §4.1: "retryable for up to five minutes
/// before degrading to fatal").
const DEPENDENCY_UNAVAILABLE_BUDGET: Duration = Duration::from_secs(5 * 60);

/// The context tag subset that participates in the fingerprint, plus the
/// extra analyzer inputs that do not (spec.md §4.1: "context tag subset
/// is exactly {case-number, analyzer-profile-version}; nothing else
/// affects the fingerprint").
#[derive(Debug, Clone, Default)]
pub struct ProcessingContext {
    pub case_number: Option<CaseNumber>,
    pub analyzer_profile_version: AnalyzerProfileVersion,
    pub language_hint: Option<String>,
    pub arrest_date: Option<chrono::DateTime<chrono::Utc>>,
    pub involved_parties: Vec<String>,
}

pub struct IngestRequest<'a> {
    pub owner: UserId,
    pub data: &'a [u8],
    pub declared_mime: &'a str,
    pub declared_type: DeclaredType,
    pub original_filename: &'a str,
    pub case_number: Option<CaseNumber>,
    pub max_bytes: u64,
    /// Whether the submitted artifact is the original rather than a
    /// copy or derivative (spec.md §4.5 `COMP-ORIG-001`).
    pub is_original: bool,
    /// Whether the artifact's authenticity has already been established
    /// at the point of submission (spec.md §4.5 `COMP-AUTH-002`).
    pub authenticated: bool,
}

/// Per-fingerprint single-flight lease table (spec.md §4.1: "if another
/// processor already holds the lease for the same fingerprint, the
/// current call awaits that lease's result"). Distinct from the Cache
/// port's own `get_or_compute` single-flight contract — this lease
/// guards the whole stage pipeline, not one cache key.
#[derive(Default)]
struct LeaseTable {
    leases: std::sync::Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl LeaseTable {
    fn lease_for(&self, fingerprint: &str) -> Arc<AsyncMutex<()>> {
        let mut leases = self.leases.lock().unwrap();
        leases.entry(fingerprint.to_string()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
    }

    /// Drops the table entry once the last holder has released it, so the
    /// map does not grow without bound.
    fn release(&self, fingerprint: &str, lease: Arc<AsyncMutex<()>>) {
        let mut leases = self.leases.lock().unwrap();
        if Arc::strong_count(&lease) <= 2 {
            leases.remove(fingerprint);
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub struct EvidenceProcessor {
    content_store: Arc<dyn ContentStore>,
    evidence_repo: Arc<dyn EvidenceRepository>,
    analysis_repo: Arc<dyn AnalysisRepository>,
    cache: Arc<dyn Cache>,
    event_bus: Arc<dyn EventBus>,
    metrics: Arc<dyn MetricsCollector>,
    audit: Arc<AuditLogger>,
    transcription: Arc<dyn TranscriptionStage>,
    ocr: Arc<dyn OcrStage>,
    violation_scanner: Arc<dyn ViolationScannerStage>,
    compliance_checker: Arc<dyn ComplianceCheckerStage>,
    motion_recommender: Arc<dyn MotionRecommenderStage>,
    report_synthesizer: Arc<dyn ReportSynthesizerStage>,
    transcript_ttl: Duration,
    ocr_ttl: Duration,
    result_ttl: Duration,
    leases: LeaseTable,
}

impl EvidenceProcessor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        content_store: Arc<dyn ContentStore>,
        evidence_repo: Arc<dyn EvidenceRepository>,
        analysis_repo: Arc<dyn AnalysisRepository>,
        cache: Arc<dyn Cache>,
        event_bus: Arc<dyn EventBus>,
        metrics: Arc<dyn MetricsCollector>,
        audit: Arc<AuditLogger>,
        transcription: Arc<dyn TranscriptionStage>,
        ocr: Arc<dyn OcrStage>,
        violation_scanner: Arc<dyn ViolationScannerStage>,
        compliance_checker: Arc<dyn ComplianceCheckerStage>,
        motion_recommender: Arc<dyn MotionRecommenderStage>,
        report_synthesizer: Arc<dyn ReportSynthesizerStage>,
        transcript_ttl: Duration,
        ocr_ttl: Duration,
        result_ttl: Duration,
    ) -> Self {
        Self {
            content_store,
            evidence_repo,
            analysis_repo,
            cache,
            event_bus,
            metrics,
            audit,
            transcription,
            ocr,
            violation_scanner,
            compliance_checker,
            motion_recommender,
            report_synthesizer,
            transcript_ttl,
            ocr_ttl,
            result_ttl,
            leases: LeaseTable::default(),
        }
    }

    /// **Ingest** (spec.md §4.1): hashes, dedups against the Content
    /// Store, and writes the Evidence row.
    pub async fn ingest(&self, request: IngestRequest<'_>) -> Result<Evidence, CoreError> {
        if request.data.len() as u64 > request.max_bytes {
            return Err(CoreError::TooLarge(format!(
                "{} bytes exceeds tier maximum of {} bytes",
                request.data.len(),
                request.max_bytes
            )));
        }
        if !evidence_domain::value_objects::mime_matches_declared_type(request.declared_mime, request.declared_type) {
            return Err(CoreError::unsupported_type(format!(
                "mime '{}' does not match declared type {}",
                request.declared_mime, request.declared_type
            )));
        }

        let digest = ContentDigest::of(request.data);
        let metadata = evidence_domain::services::BlobMetadata {
            original_filename: request.original_filename.to_string(),
            declared_type: request.declared_type,
            size: request.data.len() as u64,
            ingested_at: chrono::Utc::now(),
        };
        self.content_store.put(&digest, request.data, metadata).await?;
        let storage_path = self.content_store.path_for(&digest);

        let evidence = Evidence::received(
            request.owner,
            request.declared_type,
            digest,
            request.data.len() as u64,
            request.original_filename,
            storage_path,
            request.case_number,
            request.is_original,
            request.authenticated,
        );
        self.evidence_repo.insert(&evidence).await?;
        self.event_bus.publish(DomainEvent::EvidenceIngested {
            evidence_id: evidence.id,
            content_digest: digest,
            byte_size: evidence.byte_size,
        });
        self.audit
            .append_evidence_event(Some(request.owner), evidence.id, Some(digest), "evidence.ingested", "granted")
            .await?;
        Ok(evidence)
    }

    /// **Process** (spec.md §4.1): the cache-consult / single-flight /
    /// stage-dispatch pipeline described at the top of this module.
    pub async fn process(
        &self,
        evidence_id: EvidenceId,
        context: ProcessingContext,
        actor: Option<UserId>,
    ) -> Result<AnalysisResult, CoreError> {
        let evidence = self.evidence_repo.find_by_id(evidence_id).await?.ok_or_else(|| CoreError::not_found("evidence"))?;
        let fingerprint = Fingerprint::compute(
            &evidence.content_digest,
            evidence.declared_type,
            &context.analyzer_profile_version,
            context.case_number.as_ref().map(|c| c.as_str()),
        );

        if let Some(cached) = self.read_full_cache(&fingerprint).await? {
            self.metrics.increment_counter("evidence_processor.cache_hit", 1);
            self.event_bus.publish(DomainEvent::EvidenceProcessedCached { evidence_id });
            self.audit.append_evidence_event(actor, evidence_id, None, "evidence.processed.cached", "granted").await?;
            return Ok(cached);
        }

        let lease = self.leases.lease_for(&fingerprint.to_hex());
        let _guard = lease.lock().await;

        // Double-checked: another caller may have populated the cache
        // while we waited for the lease (spec.md §5: "all waiters observe
        // the same result object").
        if let Some(cached) = self.read_full_cache(&fingerprint).await? {
            self.leases.release(&fingerprint.to_hex(), lease.clone());
            return Ok(cached);
        }

        let result = self.run_pipeline(evidence, fingerprint.clone(), context, actor).await;
        self.leases.release(&fingerprint.to_hex(), lease.clone());
        result
    }

    /// **Reprocess** (SPEC_FULL.md §4.1 expansion): the named
    /// `failed -> running` transition. Re-derives the same fingerprint
    /// from the stored Evidence so any still-fresh `transcript:<fp>` /
    /// `ocr:<fp>` cache entries are reused exactly as a fresh `Process`
    /// call would reuse them.
    pub async fn reprocess(&self, analysis_id: AnalysisId, actor: Option<UserId>) -> Result<AnalysisResult, CoreError> {
        let analysis = self.analysis_repo.find_by_id(analysis_id).await?.ok_or_else(|| CoreError::not_found("analysis"))?;
        if analysis.state != evidence_domain::entities::AnalysisState::Failed {
            return Err(CoreError::Conflict("only a failed analysis can be reprocessed".into()));
        }
        let evidence = self
            .evidence_repo
            .find_by_id(analysis.evidence_id)
            .await?
            .ok_or_else(|| CoreError::not_found("evidence"))?;
        let context = ProcessingContext {
            case_number: evidence.case_number.clone(),
            analyzer_profile_version: analysis.analyzer_profile_version.clone(),
            language_hint: None,
            arrest_date: None,
            involved_parties: Vec::new(),
        };
        self.process(evidence.id, context, actor).await
    }

    /// **Report** (spec.md §4.1): format rendering itself lives in
    /// [`super::report_renderer::ReportRenderer`]; this is the lookup
    /// that feeds it.
    pub async fn fetch_for_report(&self, analysis_id: AnalysisId) -> Result<AnalysisResult, CoreError> {
        self.analysis_repo.find_by_id(analysis_id).await?.ok_or_else(|| CoreError::not_found("analysis"))
    }

    async fn read_full_cache(&self, fingerprint: &Fingerprint) -> Result<Option<AnalysisResult>, CoreError> {
        match self.cache.get(&fingerprint.cache_key("full")).await {
            Some(bytes) => {
                let result: AnalysisResult = serde_json::from_slice(&bytes)
                    .map_err(|e| CoreError::internal(format!("corrupt cached analysis result: {e}")))?;
                Ok(Some(result))
            }
            None => Ok(None),
        }
    }

    async fn run_pipeline(
        &self,
        evidence: Evidence,
        fingerprint: Fingerprint,
        context: ProcessingContext,
        actor: Option<UserId>,
    ) -> Result<AnalysisResult, CoreError> {
        // spec.md §8 S4: a corrupted blob is caught before any stage runs
        // or any status transition happens, and is always audited even
        // though `PROCESS` is audit-worthy only on the happy path.
        if let Err(err) = self.content_store.get(&evidence.content_digest).await {
            self.audit
                .append_evidence_event(actor, evidence.id, Some(evidence.content_digest), "integrity.mismatch", err.kind())
                .await
                .ok();
            return Err(err);
        }

        let analysis = match self.analysis_repo.find_by_evidence_id(evidence.id).await? {
            Some(existing) if existing.fingerprint == fingerprint => existing,
            _ => AnalysisResult::pending(evidence.id, fingerprint.clone(), context.analyzer_profile_version.clone()),
        };
        let mut aggregate = EvidenceAggregate::new(evidence, analysis);
        aggregate.begin_processing()?;
        self.evidence_repo.update(&aggregate.evidence).await?;
        self.analysis_repo.upsert(&aggregate.analysis).await?;

        match self.run_stages(&aggregate.evidence, &fingerprint, &context, &mut aggregate.analysis).await {
            Ok(()) => {
                let now = chrono::Utc::now();
                aggregate.complete(now)?;
                self.evidence_repo.update(&aggregate.evidence).await?;
                self.analysis_repo.upsert(&aggregate.analysis).await?;

                let bytes = serde_json::to_vec(&aggregate.analysis)
                    .map_err(|e| CoreError::internal(format!("failed to cache analysis result: {e}")))?;
                self.cache.set(&fingerprint.cache_key("full"), bytes, self.result_ttl).await;

                self.event_bus.publish(DomainEvent::EvidenceProcessed {
                    evidence_id: aggregate.evidence.id,
                    violation_count: aggregate.analysis.violations.len(),
                    compliance_status: aggregate.analysis.compliance.overall_status.as_str().to_string(),
                });
                self.audit
                    .append_evidence_event(
                        actor,
                        aggregate.evidence.id,
                        Some(aggregate.evidence.content_digest),
                        "evidence.processed",
                        "granted",
                    )
                    .await?;
                Ok(aggregate.analysis)
            }
            Err((failing_stage, err)) => {
                aggregate.fail(failing_stage.clone())?;
                self.evidence_repo.update(&aggregate.evidence).await?;
                self.analysis_repo.upsert(&aggregate.analysis).await?;
                self.event_bus.publish(DomainEvent::EvidenceProcessingFailed {
                    evidence_id: aggregate.evidence.id,
                    failing_stage,
                });
                self.audit
                    .append_evidence_event(
                        actor,
                        aggregate.evidence.id,
                        Some(aggregate.evidence.content_digest),
                        "evidence.processing_failed",
                        err.kind(),
                    )
                    .await
                    .ok();
                Err(err)
            }
        }
    }

    /// Runs stages 2–7 of spec.md §4.1 in order, mutating `analysis` in
    /// place. Returns `Err((stage name, error))` on the first
    /// non-retryable (or retry-budget-exhausted) failure.
    async fn run_stages(
        &self,
        evidence: &Evidence,
        fingerprint: &Fingerprint,
        context: &ProcessingContext,
        analysis: &mut AnalysisResult,
    ) -> Result<(), (String, CoreError)> {
        let mut transcript_text = String::new();
        let mut ocr_text = String::new();

        if evidence.declared_type.needs_transcription() {
            let transcript = self
                .run_cached_stage("transcription", fingerprint, "transcript", self.transcript_ttl, &mut analysis.timings, || {
                    let request = TranscriptionRequest {
                        media_path: &evidence.storage_path,
                        declared_type: evidence.declared_type,
                        language_hint: context.language_hint.as_deref(),
                        evidence_id: evidence.id,
                        wall_clock_limit: Duration::from_secs(30 * 60),
                    };
                    self.transcription.transcribe(request)
                })
                .await
                .map_err(|e| ("transcription".to_string(), e))?;
            transcript_text = transcript.text.clone();
            analysis.transcript = Some(transcript);
        }

        if evidence.declared_type.needs_ocr() {
            let ocr = self
                .run_cached_stage("ocr", fingerprint, "ocr", self.ocr_ttl, &mut analysis.timings, || {
                    let request =
                        OcrRequest { document_path: &evidence.storage_path, declared_type: evidence.declared_type, evidence_id: evidence.id };
                    self.ocr.extract(request)
                })
                .await
                .map_err(|e| ("ocr".to_string(), e))?;
            ocr_text = ocr.aggregated_text.clone();
            analysis.ocr = Some(ocr);
        }

        let corpus = [transcript_text.as_str(), ocr_text.as_str()].join("\n\x0c\n");
        let violation_context = ViolationContext {
            case_number: context.case_number.as_ref().map(|c| c.as_str().to_string()),
            arrest_date: context.arrest_date,
            involved_parties: context.involved_parties.clone(),
        };
        let scanner = self.violation_scanner.clone();
        let profile = context.analyzer_profile_version.clone();
        let mut violations = self
            .run_stage("violation_scan", &mut analysis.timings, || {
                let scanner = scanner.clone();
                let corpus = corpus.clone();
                let violation_context = violation_context.clone();
                let profile = profile.clone();
                async move { scanner.scan(&corpus, &violation_context, &profile) }
            })
            .await
            .map_err(|e| ("violation_scan".to_string(), e))?;

        violations = AnalysisResult::collapse_overlapping_same_rule(violations);
        AnalysisResult::sort_violations(&mut violations);
        analysis.violations = violations;

        // Chain-of-custody length is the number of audit events already
        // recorded against this evidence (at minimum, its own
        // `evidence.ingested` event) — not a fixed stand-in value.
        let chain_of_custody_length =
            self.audit.chain_for_evidence(evidence.id).await.map_err(|e| ("chain_lookup".to_string(), e))?.len() as u32;
        let attributes = ComplianceAttributes {
            declared_type: evidence.declared_type,
            is_original: evidence.is_original,
            authenticated: evidence.authenticated,
            chain_of_custody_length,
        };
        let checker = self.compliance_checker.clone();
        let violations_for_compliance = analysis.violations.clone();
        analysis.compliance = self
            .run_stage("compliance_check", &mut analysis.timings, || {
                let checker = checker.clone();
                let violations = violations_for_compliance.clone();
                async move { checker.check(attributes, &violations) }
            })
            .await
            .map_err(|e| ("compliance_check".to_string(), e))?;

        let recommender = self.motion_recommender.clone();
        let violations_for_motions = analysis.violations.clone();
        let compliance_for_motions = analysis.compliance.clone();
        analysis.recommended_motions = self
            .run_stage("motion_recommend", &mut analysis.timings, || {
                let recommender = recommender.clone();
                let violations = violations_for_motions.clone();
                let compliance = compliance_for_motions.clone();
                async move { recommender.recommend(&violations, &compliance) }
            })
            .await
            .map_err(|e| ("motion_recommend".to_string(), e))?;

        let synthesizer = self.report_synthesizer.clone();
        let transcript_ref = analysis.transcript.clone();
        let ocr_ref = analysis.ocr.clone();
        let violations_for_synthesis = analysis.violations.clone();
        let compliance_for_synthesis = analysis.compliance.clone();
        let motions_for_synthesis = analysis.recommended_motions.clone();
        let synthesis: Synthesis = self
            .run_stage("report_synthesis", &mut analysis.timings, || {
                let synthesizer = synthesizer.clone();
                let transcript_ref = transcript_ref.clone();
                let ocr_ref = ocr_ref.clone();
                let violations = violations_for_synthesis.clone();
                let compliance = compliance_for_synthesis.clone();
                let motions = motions_for_synthesis.clone();
                async move {
                    let input = SynthesisInput {
                        transcript: transcript_ref.as_ref(),
                        ocr: ocr_ref.as_ref(),
                        violations: &violations,
                        compliance: &compliance,
                        motions: &motions,
                    };
                    synthesizer.synthesize(input)
                }
            })
            .await
            .map_err(|e| ("report_synthesis".to_string(), e))?;
        analysis.executive_summary = synthesis.executive_summary;
        analysis.citations = synthesis.citations;

        Ok(())
    }

    /// Runs a cacheable stage (transcription/OCR) with retry, storing the
    /// successful output at `<cache_prefix>:<fingerprint>` so a later
    /// retry or `Reprocess` resumes from the first non-cached stage
    /// (spec.md §4.1: "Partial stage outputs that completed successfully
    /// are still cached and remain valid for a future retry").
    async fn run_cached_stage<T, F, Fut>(
        &self,
        stage_name: &'static str,
        fingerprint: &Fingerprint,
        cache_prefix: &str,
        ttl: Duration,
        timings: &mut StageTimings,
        call: F,
    ) -> Result<T, CoreError>
    where
        T: serde::Serialize + serde::de::DeserializeOwned,
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let key = fingerprint.cache_key(cache_prefix);
        if let Some(bytes) = self.cache.get(&key).await {
            if let Ok(value) = serde_json::from_slice::<T>(&bytes) {
                timings.record(stage_name, 1, true, Duration::from_millis(0), None);
                return Ok(value);
            }
        }
        let value = self.run_stage(stage_name, timings, call).await?;
        if let Ok(bytes) = serde_json::to_vec(&value) {
            self.cache.set(&key, bytes, ttl).await;
        }
        Ok(value)
    }

    /// The retry/backoff core (spec.md §4.1): standard retryable errors
    /// get at most [`MAX_ATTEMPTS`] tries with exponential backoff;
    /// `DependencyUnavailable` instead gets a wall-clock budget of
    /// [`DEPENDENCY_UNAVAILABLE_BUDGET`] before it degrades to fatal.
    async fn run_stage<T, F, Fut>(&self, stage_name: &'static str, timings: &mut StageTimings, call: F) -> Result<T, CoreError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let dependency_started = std::time::Instant::now();
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let started = std::time::Instant::now();
            let outcome = call().await;
            let elapsed = started.elapsed();
            match outcome {
                Ok(value) => {
                    timings.record(stage_name, attempt, true, elapsed, None);
                    self.metrics.record_duration(stage_name, elapsed, false);
                    return Ok(value);
                }
                Err(err) => {
                    timings.record(stage_name, attempt, false, elapsed, Some(err.kind()));
                    self.metrics.record_duration(stage_name, elapsed, true);

                    if err.retryability() != Retryability::Retryable {
                        return Err(err);
                    }
                    let is_dependency_unavailable = matches!(err, CoreError::DependencyUnavailable(_));
                    if is_dependency_unavailable {
                        if dependency_started.elapsed() >= DEPENDENCY_UNAVAILABLE_BUDGET {
                            return Err(err);
                        }
                    } else if attempt >= MAX_ATTEMPTS {
                        return Err(err);
                    }
                    tokio::time::sleep(backoff_duration(attempt)).await;
                }
            }
        }
    }
}

fn backoff_duration(attempt: u32) -> Duration {
    let base_ms = BACKOFF_BASE.as_millis() as f64 * 2f64.powi((attempt.saturating_sub(1)) as i32);
    let jitter_frac = rand::random::<f64>() * 0.5 - 0.25; // ±25%
    let ms = (base_ms * (1.0 + jitter_frac)).max(0.0);
    Duration::from_millis(ms as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_exponentially_within_jitter() {
        for attempt in 1..=3u32 {
            let d = backoff_duration(attempt);
            let base = 1000f64 * 2f64.powi((attempt - 1) as i32);
            let lower = (base * 0.75) as u128;
            let upper = (base * 1.25) as u128;
            assert!(d.as_millis() >= lower && d.as_millis() <= upper, "attempt {attempt}: {d:?}");
        }
    }
}
