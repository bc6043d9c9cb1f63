// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Stage ports: the interfaces the Evidence Processor dispatches to
//! (spec.md §4.2–§4.7). Infrastructure provides the concrete adapters;
//! the domain only names the contract.
//!
//! All ports are async because every concrete implementation is I/O- or
//! provider-bound (spec.md §5: "transcription external call", "OCR
//! external call" are named blocking points). Downstream stages (Violation
//! Scanner, Compliance Checker, Motion Recommender, Report Synthesizer)
//! are pure functions and therefore synchronous — they take `&self` plus
//! plain data and return a `Result` with no `.await` inside.

use crate::entities::{
    Citation, ComplianceReport, OcrOutput, RecommendedMotion, Transcript, Violation,
};
use crate::error::CoreError;
use crate::value_objects::{AnalyzerProfileVersion, DeclaredType};
use async_trait::async_trait;

/// Context passed to the Violation Scanner (spec.md §4.4).
#[derive(Debug, Clone, Default)]
pub struct ViolationContext {
    pub case_number: Option<String>,
    pub arrest_date: Option<chrono::DateTime<chrono::Utc>>,
    pub involved_parties: Vec<String>,
}

/// Attributes the Compliance Checker evaluates (spec.md §4.5).
#[derive(Debug, Clone, Copy)]
pub struct ComplianceAttributes {
    pub declared_type: DeclaredType,
    pub is_original: bool,
    pub authenticated: bool,
    pub chain_of_custody_length: u32,
}

/// Evidence-side context the Transcription stage needs (spec.md §4.2).
pub struct TranscriptionRequest<'a> {
    pub media_path: &'a str,
    pub declared_type: DeclaredType,
    pub language_hint: Option<&'a str>,
    pub evidence_id: crate::value_objects::EvidenceId,
    pub wall_clock_limit: std::time::Duration,
}

#[async_trait]
pub trait TranscriptionStage: Send + Sync {
    /// MUST NOT mutate the input file (spec.md §4.2). Progress is reported
    /// out-of-band via the Event Bus, not through the return value.
    async fn transcribe(&self, request: TranscriptionRequest<'_>) -> Result<Transcript, CoreError>;
}

pub struct OcrRequest<'a> {
    pub document_path: &'a str,
    pub declared_type: DeclaredType,
    pub evidence_id: crate::value_objects::EvidenceId,
}

#[async_trait]
pub trait OcrStage: Send + Sync {
    async fn extract(&self, request: OcrRequest<'_>) -> Result<OcrOutput, CoreError>;
}

pub trait ViolationScannerStage: Send + Sync {
    /// Deterministic for a fixed `(corpus, context, profile)` triple
    /// (spec.md §4.4).
    fn scan(
        &self,
        corpus: &str,
        context: &ViolationContext,
        profile_version: &AnalyzerProfileVersion,
    ) -> Result<Vec<Violation>, CoreError>;
}

pub trait ComplianceCheckerStage: Send + Sync {
    fn check(
        &self,
        attributes: ComplianceAttributes,
        violations: &[Violation],
    ) -> Result<ComplianceReport, CoreError>;
}

pub trait MotionRecommenderStage: Send + Sync {
    fn recommend(
        &self,
        violations: &[Violation],
        compliance: &ComplianceReport,
    ) -> Result<Vec<RecommendedMotion>, CoreError>;
}

/// Input to the Report Synthesizer (spec.md §4.7): everything needed to
/// produce both the canonical object and its renderings.
pub struct SynthesisInput<'a> {
    pub transcript: Option<&'a Transcript>,
    pub ocr: Option<&'a OcrOutput>,
    pub violations: &'a [Violation],
    pub compliance: &'a ComplianceReport,
    pub motions: &'a [RecommendedMotion],
}

pub struct Synthesis {
    pub executive_summary: String,
    pub citations: Vec<Citation>,
}

pub trait ReportSynthesizerStage: Send + Sync {
    fn synthesize(&self, input: SynthesisInput<'_>) -> Result<Synthesis, CoreError>;
}
