// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Stage adapters for `evidence_domain::services::stage_ports` (spec.md
//! §4.2–§4.7). Transcription and OCR are I/O-bound and provider-shaped;
//! the Violation Scanner, Compliance Checker, Motion Recommender, and
//! Report Synthesizer are pure functions over an analyzer profile.

pub mod compliance_checker;
pub mod motion_recommender;
pub mod ocr;
pub mod report_synthesizer;
pub mod transcription;
pub mod violation_scanner;

pub use compliance_checker::RuleBasedComplianceChecker;
pub use motion_recommender::CatalogMotionRecommender;
pub use ocr::{FixtureOcrStage, LocalOcrStage};
pub use report_synthesizer::CanonicalReportSynthesizer;
pub use transcription::{FixtureTranscriptionStage, LocalTranscriptionStage};
pub use violation_scanner::RuleBasedViolationScanner;
