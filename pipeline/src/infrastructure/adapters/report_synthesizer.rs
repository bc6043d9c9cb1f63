// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Report Synthesizer stage (spec.md §4.7): folds the per-stage outputs
//! into the executive summary and citation list that land on
//! [`AnalysisResult`](evidence_domain::entities::AnalysisResult). Producing
//! the final rendered artifacts (canonical JSON, markdown, HTML, PDF) is a
//! separate, application-layer concern —
//! [`crate::application::services::report_renderer::ReportRenderer`] —
//! since it operates on the assembled result rather than the stage
//! outputs this port sees.

use evidence_domain::entities::group_rule_ids;
use evidence_domain::error::CoreError;
use evidence_domain::services::{ReportSynthesizerStage, Synthesis, SynthesisInput};

pub struct CanonicalReportSynthesizer;

impl Default for CanonicalReportSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl CanonicalReportSynthesizer {
    pub fn new() -> Self {
        Self
    }
}

impl ReportSynthesizerStage for CanonicalReportSynthesizer {
    fn synthesize(&self, input: SynthesisInput<'_>) -> Result<Synthesis, CoreError> {
        let mut summary = String::new();

        if let Some(transcript) = input.transcript {
            summary.push_str(&format!(
                "Transcript covers {}s of audio at {}% average confidence. ",
                transcript.duration_seconds, transcript.average_confidence_pct
            ));
        }
        if let Some(ocr) = input.ocr {
            summary.push_str(&format!("Document OCR recovered {} page(s) of text. ", ocr.page_count));
        }

        let rule_ids = group_rule_ids(input.violations);
        if rule_ids.is_empty() {
            summary.push_str("No violations were identified. ");
        } else {
            let names: Vec<&str> = input.violations.iter().map(|v| v.rule_name.as_str()).collect();
            summary.push_str(&format!("{} violation(s) identified: {}. ", rule_ids.len(), names.join(", ")));
        }

        summary.push_str(&format!(
            "Overall compliance status: {}. ",
            input.compliance.overall_status.as_str()
        ));

        if input.motions.is_empty() {
            summary.push_str("No motions are recommended.");
        } else {
            let names: Vec<&str> = input.motions.iter().map(|m| m.name.as_str()).collect();
            summary.push_str(&format!("{} motion(s) recommended: {}.", input.motions.len(), names.join(", ")));
        }

        let mut citations: Vec<_> =
            input.violations.iter().flat_map(|v| v.citations.iter().cloned()).collect();
        citations.extend(input.motions.iter().flat_map(|m| m.supporting_citations.iter().cloned()));
        citations.sort_by(|a, b| (a.source.as_str(), a.reference.as_str()).cmp(&(b.source.as_str(), b.reference.as_str())));
        citations.dedup();

        Ok(Synthesis { executive_summary: summary, citations })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evidence_domain::entities::{Citation, ComplianceReport, ComplianceStatus, RecommendedMotion, Violation};
    use evidence_domain::value_objects::Severity;

    fn violation() -> Violation {
        Violation {
            rule_id: "CUSTODY-002".to_string(),
            rule_name: "Chain-of-custody gap referenced".to_string(),
            severity: Severity::High,
            match_offset: 0,
            match_length: 0,
            excerpt: String::new(),
            citations: vec![Citation { source: "Evidence Handling Manual".into(), reference: "§4.2".into() }],
        }
    }

    #[test]
    fn summarizes_violations_and_compliance_status() {
        let synthesizer = CanonicalReportSynthesizer::new();
        let violations = vec![violation()];
        let compliance = ComplianceReport { issues: vec![], overall_status: ComplianceStatus::NonCompliant };
        let motions = vec![];

        let synthesis = synthesizer
            .synthesize(SynthesisInput { transcript: None, ocr: None, violations: &violations, compliance: &compliance, motions: &motions })
            .unwrap();

        assert!(synthesis.executive_summary.contains("1 violation(s)"));
        assert!(synthesis.executive_summary.contains("non-compliant"));
        assert_eq!(synthesis.citations.len(), 1);
    }

    #[test]
    fn empty_inputs_produce_a_clean_summary() {
        let synthesizer = CanonicalReportSynthesizer::new();
        let compliance = ComplianceReport { issues: vec![], overall_status: ComplianceStatus::Compliant };
        let synthesis = synthesizer
            .synthesize(SynthesisInput { transcript: None, ocr: None, violations: &[], compliance: &compliance, motions: &[] })
            .unwrap();
        assert!(synthesis.executive_summary.contains("No violations"));
        assert!(synthesis.executive_summary.contains("No motions"));
        assert!(synthesis.citations.is_empty());
    }

    #[test]
    fn citations_are_deduplicated_and_sorted() {
        let synthesizer = CanonicalReportSynthesizer::new();
        let violations = vec![violation(), violation()];
        let compliance = ComplianceReport { issues: vec![], overall_status: ComplianceStatus::Compliant };
        let motions: Vec<RecommendedMotion> = vec![];
        let synthesis = synthesizer
            .synthesize(SynthesisInput { transcript: None, ocr: None, violations: &violations, compliance: &compliance, motions: &motions })
            .unwrap();
        assert_eq!(synthesis.citations.len(), 1);
    }
}
