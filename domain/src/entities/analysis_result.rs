// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! AnalysisResult — the processor's output (spec.md §3, §4.1).
//!
//! Immutable once `completed`. The state machine is:
//! `pending -> running -> completed`, `running -> failed`,
//! `failed -> running` (explicit reprocess, fingerprint unchanged).

use crate::value_objects::{AnalysisId, AnalyzerProfileVersion, EvidenceId, Fingerprint, Severity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisState {
    Pending,
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrPage {
    pub page_number: u32,
    pub text: String,
    pub average_confidence_pct: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    pub text: String,
    pub duration_seconds: u64,
    pub average_confidence_pct: u32,
    pub detected_language: Option<String>,
    pub segments: Vec<TranscriptSegment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub start_sec: u64,
    pub end_sec: u64,
    pub speaker_label: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrOutput {
    pub pages: Vec<OcrPage>,
    pub aggregated_text: String,
    pub page_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub source: String,
    pub reference: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub rule_id: String,
    pub rule_name: String,
    pub severity: Severity,
    pub match_offset: usize,
    pub match_length: usize,
    pub excerpt: String,
    pub citations: Vec<Citation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    Compliant,
    CompliantWithCaveats,
    NonCompliant,
}

impl ComplianceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ComplianceStatus::Compliant => "compliant",
            ComplianceStatus::CompliantWithCaveats => "compliant-with-caveats",
            ComplianceStatus::NonCompliant => "non-compliant",
        }
    }

    /// Overall status is the maximum severity present (spec.md §4.5): any
    /// critical/high -> non-compliant; any medium -> compliant-with-caveats;
    /// else compliant.
    pub fn from_max_severity(max: Option<Severity>) -> Self {
        match max {
            Some(Severity::Critical) | Some(Severity::High) => ComplianceStatus::NonCompliant,
            Some(Severity::Medium) => ComplianceStatus::CompliantWithCaveats,
            _ => ComplianceStatus::Compliant,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceIssue {
    pub rule_id: String,
    pub description: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub issues: Vec<ComplianceIssue>,
    pub overall_status: ComplianceStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendedMotion {
    pub name: String,
    pub rationale: String,
    pub supporting_rule_ids: Vec<String>,
    pub supporting_citations: Vec<Citation>,
}

/// One attempt of one stage, recorded regardless of outcome (spec.md §4.1
/// "records per-stage timings"; S5 "three recorded stage attempts").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageAttempt {
    pub stage: String,
    pub attempt: u32,
    pub succeeded: bool,
    pub duration_ms: u64,
    pub error_kind: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageTimings {
    pub attempts: Vec<StageAttempt>,
}

impl StageTimings {
    pub fn record(&mut self, stage: &str, attempt: u32, succeeded: bool, duration: Duration, error_kind: Option<&str>) {
        self.attempts.push(StageAttempt {
            stage: stage.to_string(),
            attempt,
            succeeded,
            duration_ms: duration.as_millis() as u64,
            error_kind: error_kind.map(str::to_string),
        });
    }

    /// Number of *retry* attempts beyond the first, for a given stage
    /// (S5: "retry count = 2").
    pub fn retry_count(&self, stage: &str) -> u32 {
        self.attempts.iter().filter(|a| a.stage == stage).count().saturating_sub(1) as u32
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub id: AnalysisId,
    pub evidence_id: EvidenceId,
    pub fingerprint: Fingerprint,
    pub analyzer_profile_version: AnalyzerProfileVersion,
    pub transcript: Option<Transcript>,
    pub ocr: Option<OcrOutput>,
    pub violations: Vec<Violation>,
    pub compliance: ComplianceReport,
    pub recommended_motions: Vec<RecommendedMotion>,
    pub citations: Vec<Citation>,
    pub executive_summary: String,
    pub state: AnalysisState,
    pub failed_stage: Option<String>,
    pub timings: StageTimings,
    #[serde(with = "crate::services::datetime_serde")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(with = "crate::services::datetime_serde::optional")]
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl AnalysisResult {
    pub fn pending(
        evidence_id: EvidenceId,
        fingerprint: Fingerprint,
        analyzer_profile_version: AnalyzerProfileVersion,
    ) -> Self {
        Self {
            id: AnalysisId::new(),
            evidence_id,
            fingerprint,
            analyzer_profile_version,
            transcript: None,
            ocr: None,
            violations: Vec::new(),
            compliance: ComplianceReport { issues: Vec::new(), overall_status: ComplianceStatus::Compliant },
            recommended_motions: Vec::new(),
            citations: Vec::new(),
            executive_summary: String::new(),
            state: AnalysisState::Pending,
            failed_stage: None,
            timings: StageTimings::default(),
            created_at: chrono::Utc::now(),
            completed_at: None,
        }
    }

    pub fn start_running(&mut self) {
        self.state = AnalysisState::Running;
    }

    pub fn complete(&mut self, at: chrono::DateTime<chrono::Utc>) {
        self.state = AnalysisState::Completed;
        self.completed_at = Some(at);
        self.failed_stage = None;
    }

    pub fn fail(&mut self, failing_stage: impl Into<String>) {
        self.state = AnalysisState::Failed;
        self.failed_stage = Some(failing_stage.into());
    }

    /// Ordering of violations: severity descending, then rule id
    /// ascending, then match offset ascending (spec.md §4.1).
    pub fn sort_violations(violations: &mut [Violation]) {
        violations.sort_by(|a, b| {
            b.severity
                .cmp(&a.severity)
                .then_with(|| a.rule_id.cmp(&b.rule_id))
                .then_with(|| a.match_offset.cmp(&b.match_offset))
        });
    }

    /// Deduplicates violations of the same rule at overlapping offsets to
    /// their earliest offset (spec.md §4.4: "overlapping matches of the
    /// *same* rule are collapsed to the earliest offset").
    pub fn collapse_overlapping_same_rule(mut violations: Vec<Violation>) -> Vec<Violation> {
        violations.sort_by_key(|v| (v.rule_id.clone(), v.match_offset));
        let mut collapsed: Vec<Violation> = Vec::with_capacity(violations.len());
        for v in violations {
            let overlaps_prev = collapsed.last().is_some_and(|prev: &Violation| {
                prev.rule_id == v.rule_id && v.match_offset < prev.match_offset + prev.match_length
            });
            if !overlaps_prev {
                collapsed.push(v);
            }
        }
        collapsed
    }
}

/// Groups violations by the ids of rules they involve, used by the Motion
/// Recommender to pick at most one motion per distinct violated rule
/// (spec.md §4.6).
pub fn group_rule_ids(violations: &[Violation]) -> BTreeMap<String, Severity> {
    let mut map = BTreeMap::new();
    for v in violations {
        map.entry(v.rule_id.clone())
            .and_modify(|s: &mut Severity| {
                if v.severity > *s {
                    *s = v.severity;
                }
            })
            .or_insert(v.severity);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(rule: &str, sev: Severity, offset: usize, len: usize) -> Violation {
        Violation {
            rule_id: rule.to_string(),
            rule_name: rule.to_string(),
            severity: sev,
            match_offset: offset,
            match_length: len,
            excerpt: String::new(),
            citations: vec![],
        }
    }

    #[test]
    fn sorts_by_severity_then_rule_then_offset() {
        let mut vs = vec![
            v("B-001", Severity::Low, 10, 1),
            v("A-001", Severity::Critical, 5, 1),
            v("A-001", Severity::Critical, 1, 1),
        ];
        AnalysisResult::sort_violations(&mut vs);
        assert_eq!(vs[0].match_offset, 1);
        assert_eq!(vs[1].match_offset, 5);
        assert_eq!(vs[2].rule_id, "B-001");
    }

    #[test]
    fn collapses_overlapping_same_rule_to_earliest_offset() {
        let vs = vec![v("A-001", Severity::High, 0, 10), v("A-001", Severity::High, 5, 10)];
        let collapsed = AnalysisResult::collapse_overlapping_same_rule(vs);
        assert_eq!(collapsed.len(), 1);
        assert_eq!(collapsed[0].match_offset, 0);
    }

    #[test]
    fn keeps_non_overlapping_same_rule_matches_distinct() {
        let vs = vec![v("A-001", Severity::High, 0, 5), v("A-001", Severity::High, 100, 5)];
        let collapsed = AnalysisResult::collapse_overlapping_same_rule(vs);
        assert_eq!(collapsed.len(), 2);
    }

    #[test]
    fn keeps_overlapping_distinct_rules_separate() {
        let vs = vec![v("A-001", Severity::High, 0, 10), v("B-002", Severity::High, 5, 10)];
        let collapsed = AnalysisResult::collapse_overlapping_same_rule(vs);
        assert_eq!(collapsed.len(), 2);
    }
}
