// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The Evidence/AnalysisResult aggregate: the consistency boundary that
//! enforces the state machine of spec.md §4.1 (`pending -> running ->
//! completed`, `running -> failed`, `failed -> running`) so the transition
//! guard lives in one place rather than being re-checked at every call
//! site.

use crate::entities::{AnalysisResult, AnalysisState, Evidence};
use crate::error::CoreError;

pub struct EvidenceAggregate {
    pub evidence: Evidence,
    pub analysis: AnalysisResult,
}

impl EvidenceAggregate {
    pub fn new(evidence: Evidence, analysis: AnalysisResult) -> Self {
        Self { evidence, analysis }
    }

    /// Transitions `pending|failed -> running`, acquiring the processing
    /// lease. Rejects a transition out of `completed` (terminal for that
    /// fingerprint, spec.md §4.1) or out of an already-`running` analysis
    /// (single-flight must be enforced by the caller before this point).
    pub fn begin_processing(&mut self) -> Result<(), CoreError> {
        match self.analysis.state {
            AnalysisState::Pending | AnalysisState::Failed => {
                self.evidence.mark_processing();
                self.analysis.start_running();
                Ok(())
            }
            AnalysisState::Running => Err(CoreError::Conflict("analysis already running".into())),
            AnalysisState::Completed => Err(CoreError::Conflict("analysis already completed".into())),
        }
    }

    pub fn complete(&mut self, at: chrono::DateTime<chrono::Utc>) -> Result<(), CoreError> {
        if self.analysis.state != AnalysisState::Running {
            return Err(CoreError::Conflict("cannot complete an analysis that is not running".into()));
        }
        self.evidence.mark_completed(at);
        self.analysis.complete(at);
        Ok(())
    }

    pub fn fail(&mut self, failing_stage: impl Into<String>) -> Result<(), CoreError> {
        if self.analysis.state != AnalysisState::Running {
            return Err(CoreError::Conflict("cannot fail an analysis that is not running".into()));
        }
        self.evidence.mark_failed();
        self.analysis.fail(failing_stage);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::{AnalyzerProfileVersion, ContentDigest, DeclaredType, UserId};

    fn fixture() -> EvidenceAggregate {
        let digest = ContentDigest::of(b"hello");
        let evidence = Evidence::received(UserId::new(), DeclaredType::Document, digest, 5, "f.pdf", "path", None, true, true);
        let fingerprint = crate::value_objects::Fingerprint::compute(
            &digest,
            DeclaredType::Document,
            &AnalyzerProfileVersion::default(),
            None,
        );
        let analysis = AnalysisResult::pending(evidence.id, fingerprint, AnalyzerProfileVersion::default());
        EvidenceAggregate::new(evidence, analysis)
    }

    #[test]
    fn happy_path_transitions() {
        let mut agg = fixture();
        agg.begin_processing().unwrap();
        assert_eq!(agg.analysis.state, AnalysisState::Running);
        agg.complete(chrono::Utc::now()).unwrap();
        assert_eq!(agg.analysis.state, AnalysisState::Completed);
    }

    #[test]
    fn completed_is_terminal() {
        let mut agg = fixture();
        agg.begin_processing().unwrap();
        agg.complete(chrono::Utc::now()).unwrap();
        assert!(agg.begin_processing().is_err());
    }

    #[test]
    fn failed_can_reprocess() {
        let mut agg = fixture();
        agg.begin_processing().unwrap();
        agg.fail("transcription").unwrap();
        assert_eq!(agg.analysis.state, AnalysisState::Failed);
        agg.begin_processing().unwrap();
        assert_eq!(agg.analysis.state, AnalysisState::Running);
    }
}
