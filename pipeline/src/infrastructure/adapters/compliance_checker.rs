// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Compliance Checker (spec.md §4.5): pure function over
//! [`ComplianceAttributes`] and the already-computed violations. Overall
//! status is the maximum severity present, per
//! [`ComplianceStatus::from_max_severity`](evidence_domain::entities::ComplianceStatus::from_max_severity).

use evidence_domain::entities::{ComplianceIssue, ComplianceReport, ComplianceStatus, Violation};
use evidence_domain::error::CoreError;
use evidence_domain::services::{ComplianceAttributes, ComplianceCheckerStage};
use evidence_domain::value_objects::{DeclaredType, Severity};

pub struct RuleBasedComplianceChecker;

impl Default for RuleBasedComplianceChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleBasedComplianceChecker {
    pub fn new() -> Self {
        Self
    }
}

impl ComplianceCheckerStage for RuleBasedComplianceChecker {
    fn check(&self, attributes: ComplianceAttributes, violations: &[Violation]) -> Result<ComplianceReport, CoreError> {
        let mut issues = Vec::new();

        let tampering_already_flagged = violations.iter().any(|v| v.rule_id == "CUSTODY-002");
        if !attributes.is_original && !tampering_already_flagged {
            issues.push(ComplianceIssue {
                rule_id: "COMP-ORIG-001".to_string(),
                description: "Evidence is not the original artifact and no chain-of-custody violation already flags tampering.".to_string(),
                severity: Severity::Medium,
            });
        }

        if !attributes.authenticated {
            issues.push(ComplianceIssue {
                rule_id: "COMP-AUTH-002".to_string(),
                description: "Evidence authenticity has not been established.".to_string(),
                severity: Severity::High,
            });
        }

        match attributes.chain_of_custody_length {
            0 => issues.push(ComplianceIssue {
                rule_id: "COMP-CHAIN-003".to_string(),
                description: "No chain-of-custody record exists for this evidence.".to_string(),
                severity: Severity::Critical,
            }),
            1..=2 => issues.push(ComplianceIssue {
                rule_id: "COMP-CHAIN-004".to_string(),
                description: "Chain-of-custody record is thin (fewer than three custodians recorded).".to_string(),
                severity: Severity::Medium,
            }),
            _ => {}
        }

        if attributes.declared_type == DeclaredType::Other {
            issues.push(ComplianceIssue {
                rule_id: "COMP-TYPE-005".to_string(),
                description: "Declared type is unclassified and needs manual review.".to_string(),
                severity: Severity::Low,
            });
        }

        let max_severity = issues.iter().map(|i| i.severity).max();
        Ok(ComplianceReport { overall_status: ComplianceStatus::from_max_severity(max_severity), issues })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(is_original: bool, authenticated: bool, chain_len: u32, declared_type: DeclaredType) -> ComplianceAttributes {
        ComplianceAttributes { declared_type, is_original, authenticated, chain_of_custody_length: chain_len }
    }

    #[test]
    fn flags_nothing_for_a_clean_record() {
        let checker = RuleBasedComplianceChecker::new();
        let report = checker.check(attrs(true, true, 5, DeclaredType::Video), &[]).unwrap();
        assert!(report.issues.is_empty());
        assert_eq!(report.overall_status, ComplianceStatus::Compliant);
    }

    #[test]
    fn empty_chain_is_critical_and_non_compliant() {
        let checker = RuleBasedComplianceChecker::new();
        let report = checker.check(attrs(true, true, 0, DeclaredType::Video), &[]).unwrap();
        assert!(report.issues.iter().any(|i| i.rule_id == "COMP-CHAIN-003"));
        assert_eq!(report.overall_status, ComplianceStatus::NonCompliant);
    }

    #[test]
    fn thin_chain_is_compliant_with_caveats() {
        let checker = RuleBasedComplianceChecker::new();
        let report = checker.check(attrs(true, true, 2, DeclaredType::Video), &[]).unwrap();
        assert!(report.issues.iter().any(|i| i.rule_id == "COMP-CHAIN-004"));
        assert_eq!(report.overall_status, ComplianceStatus::CompliantWithCaveats);
    }

    #[test]
    fn non_original_is_suppressed_when_custody_violation_already_present() {
        let checker = RuleBasedComplianceChecker::new();
        let custody_violation = Violation {
            rule_id: "CUSTODY-002".to_string(),
            rule_name: "Chain-of-custody gap referenced".to_string(),
            severity: Severity::High,
            match_offset: 0,
            match_length: 0,
            excerpt: String::new(),
            citations: vec![],
        };
        let report = checker.check(attrs(false, true, 5, DeclaredType::Video), &[custody_violation]).unwrap();
        assert!(!report.issues.iter().any(|i| i.rule_id == "COMP-ORIG-001"));
    }

    #[test]
    fn unclassified_type_is_flagged_low() {
        let checker = RuleBasedComplianceChecker::new();
        let report = checker.check(attrs(true, true, 5, DeclaredType::Other), &[]).unwrap();
        assert!(report.issues.iter().any(|i| i.rule_id == "COMP-TYPE-005" && i.severity == Severity::Low));
    }
}
