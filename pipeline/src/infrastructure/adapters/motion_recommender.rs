// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Motion Recommender (spec.md §4.6): a pure lookup from violation/
//! compliance rule id to a candidate motion (SPEC_FULL.md §4.6 catalog).
//! One motion is produced per distinct motion name, deterministically
//! ordered by that name, regardless of how many triggering rules it
//! collects.

use evidence_domain::entities::{Citation, ComplianceReport, RecommendedMotion, Violation};
use evidence_domain::error::CoreError;
use evidence_domain::services::MotionRecommenderStage;
use std::collections::BTreeMap;

struct MotionTemplate {
    name: &'static str,
    rationale: &'static str,
}

fn motion_for_rule(rule_id: &str) -> Option<MotionTemplate> {
    match rule_id {
        "MIRANDA-001" => Some(MotionTemplate {
            name: "Motion to Suppress Statements",
            rationale: "absence of Miranda warning prior to custodial interrogation",
        }),
        "CUSTODY-002" | "COMP-CHAIN-003" | "COMP-CHAIN-004" => Some(MotionTemplate {
            name: "Motion to Exclude Evidence (Chain of Custody)",
            rationale: "chain-of-custody defect undermines evidentiary reliability",
        }),
        "CONSENT-003" => Some(MotionTemplate {
            name: "Motion to Suppress Evidence (Unlawful Search)",
            rationale: "search conducted without warrant or documented consent",
        }),
        "COMP-AUTH-002" => Some(MotionTemplate {
            name: "Motion to Challenge Authentication",
            rationale: "evidence authenticity not established",
        }),
        "LANG-006" => Some(MotionTemplate {
            name: "Motion for Mistrial (Language Access)",
            rationale: "interpreter access denial prejudiced the proceeding",
        }),
        _ => None,
    }
}

pub struct CatalogMotionRecommender;

impl Default for CatalogMotionRecommender {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogMotionRecommender {
    pub fn new() -> Self {
        Self
    }
}

impl MotionRecommenderStage for CatalogMotionRecommender {
    fn recommend(
        &self,
        violations: &[Violation],
        compliance: &ComplianceReport,
    ) -> Result<Vec<RecommendedMotion>, CoreError> {
        let mut by_motion: BTreeMap<&'static str, (&'static str, Vec<String>, Vec<Citation>)> = BTreeMap::new();

        for v in violations {
            if let Some(template) = motion_for_rule(&v.rule_id) {
                let entry = by_motion.entry(template.name).or_insert((template.rationale, Vec::new(), Vec::new()));
                entry.1.push(v.rule_id.clone());
                entry.2.extend(v.citations.iter().cloned());
            }
        }
        for issue in &compliance.issues {
            if let Some(template) = motion_for_rule(&issue.rule_id) {
                let entry = by_motion.entry(template.name).or_insert((template.rationale, Vec::new(), Vec::new()));
                entry.1.push(issue.rule_id.clone());
            }
        }

        let motions = by_motion
            .into_iter()
            .map(|(name, (rationale, mut rule_ids, mut citations))| {
                rule_ids.sort();
                rule_ids.dedup();
                citations.dedup_by(|a, b| a.source == b.source && a.reference == b.reference);
                RecommendedMotion {
                    name: name.to_string(),
                    rationale: rationale.to_string(),
                    supporting_rule_ids: rule_ids,
                    supporting_citations: citations,
                }
            })
            .collect();

        Ok(motions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evidence_domain::entities::ComplianceStatus;
    use evidence_domain::value_objects::Severity;

    fn violation(rule_id: &str) -> Violation {
        Violation {
            rule_id: rule_id.to_string(),
            rule_name: rule_id.to_string(),
            severity: Severity::High,
            match_offset: 0,
            match_length: 0,
            excerpt: String::new(),
            citations: vec![],
        }
    }

    #[test]
    fn one_motion_per_distinct_name_even_with_multiple_triggering_rules() {
        let recommender = CatalogMotionRecommender::new();
        let violations = vec![violation("CUSTODY-002")];
        let compliance = ComplianceReport {
            issues: vec![evidence_domain::entities::ComplianceIssue {
                rule_id: "COMP-CHAIN-003".to_string(),
                description: String::new(),
                severity: Severity::Critical,
            }],
            overall_status: ComplianceStatus::NonCompliant,
        };

        let motions = recommender.recommend(&violations, &compliance).unwrap();
        assert_eq!(motions.len(), 1);
        assert_eq!(motions[0].name, "Motion to Exclude Evidence (Chain of Custody)");
        assert_eq!(motions[0].supporting_rule_ids, vec!["COMP-CHAIN-003", "CUSTODY-002"]);
    }

    #[test]
    fn unmapped_rules_produce_no_motion() {
        let recommender = CatalogMotionRecommender::new();
        let violations = vec![violation("RECORD-004")];
        let compliance = ComplianceReport { issues: vec![], overall_status: ComplianceStatus::Compliant };
        assert!(recommender.recommend(&violations, &compliance).unwrap().is_empty());
    }

    #[test]
    fn motions_are_ordered_deterministically_by_name() {
        let recommender = CatalogMotionRecommender::new();
        let violations = vec![violation("LANG-006"), violation("MIRANDA-001")];
        let compliance = ComplianceReport { issues: vec![], overall_status: ComplianceStatus::Compliant };

        let motions = recommender.recommend(&violations, &compliance).unwrap();
        let names: Vec<_> = motions.iter().map(|m| m.name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }
}
