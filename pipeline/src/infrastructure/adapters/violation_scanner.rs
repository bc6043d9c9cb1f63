// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Violation Scanner (spec.md §4.4): a pure, deterministic regex scan over
//! the corpus. The rule set is data (`ViolationRule`) so bumping the
//! analyzer profile version can change rules without touching this file.

use evidence_domain::entities::{Citation, Violation};
use evidence_domain::error::CoreError;
use evidence_domain::services::{ViolationContext, ViolationScannerStage};
use evidence_domain::value_objects::{AnalyzerProfileVersion, Severity};
use once_cell::sync::Lazy;
use regex::Regex;

pub struct ViolationRule {
    pub id: &'static str,
    pub name: &'static str,
    pub severity: Severity,
    pub pattern: &'static Lazy<Regex>,
    pub citations: &'static [(&'static str, &'static str)],
}

static MIRANDA_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)right to remain silent").unwrap());
static CUSTODY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)evidence (?:was )?(?:lost|misplaced|unaccounted)").unwrap());
static CONSENT_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)search(?:ed)? without (?:a )?warrant").unwrap());
static CONSENT_GIVEN_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)consent given").unwrap());
static RECORDING_GAP_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)recording (?:stopped|paused|interrupted)").unwrap());
static UNIDENTIFIED_OFFICER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)officer (?:did not|failed to) identify").unwrap());
static NO_INTERPRETER_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(?:no|without) interpreter").unwrap());
static AN_ARREST_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\barrest").unwrap());
static NON_ENGLISH_HINT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(spanish|mandarin|vietnamese|tagalog|korean|arabic)\b").unwrap());

/// `analyzer-profile-version` `v3`, the reference rule set (SPEC_FULL.md
/// §4.4 rule table). `MIRANDA-001` and `LANG-006` need corpus-wide
/// co-occurrence checks rather than a single regex match, so they are
/// evaluated directly in [`RuleBasedViolationScanner::scan`] instead of
/// through the data-driven table below.
static DATA_DRIVEN_RULES: Lazy<Vec<ViolationRule>> = Lazy::new(|| {
    vec![
        ViolationRule {
            id: "CUSTODY-002",
            name: "Chain-of-custody gap referenced",
            severity: Severity::High,
            pattern: &CUSTODY_PATTERN,
            citations: &[("Evidence Handling Manual", "§4.2 Continuous Custody")],
        },
        ViolationRule {
            id: "RECORD-004",
            name: "Recording gap",
            severity: Severity::Medium,
            pattern: &RECORDING_GAP_PATTERN,
            citations: &[("Recording Protocol", "§2.1 Continuous Capture")],
        },
        ViolationRule {
            id: "ID-005",
            name: "Unidentified officer",
            severity: Severity::Low,
            pattern: &UNIDENTIFIED_OFFICER_PATTERN,
            citations: &[("Department Policy", "§7.3 Officer Identification")],
        },
    ]
});

fn excerpt(corpus: &str, offset: usize, length: usize) -> String {
    let pad = 20usize;
    let mut start = offset.saturating_sub(pad);
    let mut end = (offset + length + pad).min(corpus.len());
    while start > 0 && !corpus.is_char_boundary(start) {
        start -= 1;
    }
    while end < corpus.len() && !corpus.is_char_boundary(end) {
        end += 1;
    }
    corpus.get(start..end).unwrap_or_default().to_string()
}

fn citations_of(rule: &ViolationRule) -> Vec<Citation> {
    rule.citations.iter().map(|(source, reference)| Citation { source: source.to_string(), reference: reference.to_string() }).collect()
}

pub struct RuleBasedViolationScanner;

impl Default for RuleBasedViolationScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleBasedViolationScanner {
    pub fn new() -> Self {
        Self
    }

    fn scan_miranda(&self, corpus: &str) -> Option<Violation> {
        if !AN_ARREST_PATTERN.is_match(corpus) {
            return None;
        }
        let first_interrogative = corpus.find('?');
        let warning_offset = MIRANDA_PATTERN.find(corpus).map(|m| m.start());
        let warning_before_question = match (warning_offset, first_interrogative) {
            (Some(w), Some(q)) => w < q,
            (Some(_), None) => true,
            _ => false,
        };
        if warning_before_question {
            return None;
        }
        Some(Violation {
            rule_id: "MIRANDA-001".to_string(),
            rule_name: "Miranda warning absent".to_string(),
            severity: Severity::Critical,
            match_offset: 0,
            match_length: 0,
            excerpt: excerpt(corpus, 0, corpus.len().min(40)),
            citations: vec![Citation {
                source: "Miranda v. Arizona".to_string(),
                reference: "384 U.S. 436 (1966)".to_string(),
            }],
        })
    }

    fn scan_consent(&self, corpus: &str) -> Option<Violation> {
        let m = CONSENT_PATTERN.find(corpus)?;
        if CONSENT_GIVEN_PATTERN.is_match(corpus) {
            return None;
        }
        Some(Violation {
            rule_id: "CONSENT-003".to_string(),
            rule_name: "Search without consent phrase".to_string(),
            severity: Severity::High,
            match_offset: m.start(),
            match_length: m.len(),
            excerpt: excerpt(corpus, m.start(), m.len()),
            citations: vec![Citation {
                source: "Fourth Amendment".to_string(),
                reference: "U.S. Const. amend. IV".to_string(),
            }],
        })
    }

    fn scan_language_access(&self, corpus: &str, context: &ViolationContext) -> Option<Violation> {
        let m = NO_INTERPRETER_PATTERN.find(corpus)?;
        let context_mentions_language = context.involved_parties.iter().any(|p| NON_ENGLISH_HINT_PATTERN.is_match(p))
            || NON_ENGLISH_HINT_PATTERN.is_match(corpus);
        if !context_mentions_language {
            return None;
        }
        Some(Violation {
            rule_id: "LANG-006".to_string(),
            rule_name: "No interpreter provided".to_string(),
            severity: Severity::Medium,
            match_offset: m.start(),
            match_length: m.len(),
            excerpt: excerpt(corpus, m.start(), m.len()),
            citations: vec![Citation {
                source: "Court Interpreters Act".to_string(),
                reference: "28 U.S.C. § 1827".to_string(),
            }],
        })
    }
}

impl ViolationScannerStage for RuleBasedViolationScanner {
    fn scan(
        &self,
        corpus: &str,
        context: &ViolationContext,
        _profile_version: &AnalyzerProfileVersion,
    ) -> Result<Vec<Violation>, CoreError> {
        let mut violations = Vec::new();

        for rule in DATA_DRIVEN_RULES.iter() {
            for m in rule.pattern.find_iter(corpus) {
                violations.push(Violation {
                    rule_id: rule.id.to_string(),
                    rule_name: rule.name.to_string(),
                    severity: rule.severity,
                    match_offset: m.start(),
                    match_length: m.len(),
                    excerpt: excerpt(corpus, m.start(), m.len()),
                    citations: citations_of(rule),
                });
            }
        }

        violations.extend(self.scan_miranda(corpus));
        violations.extend(self.scan_consent(corpus));
        violations.extend(self.scan_language_access(corpus, context));

        violations.sort_by_key(|v| v.match_offset);
        Ok(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> AnalyzerProfileVersion {
        AnalyzerProfileVersion::new("v3")
    }

    #[test]
    fn flags_miranda_absence_during_arrest() {
        let scanner = RuleBasedViolationScanner::new();
        let corpus = "Officer made the arrest. Where were you on the night of the 4th?";
        let violations = scanner.scan(corpus, &ViolationContext::default(), &profile()).unwrap();
        assert!(violations.iter().any(|v| v.rule_id == "MIRANDA-001"));
    }

    #[test]
    fn does_not_flag_miranda_when_warning_precedes_question() {
        let scanner = RuleBasedViolationScanner::new();
        let corpus = "Officer made the arrest. You have the right to remain silent. Where were you?";
        let violations = scanner.scan(corpus, &ViolationContext::default(), &profile()).unwrap();
        assert!(!violations.iter().any(|v| v.rule_id == "MIRANDA-001"));
    }

    #[test]
    fn flags_consent_gap_only_without_consent_given() {
        let scanner = RuleBasedViolationScanner::new();
        let flagged = scanner
            .scan("Officers searched without a warrant.", &ViolationContext::default(), &profile())
            .unwrap();
        assert!(flagged.iter().any(|v| v.rule_id == "CONSENT-003"));

        let not_flagged = scanner
            .scan("Officers searched without a warrant; consent given verbally.", &ViolationContext::default(), &profile())
            .unwrap();
        assert!(!not_flagged.iter().any(|v| v.rule_id == "CONSENT-003"));
    }

    #[test]
    fn flags_custody_gap_and_recording_gap_and_unidentified_officer() {
        let scanner = RuleBasedViolationScanner::new();
        let corpus = "The evidence was lost in transit. Recording stopped at minute 4. Officer failed to identify himself.";
        let violations = scanner.scan(corpus, &ViolationContext::default(), &profile()).unwrap();
        let ids: Vec<_> = violations.iter().map(|v| v.rule_id.as_str()).collect();
        assert!(ids.contains(&"CUSTODY-002"));
        assert!(ids.contains(&"RECORD-004"));
        assert!(ids.contains(&"ID-005"));
    }

    #[test]
    fn flags_language_access_only_with_non_english_context() {
        let scanner = RuleBasedViolationScanner::new();
        let context = ViolationContext { involved_parties: vec!["Spanish-speaking witness".into()], ..Default::default() };
        let flagged = scanner.scan("No interpreter was made available.", &context, &profile()).unwrap();
        assert!(flagged.iter().any(|v| v.rule_id == "LANG-006"));

        let not_flagged =
            scanner.scan("No interpreter was made available.", &ViolationContext::default(), &profile()).unwrap();
        assert!(!not_flagged.iter().any(|v| v.rule_id == "LANG-006"));
    }

    #[test]
    fn two_non_overlapping_occurrences_of_the_same_rule_are_two_violations() {
        let scanner = RuleBasedViolationScanner::new();
        let corpus = "The evidence was lost in transit. Then a second piece of evidence was misplaced at the station.";
        let violations = scanner.scan(corpus, &ViolationContext::default(), &profile()).unwrap();
        let custody_matches: Vec<_> = violations.iter().filter(|v| v.rule_id == "CUSTODY-002").collect();
        assert_eq!(custody_matches.len(), 2);
        assert_ne!(custody_matches[0].match_offset, custody_matches[1].match_offset);
    }

    #[test]
    fn scan_is_deterministic_for_the_same_input() {
        let scanner = RuleBasedViolationScanner::new();
        let corpus = "The evidence was lost in transit.";
        let first = scanner.scan(corpus, &ViolationContext::default(), &profile()).unwrap();
        let second = scanner.scan(corpus, &ViolationContext::default(), &profile()).unwrap();
        assert_eq!(first, second);
    }
}
