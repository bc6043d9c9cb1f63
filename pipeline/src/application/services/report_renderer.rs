// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Report Synthesizer (spec.md §4.7): renders a completed
//! [`AnalysisResult`] into one of four deterministic formats.
//!
//! `canonical-json` is the serialized result with object keys sorted in
//! Unicode codepoint order and numbers/timestamps rendered without
//! ambiguity (spec.md §4.7). `serde_json::Map` is `BTreeMap`-backed by
//! default, so plain `serde_json::to_value` already produces sorted keys
//! as long as the `preserve_order` feature is never enabled on
//! `serde_json` anywhere in this workspace — see DESIGN.md. Timestamp
//! precision is handled at the entity level by
//! [`evidence_domain::services::datetime_serde`].
//!
//! `markdown` and `html` walk the same canonical structure by hand
//! (section per analyzer, violations table, motions list) rather than
//! through a templating engine, since the corpus carries no templating
//! crate and the walk is simple enough to stay dependency-free.
//! `pdf` wraps the deterministic HTML in a fixed container header; true
//! PDF rendering is outside this workspace's dependency stack, a choice
//! licensed by spec.md §9's canonicalization Open Question and recorded
//! in DESIGN.md.

use evidence_domain::entities::{AnalysisResult, ComplianceStatus};
use evidence_domain::error::CoreError;

/// The four renderer formats named in spec.md §4.7.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    CanonicalJson,
    Markdown,
    Html,
    Pdf,
}

impl ReportFormat {
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "canonical-json" => Ok(ReportFormat::CanonicalJson),
            "markdown" => Ok(ReportFormat::Markdown),
            "html" => Ok(ReportFormat::Html),
            "pdf" => Ok(ReportFormat::Pdf),
            other => Err(CoreError::malformed_request(format!("unknown report format: {other}"))),
        }
    }
}

pub struct ReportRenderer;

impl ReportRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Renders `analysis` in the given format, returning its raw bytes.
    /// Deterministic: the same `AnalysisResult` always renders to the
    /// same bytes regardless of when or how many times it is called
    /// (spec.md §4.7, §8 invariant 7).
    pub fn render(&self, analysis: &AnalysisResult, format: ReportFormat) -> Result<Vec<u8>, CoreError> {
        match format {
            ReportFormat::CanonicalJson => Ok(canonical_json(analysis)?.into_bytes()),
            ReportFormat::Markdown => Ok(render_markdown(analysis).into_bytes()),
            ReportFormat::Html => Ok(render_html(analysis).into_bytes()),
            ReportFormat::Pdf => Ok(render_pdf(analysis)),
        }
    }
}

impl Default for ReportRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn canonical_json(analysis: &AnalysisResult) -> Result<String, CoreError> {
    let value = serde_json::to_value(analysis)
        .map_err(|e| CoreError::internal(format!("canonical-json serialization failed: {e}")))?;
    serde_json::to_string(&value).map_err(|e| CoreError::internal(format!("canonical-json encoding failed: {e}")))
}

fn render_markdown(analysis: &AnalysisResult) -> String {
    let mut out = String::new();
    out.push_str(&format!("# Analysis Report {}\n\n", analysis.id));
    out.push_str(&format!("- Evidence: {}\n", analysis.evidence_id));
    out.push_str(&format!("- Analyzer profile: {}\n", analysis.analyzer_profile_version));
    out.push_str(&format!("- State: {:?}\n\n", analysis.state));

    out.push_str("## Executive Summary\n\n");
    out.push_str(&analysis.executive_summary);
    out.push_str("\n\n");

    out.push_str("## Violations\n\n");
    if analysis.violations.is_empty() {
        out.push_str("_None found._\n\n");
    } else {
        out.push_str("| Rule | Severity | Excerpt |\n|---|---|---|\n");
        for v in &analysis.violations {
            out.push_str(&format!("| {} | {} | {} |\n", v.rule_id, v.severity, markdown_escape(&v.excerpt)));
        }
        out.push('\n');
    }

    out.push_str("## Compliance\n\n");
    out.push_str(&format!("Overall status: **{}**\n\n", analysis.compliance.overall_status.as_str()));
    if !analysis.compliance.issues.is_empty() {
        out.push_str("| Rule | Severity | Description |\n|---|---|---|\n");
        for issue in &analysis.compliance.issues {
            out.push_str(&format!(
                "| {} | {} | {} |\n",
                issue.rule_id,
                issue.severity,
                markdown_escape(&issue.description)
            ));
        }
        out.push('\n');
    }

    out.push_str("## Recommended Motions\n\n");
    if analysis.recommended_motions.is_empty() {
        out.push_str("_None recommended._\n");
    } else {
        for motion in &analysis.recommended_motions {
            out.push_str(&format!("- **{}**: {}\n", motion.name, markdown_escape(&motion.rationale)));
        }
    }

    out
}

fn render_html(analysis: &AnalysisResult) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\">");
    out.push_str(&format!("<title>Analysis Report {}</title></head><body>\n", analysis.id));
    out.push_str(&format!("<h1>Analysis Report {}</h1>\n", analysis.id));
    out.push_str(&format!("<p>Evidence: {}</p>\n", html_escape(&analysis.evidence_id.to_string())));
    out.push_str(&format!(
        "<p>Analyzer profile: {}</p>\n",
        html_escape(&analysis.analyzer_profile_version.to_string())
    ));

    out.push_str("<h2>Executive Summary</h2>\n<p>");
    out.push_str(&html_escape(&analysis.executive_summary));
    out.push_str("</p>\n");

    out.push_str("<h2>Violations</h2>\n");
    if analysis.violations.is_empty() {
        out.push_str("<p>None found.</p>\n");
    } else {
        out.push_str("<table border=\"1\"><tr><th>Rule</th><th>Severity</th><th>Excerpt</th></tr>\n");
        for v in &analysis.violations {
            out.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                html_escape(&v.rule_id),
                v.severity,
                html_escape(&v.excerpt)
            ));
        }
        out.push_str("</table>\n");
    }

    out.push_str("<h2>Compliance</h2>\n");
    out.push_str(&format!("<p>Overall status: {}</p>\n", compliance_badge(analysis.compliance.overall_status)));

    out.push_str("<h2>Recommended Motions</h2>\n<ul>\n");
    for motion in &analysis.recommended_motions {
        out.push_str(&format!("<li><strong>{}</strong>: {}</li>\n", html_escape(&motion.name), html_escape(&motion.rationale)));
    }
    out.push_str("</ul>\n</body></html>\n");
    out
}

/// Wraps the deterministic HTML body inside a fixed, minimal PDF
/// container (spec.md §9 canonicalization Open Question; see
/// DESIGN.md). Not a general-purpose PDF renderer: the HTML is carried
/// as a literal text stream, sufficient to produce a byte-stable
/// artifact for a given `AnalysisResult` without a PDF-rendering crate.
fn render_pdf(analysis: &AnalysisResult) -> Vec<u8> {
    let body = render_html(analysis);
    let stream = format!("BT /F1 10 Tf 36 750 Td ({}) Tj ET", pdf_escape(&body));
    let mut out = Vec::new();
    out.extend_from_slice(b"%PDF-1.4\n");
    out.extend_from_slice(b"1 0 obj<</Type/Catalog/Pages 2 0 R>>endobj\n");
    out.extend_from_slice(b"2 0 obj<</Type/Pages/Kids[3 0 R]/Count 1>>endobj\n");
    out.extend_from_slice(b"3 0 obj<</Type/Page/Parent 2 0 R/Resources<</Font<</F1 4 0 R>>>>/MediaBox[0 0 612 792]/Contents 5 0 R>>endobj\n");
    out.extend_from_slice(b"4 0 obj<</Type/Font/Subtype/Type1/BaseFont/Helvetica>>endobj\n");
    out.extend_from_slice(format!("5 0 obj<</Length {}>>stream\n{}\nendstream endobj\n", stream.len(), stream).as_bytes());
    out.extend_from_slice(b"trailer<</Root 1 0 R>>\n");
    out.extend_from_slice(b"%%EOF\n");
    out
}

fn compliance_badge(status: ComplianceStatus) -> &'static str {
    status.as_str()
}

fn markdown_escape(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}

fn pdf_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('(', "\\(").replace(')', "\\)").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use evidence_domain::value_objects::{AnalyzerProfileVersion, ContentDigest, DeclaredType, EvidenceId, Fingerprint};

    fn sample() -> AnalysisResult {
        let profile = AnalyzerProfileVersion::new("v3");
        let digest = ContentDigest::of(b"sample content");
        let fingerprint = Fingerprint::compute(&digest, DeclaredType::Document, &profile, None);
        AnalysisResult::pending(EvidenceId::new(), fingerprint, profile)
    }

    #[test]
    fn canonical_json_renders_sorted_keys() {
        let renderer = ReportRenderer::new();
        let bytes = renderer.render(&sample(), ReportFormat::CanonicalJson).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let id_pos = text.find("\"analyzer_profile_version\"").unwrap();
        let citations_pos = text.find("\"citations\"").unwrap();
        assert!(id_pos < citations_pos, "keys must be in codepoint order: {text}");
    }

    #[test]
    fn rendering_is_deterministic() {
        let renderer = ReportRenderer::new();
        let analysis = sample();
        let a = renderer.render(&analysis, ReportFormat::Markdown).unwrap();
        let b = renderer.render(&analysis, ReportFormat::Markdown).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn pdf_wraps_html_with_header_and_eof() {
        let renderer = ReportRenderer::new();
        let bytes = renderer.render(&sample(), ReportFormat::Pdf).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.4"));
        assert!(bytes.ends_with(b"%%EOF\n"));
    }

    #[test]
    fn unknown_format_is_malformed_request() {
        assert!(ReportFormat::parse("xml").is_err());
    }
}
