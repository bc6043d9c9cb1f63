// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Report rendering and the Audit Export Bundle (spec.md §4.1 Report,
//! §6.3). `Export` is the one use case here with a nontrivial body: it
//! assembles the four-member zip archive spec.md §6.3 defines byte for
//! byte.

use std::io::Write;
use std::sync::Arc;

use evidence_domain::error::CoreError;
use evidence_domain::services::{ContentStore, EvidenceRepository};
use evidence_domain::value_objects::{sha256_of_parts, AnalysisId};

use crate::application::services::{AccessQuotaGate, AuditLogger, EvidenceProcessor, Principal, ReportFormat, ReportRenderer};
use crate::application::use_cases::operations;

pub struct GenerateReportUseCase {
    gate: Arc<AccessQuotaGate>,
    processor: Arc<EvidenceProcessor>,
    renderer: Arc<ReportRenderer>,
}

impl GenerateReportUseCase {
    pub fn new(gate: Arc<AccessQuotaGate>, processor: Arc<EvidenceProcessor>, renderer: Arc<ReportRenderer>) -> Self {
        Self { gate, processor, renderer }
    }

    pub async fn execute(&self, actor: Principal, analysis_id: AnalysisId, format: ReportFormat) -> Result<Vec<u8>, CoreError> {
        let token = self.gate.gate(Some(actor), &operations::REPORT).await?;
        let analysis = self.processor.fetch_for_report(analysis_id).await?;
        let rendered = self.renderer.render(&analysis, format)?;
        self.gate.charge(token, 1).await?;
        Ok(rendered)
    }
}

/// One manifest entry of spec.md §6.3's export bundle.
#[derive(Debug, Clone, serde::Serialize)]
struct ExportManifest {
    content_digest: String,
    fingerprint: String,
    analyzer_profile_version: String,
    created_at: String,
    bundle_digest: String,
}

pub struct ExportBundleUseCase {
    gate: Arc<AccessQuotaGate>,
    processor: Arc<EvidenceProcessor>,
    evidence_repo: Arc<dyn EvidenceRepository>,
    content_store: Arc<dyn ContentStore>,
    audit: Arc<AuditLogger>,
    renderer: Arc<ReportRenderer>,
}

impl ExportBundleUseCase {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        gate: Arc<AccessQuotaGate>,
        processor: Arc<EvidenceProcessor>,
        evidence_repo: Arc<dyn EvidenceRepository>,
        content_store: Arc<dyn ContentStore>,
        audit: Arc<AuditLogger>,
        renderer: Arc<ReportRenderer>,
    ) -> Self {
        Self { gate, processor, evidence_repo, content_store, audit, renderer }
    }

    /// Builds the zip described in spec.md §6.3: `canonical.json`,
    /// `evidence.bin`, `chain.jsonl`, and a `manifest.json` whose
    /// `bundle_digest` is the SHA-256 of the first three members
    /// concatenated in that order.
    pub async fn execute(&self, actor: Principal, analysis_id: AnalysisId) -> Result<Vec<u8>, CoreError> {
        let token = self.gate.gate(Some(actor), &operations::EXPORT).await?;

        let analysis = self.processor.fetch_for_report(analysis_id).await?;
        let canonical_json = self.renderer.render(&analysis, ReportFormat::CanonicalJson)?;

        let evidence = self
            .evidence_repo
            .find_by_id(analysis.evidence_id)
            .await?
            .ok_or_else(|| CoreError::not_found("evidence"))?;
        let evidence_bin = self.content_store.get(&evidence.content_digest).await?;

        let chain = self.audit.chain_for_evidence(analysis.evidence_id).await?;
        let mut chain_jsonl = Vec::new();
        for event in &chain {
            serde_json::to_writer(&mut chain_jsonl, event)
                .map_err(|e| CoreError::internal(format!("failed to serialize audit chain: {e}")))?;
            chain_jsonl.push(b'\n');
        }

        let bundle_digest = sha256_of_parts(&[&canonical_json, &evidence_bin, &chain_jsonl]);
        let manifest = ExportManifest {
            content_digest: evidence.content_digest.to_hex(),
            fingerprint: analysis.fingerprint.to_hex(),
            analyzer_profile_version: analysis.analyzer_profile_version.to_string(),
            created_at: analysis.created_at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            bundle_digest: bundle_digest.to_hex(),
        };
        let manifest_json = serde_json::to_vec(&manifest)
            .map_err(|e| CoreError::internal(format!("failed to serialize export manifest: {e}")))?;

        let zip_bytes = write_zip(&canonical_json, &evidence_bin, &chain_jsonl, &manifest_json)?;
        self.gate.charge(token, 1).await?;
        Ok(zip_bytes)
    }
}

fn write_zip(canonical_json: &[u8], evidence_bin: &[u8], chain_jsonl: &[u8], manifest_json: &[u8]) -> Result<Vec<u8>, CoreError> {
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = zip::ZipWriter::new(&mut cursor);
        let options = zip::write::SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        writer
            .start_file("canonical.json", options)
            .map_err(|e| CoreError::internal(format!("zip write failed: {e}")))?;
        writer.write_all(canonical_json).map_err(|e| CoreError::internal(format!("zip write failed: {e}")))?;

        writer
            .start_file("evidence.bin", options)
            .map_err(|e| CoreError::internal(format!("zip write failed: {e}")))?;
        writer.write_all(evidence_bin).map_err(|e| CoreError::internal(format!("zip write failed: {e}")))?;

        writer
            .start_file("chain.jsonl", options)
            .map_err(|e| CoreError::internal(format!("zip write failed: {e}")))?;
        writer.write_all(chain_jsonl).map_err(|e| CoreError::internal(format!("zip write failed: {e}")))?;

        writer
            .start_file("manifest.json", options)
            .map_err(|e| CoreError::internal(format!("zip write failed: {e}")))?;
        writer.write_all(manifest_json).map_err(|e| CoreError::internal(format!("zip write failed: {e}")))?;

        writer.finish().map_err(|e| CoreError::internal(format!("zip finalize failed: {e}")))?;
    }
    Ok(cursor.into_inner())
}
