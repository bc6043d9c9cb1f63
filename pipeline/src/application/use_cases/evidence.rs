// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Ingest / Process / Reprocess use cases (spec.md §4.1, §6.1). Each one
//! runs the Gate first, then the corresponding [`EvidenceProcessor`]
//! operation, then redeems the charge token — the sequence spec.md §9
//! calls out as "Gate, then operate, then Charge" for every protected call.

use std::sync::Arc;

use evidence_domain::error::CoreError;
use evidence_domain::value_objects::{AnalysisId, CaseNumber, DeclaredType, EvidenceId};
use tracing::info;

use crate::application::services::{AccessQuotaGate, EvidenceProcessor, Principal};
use crate::application::services::evidence_processor::{IngestRequest, ProcessingContext};
use crate::application::use_cases::operations;

pub struct IngestEvidenceUseCase {
    gate: Arc<AccessQuotaGate>,
    processor: Arc<EvidenceProcessor>,
}

impl IngestEvidenceUseCase {
    pub fn new(gate: Arc<AccessQuotaGate>, processor: Arc<EvidenceProcessor>) -> Self {
        Self { gate, processor }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn execute(
        &self,
        actor: Principal,
        data: &[u8],
        declared_mime: &str,
        declared_type: DeclaredType,
        original_filename: &str,
        case_number: Option<CaseNumber>,
        max_bytes: u64,
        is_original: bool,
        authenticated: bool,
    ) -> Result<evidence_domain::entities::Evidence, CoreError> {
        let op = if declared_type.needs_transcription() { &operations::INGEST_VIDEO } else { &operations::INGEST_DOCUMENT };
        let token = self.gate.gate(Some(actor), op).await?;

        let request = IngestRequest {
            owner: actor.user_id,
            data,
            declared_mime,
            declared_type,
            original_filename,
            case_number,
            max_bytes,
            is_original,
            authenticated,
        };
        let evidence = self.processor.ingest(request).await?;
        self.gate.charge(token, 1).await?;
        info!(evidence_id = %evidence.id, "evidence ingested");
        Ok(evidence)
    }
}

pub struct ProcessEvidenceUseCase {
    gate: Arc<AccessQuotaGate>,
    processor: Arc<EvidenceProcessor>,
}

impl ProcessEvidenceUseCase {
    pub fn new(gate: Arc<AccessQuotaGate>, processor: Arc<EvidenceProcessor>) -> Self {
        Self { gate, processor }
    }

    pub async fn execute(
        &self,
        actor: Principal,
        evidence_id: EvidenceId,
        context: ProcessingContext,
    ) -> Result<evidence_domain::entities::AnalysisResult, CoreError> {
        let token = self.gate.gate(Some(actor), &operations::PROCESS).await?;
        let result = self.processor.process(evidence_id, context, Some(actor.user_id)).await?;
        self.gate.charge(token, 1).await?;
        Ok(result)
    }
}

/// SPEC_FULL.md §4.1 expansion: the explicit `failed -> running`
/// transition, distinct from a fresh `Process` call on the same evidence.
pub struct ReprocessEvidenceUseCase {
    gate: Arc<AccessQuotaGate>,
    processor: Arc<EvidenceProcessor>,
}

impl ReprocessEvidenceUseCase {
    pub fn new(gate: Arc<AccessQuotaGate>, processor: Arc<EvidenceProcessor>) -> Self {
        Self { gate, processor }
    }

    pub async fn execute(
        &self,
        actor: Principal,
        analysis_id: AnalysisId,
    ) -> Result<evidence_domain::entities::AnalysisResult, CoreError> {
        let token = self.gate.gate(Some(actor), &operations::REPROCESS).await?;
        let result = self.processor.reprocess(analysis_id, Some(actor.user_id)).await?;
        self.gate.charge(token, 1).await?;
        Ok(result)
    }
}
