// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Domain events published to the Event Bus (spec.md §2, §4.1, §4.2).
//! Names match the literal event names the spec requires so downstream
//! consumers can match on them directly.

use crate::value_objects::{ContentDigest, EvidenceId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum DomainEvent {
    #[serde(rename = "evidence.ingested")]
    EvidenceIngested { evidence_id: EvidenceId, content_digest: ContentDigest, byte_size: u64 },

    #[serde(rename = "evidence.processed")]
    EvidenceProcessed { evidence_id: EvidenceId, violation_count: usize, compliance_status: String },

    #[serde(rename = "evidence.processed.cached")]
    EvidenceProcessedCached { evidence_id: EvidenceId },

    #[serde(rename = "evidence.processing_failed")]
    EvidenceProcessingFailed { evidence_id: EvidenceId, failing_stage: String },

    #[serde(rename = "stage.transcription.progress")]
    TranscriptionProgress { evidence_id: EvidenceId, elapsed_seconds: u64 },

    #[serde(rename = "stage.ocr.progress")]
    OcrProgress { evidence_id: EvidenceId, pages_done: u32 },
}

impl DomainEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::EvidenceIngested { .. } => "evidence.ingested",
            DomainEvent::EvidenceProcessed { .. } => "evidence.processed",
            DomainEvent::EvidenceProcessedCached { .. } => "evidence.processed.cached",
            DomainEvent::EvidenceProcessingFailed { .. } => "evidence.processing_failed",
            DomainEvent::TranscriptionProgress { .. } => "stage.transcription.progress",
            DomainEvent::OcrProgress { .. } => "stage.ocr.progress",
        }
    }
}
