// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! OCR Stage adapters (spec.md §4.3), mirroring the local-adapter-plus-
//! fixture strategy used for [`super::transcription`] for the same reason:
//! no third-party OCR provider is in scope.
//!
//! [`LocalOcrStage`] reads a sidecar (`<document_path>.pages.txt`) with
//! pages separated by a form feed (`\x0c`) — the same separator the
//! aggregated output uses (spec.md §4.3) — so the fixture format and the
//! wire format agree.

use async_trait::async_trait;
use evidence_domain::entities::{OcrOutput, OcrPage};
use evidence_domain::error::CoreError;
use evidence_domain::services::{OcrRequest, OcrStage};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use tokio::fs;

const FORM_FEED: char = '\x0c';

fn pages_from_text(raw: &str) -> OcrOutput {
    let pages: Vec<OcrPage> = raw
        .split(FORM_FEED)
        .enumerate()
        .map(|(i, text)| OcrPage { page_number: i as u32 + 1, text: text.trim().to_string(), average_confidence_pct: 95 })
        .collect();
    let aggregated_text = pages.iter().map(|p| p.text.as_str()).collect::<Vec<_>>().join(&FORM_FEED.to_string());
    let page_count = pages.len() as u32;
    OcrOutput { pages, aggregated_text, page_count }
}

pub struct LocalOcrStage;

impl Default for LocalOcrStage {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalOcrStage {
    pub fn new() -> Self {
        Self
    }

    fn sidecar_path(document_path: &str) -> String {
        format!("{document_path}.pages.txt")
    }
}

#[async_trait]
impl OcrStage for LocalOcrStage {
    async fn extract(&self, request: OcrRequest<'_>) -> Result<OcrOutput, CoreError> {
        let sidecar = Self::sidecar_path(request.document_path);
        match fs::read_to_string(&sidecar).await {
            Ok(raw) => Ok(pages_from_text(&raw)),
            Err(_) => {
                Err(CoreError::DependencyUnavailable(format!("no OCR sidecar for evidence {}", request.evidence_id)))
            }
        }
    }
}

#[derive(Default)]
pub struct FixtureOcrStage {
    fixtures: Mutex<HashMap<String, OcrOutput>>,
}

impl FixtureOcrStage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fixture(self, digest_hex: impl Into<String>, output: OcrOutput) -> Self {
        self.fixtures.lock().unwrap().insert(digest_hex.into(), output);
        self
    }
}

#[async_trait]
impl OcrStage for FixtureOcrStage {
    async fn extract(&self, request: OcrRequest<'_>) -> Result<OcrOutput, CoreError> {
        let key = Path::new(request.document_path).file_stem().and_then(|s| s.to_str()).unwrap_or(request.document_path);
        self.fixtures
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| CoreError::DependencyUnavailable(format!("no fixture OCR output for '{key}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evidence_domain::value_objects::{DeclaredType, EvidenceId};

    fn request(document_path: &str) -> OcrRequest<'_> {
        OcrRequest { document_path, declared_type: DeclaredType::Document, evidence_id: EvidenceId::new() }
    }

    #[tokio::test]
    async fn local_stage_splits_pages_on_form_feed() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("report.pdf");
        let sidecar = dir.path().join("report.pdf.pages.txt");
        tokio::fs::write(&sidecar, "page one text\x0cpage two text").await.unwrap();

        let stage = LocalOcrStage::new();
        let output = stage.extract(request(doc.to_str().unwrap())).await.unwrap();
        assert_eq!(output.page_count, 2);
        assert_eq!(output.pages[0].text, "page one text");
        assert_eq!(output.pages[1].page_number, 2);
    }

    #[tokio::test]
    async fn local_stage_returns_dependency_unavailable_without_sidecar() {
        let stage = LocalOcrStage::new();
        let err = stage.extract(request("/no/such/doc.pdf")).await.unwrap_err();
        assert!(matches!(err, CoreError::DependencyUnavailable(_)));
    }
}
