// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Transcription Stage adapters (spec.md §4.2).
//!
//! No third-party ASR provider is in scope, so [`LocalTranscriptionStage`]
//! stands in for one: it reads a plain-text sidecar shipped alongside the
//! media file (`<media_path>.txt`, one line per segment as
//! `start-end|speaker|text`) rather than actually transcribing audio. When
//! the sidecar is absent it returns a retryable `DependencyUnavailable` so
//! the Processor's retry/backoff and eventual-fatal-degradation path
//! (spec.md §4.1) is exercised the same way it would be against a real
//! provider outage.

use async_trait::async_trait;
use evidence_domain::entities::{Transcript, TranscriptSegment};
use evidence_domain::error::CoreError;
use evidence_domain::services::{TranscriptionRequest, TranscriptionStage};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use tokio::fs;

fn parse_sidecar(raw: &str, language_hint: Option<&str>) -> Transcript {
    let mut segments = Vec::new();
    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut parts = line.splitn(3, '|');
        let (Some(span), Some(speaker), Some(text)) = (parts.next(), parts.next(), parts.next()) else {
            continue;
        };
        let (start, end) = span.split_once('-').unwrap_or(("0", "0"));
        segments.push(TranscriptSegment {
            start_sec: start.trim().parse().unwrap_or(0),
            end_sec: end.trim().parse().unwrap_or(0),
            speaker_label: speaker.trim().to_string(),
            text: text.trim().to_string(),
        });
    }

    let duration_seconds = segments.iter().map(|s| s.end_sec).max().unwrap_or(0);
    let text = segments.iter().map(|s| s.text.as_str()).collect::<Vec<_>>().join(" ");

    Transcript {
        text,
        duration_seconds,
        average_confidence_pct: 97,
        detected_language: language_hint.map(str::to_string),
        segments,
    }
}

pub struct LocalTranscriptionStage;

impl Default for LocalTranscriptionStage {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalTranscriptionStage {
    pub fn new() -> Self {
        Self
    }

    fn sidecar_path(media_path: &str) -> String {
        format!("{media_path}.txt")
    }
}

#[async_trait]
impl TranscriptionStage for LocalTranscriptionStage {
    async fn transcribe(&self, request: TranscriptionRequest<'_>) -> Result<Transcript, CoreError> {
        let sidecar = Self::sidecar_path(request.media_path);
        match fs::read_to_string(&sidecar).await {
            Ok(raw) => Ok(parse_sidecar(&raw, request.language_hint)),
            Err(_) => Err(CoreError::DependencyUnavailable(format!(
                "no transcription sidecar for evidence {}",
                request.evidence_id
            ))),
        }
    }
}

/// Reads pre-recorded transcripts keyed by content digest, for
/// deterministic integration tests that must not depend on the
/// filesystem (S5).
#[derive(Default)]
pub struct FixtureTranscriptionStage {
    fixtures: Mutex<HashMap<String, Transcript>>,
}

impl FixtureTranscriptionStage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fixture(self, digest_hex: impl Into<String>, transcript: Transcript) -> Self {
        self.fixtures.lock().unwrap().insert(digest_hex.into(), transcript);
        self
    }
}

#[async_trait]
impl TranscriptionStage for FixtureTranscriptionStage {
    async fn transcribe(&self, request: TranscriptionRequest<'_>) -> Result<Transcript, CoreError> {
        let key = Path::new(request.media_path)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(request.media_path);
        self.fixtures
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| CoreError::DependencyUnavailable(format!("no fixture transcript for '{key}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evidence_domain::value_objects::{DeclaredType, EvidenceId};
    use std::time::Duration;

    fn request<'a>(media_path: &'a str) -> TranscriptionRequest<'a> {
        TranscriptionRequest {
            media_path,
            declared_type: DeclaredType::Audio,
            language_hint: Some("en"),
            evidence_id: EvidenceId::new(),
            wall_clock_limit: Duration::from_secs(60),
        }
    }

    #[tokio::test]
    async fn local_stage_returns_dependency_unavailable_without_sidecar() {
        let stage = LocalTranscriptionStage::new();
        let err = stage.transcribe(request("/no/such/file.wav")).await.unwrap_err();
        assert!(matches!(err, CoreError::DependencyUnavailable(_)));
        assert_eq!(err.retryability(), evidence_domain::error::Retryability::Retryable);
    }

    #[tokio::test]
    async fn local_stage_parses_sidecar_into_segments() {
        let dir = tempfile::tempdir().unwrap();
        let media = dir.path().join("clip.wav");
        let sidecar = dir.path().join("clip.wav.txt");
        tokio::fs::write(&sidecar, "0-4|Officer|You have the right to remain silent.\n4-9|Suspect|Understood.\n")
            .await
            .unwrap();

        let stage = LocalTranscriptionStage::new();
        let transcript = stage.transcribe(request(media.to_str().unwrap())).await.unwrap();
        assert_eq!(transcript.segments.len(), 2);
        assert_eq!(transcript.duration_seconds, 9);
        assert!(transcript.text.contains("remain silent"));
    }

    #[tokio::test]
    async fn fixture_stage_returns_seeded_transcript() {
        let transcript = Transcript {
            text: "hello".into(),
            duration_seconds: 1,
            average_confidence_pct: 99,
            detected_language: Some("en".into()),
            segments: vec![],
        };
        let stage = FixtureTranscriptionStage::new().with_fixture("abc123", transcript.clone());
        let found = stage.transcribe(request("abc123")).await.unwrap();
        assert_eq!(found.text, transcript.text);
    }
}
