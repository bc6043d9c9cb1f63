// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Declared evidence type (spec.md §3).

use crate::CoreError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclaredType {
    Video,
    Audio,
    Document,
    Image,
    Other,
}

impl DeclaredType {
    pub fn as_str(self) -> &'static str {
        match self {
            DeclaredType::Video => "video",
            DeclaredType::Audio => "audio",
            DeclaredType::Document => "document",
            DeclaredType::Image => "image",
            DeclaredType::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "video" => Ok(DeclaredType::Video),
            "audio" => Ok(DeclaredType::Audio),
            "document" => Ok(DeclaredType::Document),
            "image" => Ok(DeclaredType::Image),
            "other" => Ok(DeclaredType::Other),
            other => Err(CoreError::unsupported_type(format!("unknown declared type '{other}'"))),
        }
    }

    /// True for types routed to the Transcription stage (spec.md §4.1 step 2).
    pub fn needs_transcription(self) -> bool {
        matches!(self, DeclaredType::Video | DeclaredType::Audio)
    }

    /// True for types routed to the OCR stage (spec.md §4.1 step 3).
    pub fn needs_ocr(self) -> bool {
        matches!(self, DeclaredType::Document | DeclaredType::Image)
    }
}

impl std::fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whitelist enforced by `Ingest` (spec.md §4.1: `UnsupportedType` if MIME
/// not in whitelist). MIME prefixes are intentionally coarse; exact
/// sub-type policy belongs to deployment configuration.
pub fn mime_matches_declared_type(mime: &str, declared: DeclaredType) -> bool {
    match declared {
        DeclaredType::Video => mime.starts_with("video/"),
        DeclaredType::Audio => mime.starts_with("audio/"),
        DeclaredType::Image => mime.starts_with("image/"),
        DeclaredType::Document => {
            mime.starts_with("application/pdf")
                || mime.starts_with("application/msword")
                || mime.starts_with("application/vnd.openxmlformats")
                || mime.starts_with("text/")
        }
        DeclaredType::Other => true,
    }
}
