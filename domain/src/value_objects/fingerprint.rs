// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The cache key for a full pipeline run (spec.md §4.1, GLOSSARY).

use super::content_digest::{sha256_of_parts, ContentDigest};
use super::{AnalyzerProfileVersion, DeclaredType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// `SHA-256(content digest, declared type, analyzer profile version, case
/// number)`. Nothing else may affect the fingerprint (spec.md §4.1: "The
/// context tag subset is exactly {case-number, analyzer-profile-version};
/// nothing else affects the fingerprint").
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(ContentDigest);

impl Fingerprint {
    pub fn compute(
        content_digest: &ContentDigest,
        declared_type: DeclaredType,
        profile_version: &AnalyzerProfileVersion,
        case_number: Option<&str>,
    ) -> Self {
        let digest = sha256_of_parts(&[
            content_digest.as_bytes(),
            declared_type.as_str().as_bytes(),
            profile_version.as_str().as_bytes(),
            case_number.unwrap_or("").as_bytes(),
        ]);
        Self(digest)
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }

    pub fn cache_key(&self, stage: &str) -> String {
        format!("{stage}:{}", self.0.to_hex())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.to_hex())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
