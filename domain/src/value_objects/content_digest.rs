// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! SHA-256 content digest — the identity of a blob in the Content Store.

use crate::CoreError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// A SHA-256 hash, hex-encoded for display and storage.
///
/// Invariant (spec.md §3): computed once during ingestion, never
/// recomputed; a mismatch on re-read is a fatal [`CoreError::IntegrityError`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Computes the digest of a complete in-memory buffer.
    pub fn of(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self(hasher.finalize().into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        let bytes = hex::decode(s)
            .map_err(|e| CoreError::malformed_request(format!("invalid content digest '{s}': {e}")))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CoreError::malformed_request(format!("content digest '{s}' is not 32 bytes")))?;
        Ok(Self(arr))
    }

    /// First two and next two hex characters, used for the fan-out
    /// directory layout of the content store (spec.md §6.2).
    pub fn shard(&self) -> (String, String) {
        let hex = self.to_hex();
        (hex[0..2].to_string(), hex[2..4].to_string())
    }
}

impl fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentDigest({})", self.to_hex())
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Incremental SHA-256 hasher used while streaming upload bytes to the
/// Content Store (spec.md §4.1 Ingest: "computes SHA-256 incrementally").
#[derive(Default)]
pub struct IncrementalDigest(Sha256);

impl IncrementalDigest {
    pub fn new() -> Self {
        Self(Sha256::new())
    }

    pub fn update(&mut self, chunk: &[u8]) {
        self.0.update(chunk);
    }

    pub fn finalize(self) -> ContentDigest {
        ContentDigest(self.0.finalize().into())
    }
}

/// SHA-256 over an arbitrary set of serialized fields, used both for the
/// cache [`fingerprint`](crate::value_objects::Fingerprint) and for
/// the audit chain digest (spec.md §4.9 `verify`).
pub fn sha256_of_parts(parts: &[&[u8]]) -> ContentDigest {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    ContentDigest(hasher.finalize().into())
}
