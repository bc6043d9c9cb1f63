// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Content Store port (spec.md §2, §6.2). Content-addressed, append-only:
//! rewrites to an existing digest are forbidden (spec.md §5).

use crate::error::CoreError;
use crate::value_objects::{ContentDigest, DeclaredType};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct BlobMetadata {
    pub original_filename: String,
    pub declared_type: DeclaredType,
    pub size: u64,
    pub ingested_at: DateTime<Utc>,
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Streams `data` into the store under `digest`, writing the sidecar
    /// metadata file. If a blob with this digest already exists, the
    /// write is a no-op and the existing path is reused (spec.md §4.1
    /// "content-addressed dedup").
    ///
    /// Returns `true` if a new blob was written, `false` if an existing
    /// blob was reused.
    async fn put(&self, digest: &ContentDigest, data: &[u8], metadata: BlobMetadata) -> Result<bool, CoreError>;

    async fn get(&self, digest: &ContentDigest) -> Result<Vec<u8>, CoreError>;

    async fn metadata(&self, digest: &ContentDigest) -> Result<BlobMetadata, CoreError>;

    async fn exists(&self, digest: &ContentDigest) -> Result<bool, CoreError>;

    /// Path as exposed to the Evidence record (spec.md §3: "storage path
    /// inside Content Store").
    fn path_for(&self, digest: &ContentDigest) -> String;
}
