// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Filesystem-backed [`ContentStore`] (spec.md §6.2): `<root>/<xx>/<yy>/<digest>`
//! plus a `.meta.json` sidecar, written through a temp file and renamed into
//! place so a reader never observes a partially-written blob.

use async_trait::async_trait;
use evidence_domain::error::CoreError;
use evidence_domain::services::{BlobMetadata, ContentStore};
use evidence_domain::value_objects::ContentDigest;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;

#[derive(Serialize, Deserialize)]
struct MetaSidecar {
    original_filename: String,
    declared_type: evidence_domain::value_objects::DeclaredType,
    size: u64,
    ingested_at: chrono::DateTime<chrono::Utc>,
}

impl From<&BlobMetadata> for MetaSidecar {
    fn from(m: &BlobMetadata) -> Self {
        Self {
            original_filename: m.original_filename.clone(),
            declared_type: m.declared_type,
            size: m.size,
            ingested_at: m.ingested_at,
        }
    }
}

impl From<MetaSidecar> for BlobMetadata {
    fn from(m: MetaSidecar) -> Self {
        Self {
            original_filename: m.original_filename,
            declared_type: m.declared_type,
            size: m.size,
            ingested_at: m.ingested_at,
        }
    }
}

pub struct FilesystemContentStore {
    root: PathBuf,
}

impl FilesystemContentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn blob_path(&self, digest: &ContentDigest) -> PathBuf {
        let (xx, yy) = digest.shard();
        self.root.join(xx).join(yy).join(digest.to_hex())
    }

    fn meta_path(&self, digest: &ContentDigest) -> PathBuf {
        let mut path = self.blob_path(digest).into_os_string();
        path.push(".meta.json");
        PathBuf::from(path)
    }

    async fn io_ok<T>(result: std::io::Result<T>, digest: &ContentDigest) -> Result<T, CoreError> {
        result.map_err(|e| CoreError::internal(format!("content store I/O error for {digest}: {e}")))
    }
}

#[async_trait]
impl ContentStore for FilesystemContentStore {
    async fn put(&self, digest: &ContentDigest, data: &[u8], metadata: BlobMetadata) -> Result<bool, CoreError> {
        let blob_path = self.blob_path(digest);
        if fs::try_exists(&blob_path).await.unwrap_or(false) {
            return Ok(false);
        }

        let parent = blob_path.parent().expect("blob path always has a shard parent");
        Self::io_ok(fs::create_dir_all(parent).await, digest).await?;

        let tmp_path = parent.join(format!(".{}.tmp", digest.to_hex()));
        {
            let mut tmp_file = Self::io_ok(fs::File::create(&tmp_path).await, digest).await?;
            Self::io_ok(tmp_file.write_all(data).await, digest).await?;
            Self::io_ok(tmp_file.flush().await, digest).await?;
        }
        Self::io_ok(fs::rename(&tmp_path, &blob_path).await, digest).await?;

        let sidecar = MetaSidecar::from(&metadata);
        let sidecar_json = serde_json::to_vec_pretty(&sidecar)
            .map_err(|e| CoreError::internal(format!("failed to serialize content store metadata: {e}")))?;
        Self::io_ok(fs::write(self.meta_path(digest), sidecar_json).await, digest).await?;

        Ok(true)
    }

    async fn get(&self, digest: &ContentDigest) -> Result<Vec<u8>, CoreError> {
        let path = self.blob_path(digest);
        let bytes = fs::read(&path).await.map_err(|_| CoreError::not_found(format!("no content stored for digest {digest}")))?;

        // spec.md §3: a mismatch between the stored digest and the bytes
        // actually on disk is a fatal integrity error, not a silent read.
        let actual = ContentDigest::of(&bytes);
        if actual != *digest {
            return Err(CoreError::IntegrityError(format!(
                "content digest mismatch for {digest}: on-disk bytes hash to {actual}"
            )));
        }
        Ok(bytes)
    }

    async fn metadata(&self, digest: &ContentDigest) -> Result<BlobMetadata, CoreError> {
        let raw = fs::read(self.meta_path(digest))
            .await
            .map_err(|_| CoreError::not_found(format!("no metadata stored for digest {digest}")))?;
        let sidecar: MetaSidecar = serde_json::from_slice(&raw)
            .map_err(|e| CoreError::internal(format!("corrupt content store metadata for {digest}: {e}")))?;
        Ok(sidecar.into())
    }

    async fn exists(&self, digest: &ContentDigest) -> Result<bool, CoreError> {
        Ok(fs::try_exists(self.blob_path(digest)).await.unwrap_or(false))
    }

    fn path_for(&self, digest: &ContentDigest) -> String {
        self.blob_path(digest).to_string_lossy().into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evidence_domain::value_objects::DeclaredType;
    use tempfile::tempdir;

    fn metadata() -> BlobMetadata {
        BlobMetadata {
            original_filename: "exhibit.pdf".to_string(),
            declared_type: DeclaredType::Document,
            size: 4,
            ingested_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn put_then_get_round_trips_bytes() {
        let dir = tempdir().unwrap();
        let store = FilesystemContentStore::new(dir.path());
        let digest = ContentDigest::of(b"test");

        let wrote = store.put(&digest, b"test", metadata()).await.unwrap();
        assert!(wrote);
        assert_eq!(store.get(&digest).await.unwrap(), b"test");
        assert!(store.exists(&digest).await.unwrap());
    }

    #[tokio::test]
    async fn put_is_a_no_op_when_digest_already_exists() {
        let dir = tempdir().unwrap();
        let store = FilesystemContentStore::new(dir.path());
        let digest = ContentDigest::of(b"test");

        assert!(store.put(&digest, b"test", metadata()).await.unwrap());
        assert!(!store.put(&digest, b"test", metadata()).await.unwrap());
    }

    #[tokio::test]
    async fn metadata_round_trips_through_the_sidecar() {
        let dir = tempdir().unwrap();
        let store = FilesystemContentStore::new(dir.path());
        let digest = ContentDigest::of(b"test");
        store.put(&digest, b"test", metadata()).await.unwrap();

        let loaded = store.metadata(&digest).await.unwrap();
        assert_eq!(loaded.original_filename, "exhibit.pdf");
        assert_eq!(loaded.declared_type, DeclaredType::Document);
    }

    #[tokio::test]
    async fn get_detects_corruption_after_write() {
        let dir = tempdir().unwrap();
        let store = FilesystemContentStore::new(dir.path());
        let digest = ContentDigest::of(b"test");
        store.put(&digest, b"test", metadata()).await.unwrap();

        tokio::fs::write(store.blob_path(&digest), b"tampered").await.unwrap();

        let err = store.get(&digest).await.unwrap_err();
        assert!(matches!(err, CoreError::IntegrityError(_)));
    }

    #[tokio::test]
    async fn path_for_follows_the_two_level_shard_layout() {
        let dir = tempdir().unwrap();
        let store = FilesystemContentStore::new(dir.path());
        let digest = ContentDigest::of(b"test");
        let (xx, yy) = digest.shard();
        let path = store.path_for(&digest);
        assert!(path.contains(&format!("/{xx}/{yy}/")));
    }
}
