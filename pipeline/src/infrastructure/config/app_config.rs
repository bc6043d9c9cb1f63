// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! [`AppConfig`]: the single, fixed-shape configuration bag (spec.md §6.4).
//!
//! Layering, lowest to highest precedence: built-in defaults for optional
//! keys, an optional config file (`config/<file>.toml`, TOML via the
//! [`config`] crate), then `EVIDENCE__`-prefixed environment variables.
//! `#[serde(deny_unknown_fields)]` on [`RawConfig`] makes unrecognized keys a
//! hard startup error rather than a silently ignored typo.
//!
//! `content_store_root` and `metadata_url` have no built-in default: in
//! `production` they must be supplied by the file or environment layer, or
//! startup fails; in `development` a missing value falls back to a
//! local-disk default so the binary runs out of the box.

use config::{Config, Environment as EnvSource, File};
use evidence_domain::error::CoreError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Default for Environment {
    fn default() -> Self {
        Self::Development
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    Memory,
    Remote,
}

impl Default for CacheBackend {
    fn default() -> Self {
        Self::Memory
    }
}

/// One tier's monthly quotas and rate-limit shape. `-1` on any `i64` field
/// means unlimited (spec.md §6.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TierLimits {
    pub uploads_per_month: i64,
    pub videos_per_month: i64,
    pub api_calls_per_minute: i64,
}

impl TierLimits {
    pub fn is_unlimited(value: i64) -> bool {
        value < 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    env: Environment,
    content_store_root: Option<String>,
    metadata_url: Option<String>,
    cache_backend: CacheBackend,
    cache_url: Option<String>,
    worker_pool_size: u32,
    queue_capacity: u32,
    transcript_ttl_seconds: u64,
    ocr_ttl_seconds: u64,
    result_ttl_seconds: u64,
    tier_limits: HashMap<String, TierLimits>,
    max_upload_bytes: u64,
    trust_proxy: bool,
}

/// The validated, immutable configuration loaded once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub content_store_root: String,
    pub metadata_url: String,
    pub cache_backend: CacheBackend,
    pub cache_url: Option<String>,
    pub worker_pool_size: u32,
    pub queue_capacity: u32,
    pub transcript_ttl_seconds: u64,
    pub ocr_ttl_seconds: u64,
    pub result_ttl_seconds: u64,
    pub tier_limits: HashMap<String, TierLimits>,
    pub max_upload_bytes: u64,
    pub trust_proxy: bool,
}

const DEFAULT_CONTENT_STORE_ROOT: &str = "./data/content";
const DEFAULT_METADATA_URL: &str = "sqlite://./data/evidence.db?mode=rwc";

impl AppConfig {
    /// Loads layered configuration: built-in defaults, then an optional
    /// `config_path` file, then `EVIDENCE__`-prefixed environment variables.
    pub fn load(config_path: Option<&Path>) -> Result<Self, CoreError> {
        let mut builder = Config::builder()
            .set_default("env", "development")
            .map_err(config_err)?
            .set_default("cache_backend", "memory")
            .map_err(config_err)?
            .set_default("worker_pool_size", 4)
            .map_err(config_err)?
            .set_default("queue_capacity", 1024)
            .map_err(config_err)?
            .set_default("transcript_ttl_seconds", 3600)
            .map_err(config_err)?
            .set_default("ocr_ttl_seconds", 3600)
            .map_err(config_err)?
            .set_default("result_ttl_seconds", 3600)
            .map_err(config_err)?
            .set_default("max_upload_bytes", 2_147_483_648_i64)
            .map_err(config_err)?
            .set_default("trust_proxy", false)
            .map_err(config_err)?
            .set_default("tier_limits", default_tier_limits_raw())
            .map_err(config_err)?;

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(false));
        }
        builder = builder.add_source(EnvSource::with_prefix("EVIDENCE").separator("__").try_parsing(true));

        let raw: RawConfig = builder
            .build()
            .map_err(config_err)?
            .try_deserialize()
            .map_err(config_err)?;

        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Result<Self, CoreError> {
        let is_production = raw.env == Environment::Production;

        let content_store_root = match (raw.content_store_root, is_production) {
            (Some(value), _) => value,
            (None, false) => DEFAULT_CONTENT_STORE_ROOT.to_string(),
            (None, true) => {
                return Err(CoreError::internal("content_store_root is required in production"))
            }
        };

        let metadata_url = match (raw.metadata_url, is_production) {
            (Some(value), _) => value,
            (None, false) => DEFAULT_METADATA_URL.to_string(),
            (None, true) => return Err(CoreError::internal("metadata_url is required in production")),
        };

        if raw.cache_backend == CacheBackend::Remote && raw.cache_url.is_none() {
            return Err(CoreError::internal("cache_url is required when cache_backend is remote"));
        }
        if raw.worker_pool_size == 0 {
            return Err(CoreError::internal("worker_pool_size must be at least 1"));
        }
        if raw.queue_capacity == 0 {
            return Err(CoreError::internal("queue_capacity must be at least 1"));
        }

        Ok(Self {
            env: raw.env,
            content_store_root,
            metadata_url,
            cache_backend: raw.cache_backend,
            cache_url: raw.cache_url,
            worker_pool_size: raw.worker_pool_size,
            queue_capacity: raw.queue_capacity,
            transcript_ttl_seconds: raw.transcript_ttl_seconds,
            ocr_ttl_seconds: raw.ocr_ttl_seconds,
            result_ttl_seconds: raw.result_ttl_seconds,
            tier_limits: raw.tier_limits,
            max_upload_bytes: raw.max_upload_bytes,
            trust_proxy: raw.trust_proxy,
        })
    }
}

fn default_tier_limits_raw() -> HashMap<String, config::Value> {
    let tiers: [(&str, i64, i64, i64); 4] = [
        ("free", 5, 0, 10),
        ("starter", 50, 5, 60),
        ("professional", 500, 50, 300),
        ("admin", -1, -1, -1),
    ];
    tiers
        .into_iter()
        .map(|(name, uploads, videos, api_calls)| {
            let mut entry = HashMap::new();
            entry.insert("uploads_per_month".to_string(), config::Value::from(uploads));
            entry.insert("videos_per_month".to_string(), config::Value::from(videos));
            entry.insert("api_calls_per_minute".to_string(), config::Value::from(api_calls));
            (name.to_string(), config::Value::from(entry))
        })
        .collect()
}

fn config_err(err: impl std::fmt::Display) -> CoreError {
    CoreError::internal(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_development_defaults_with_no_file() {
        let config = AppConfig::load(None).unwrap();
        assert_eq!(config.env, Environment::Development);
        assert_eq!(config.content_store_root, DEFAULT_CONTENT_STORE_ROOT);
        assert_eq!(config.worker_pool_size, 4);
        assert!(config.tier_limits.contains_key("professional"));
        assert!(TierLimits::is_unlimited(config.tier_limits["admin"].uploads_per_month));
    }

    #[test]
    fn production_without_required_keys_fails_to_load() {
        std::env::set_var("EVIDENCE__ENV", "production");
        let result = AppConfig::load(None);
        std::env::remove_var("EVIDENCE__ENV");
        assert!(result.is_err());
    }

    #[test]
    fn remote_cache_without_url_is_rejected() {
        std::env::set_var("EVIDENCE__CACHE_BACKEND", "remote");
        let result = AppConfig::load(None);
        std::env::remove_var("EVIDENCE__CACHE_BACKEND");
        assert!(result.is_err());
    }
}
