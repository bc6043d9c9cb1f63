// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The fixed table of [`OperationDescriptor`]s every gated use case passes
//! to [`AccessQuotaGate::gate`] (spec.md §4.8). Kept in one place so the
//! tier floor, feature flag, and counter name for a given operation are
//! never duplicated at the call site.

use crate::application::services::OperationDescriptor;
use evidence_domain::value_objects::Tier;

/// `Ingest` for document/image evidence (spec.md §4.1), metered against
/// the `pdf_documents_processed` monthly counter (SPEC_FULL.md §6.4).
pub const INGEST_DOCUMENT: OperationDescriptor = OperationDescriptor {
    name: "ingest_document",
    tier_floor: Tier::Free,
    feature_flag: None,
    counter_name: "pdf_documents_processed",
    audit_worthy: true,
};

/// `Ingest` for video/audio evidence, metered against `videos_processed`.
pub const INGEST_VIDEO: OperationDescriptor = OperationDescriptor {
    name: "ingest_video",
    tier_floor: Tier::Free,
    feature_flag: None,
    counter_name: "videos_processed",
    audit_worthy: true,
};

/// Free tier may ingest but not run the pipeline stages (spec.md §8 S2:
/// a free-tier `Process` call is denied with `InsufficientTier`).
pub const PROCESS: OperationDescriptor = OperationDescriptor {
    name: "process",
    tier_floor: Tier::Starter,
    feature_flag: None,
    counter_name: "api_calls",
    audit_worthy: true,
};

pub const REPROCESS: OperationDescriptor = OperationDescriptor {
    name: "reprocess",
    tier_floor: Tier::Starter,
    feature_flag: None,
    counter_name: "api_calls",
    audit_worthy: true,
};

pub const REPORT: OperationDescriptor = OperationDescriptor {
    name: "report",
    tier_floor: Tier::Free,
    feature_flag: None,
    counter_name: "api_calls",
    audit_worthy: false,
};

/// Export Bundle is gated behind the `export_bundle` feature flag (spec.md
/// §6.3): only tiers whose [`TierPolicy::feature_flags`](crate::application::services::TierPolicy)
/// carries it may call `Export`.
pub const EXPORT: OperationDescriptor = OperationDescriptor {
    name: "export",
    tier_floor: Tier::Professional,
    feature_flag: Some("export_bundle"),
    counter_name: "api_calls",
    audit_worthy: true,
};

pub const ISSUE_API_KEY: OperationDescriptor = OperationDescriptor {
    name: "issue_api_key",
    tier_floor: Tier::Starter,
    feature_flag: None,
    counter_name: "api_calls",
    audit_worthy: true,
};

pub const REVOKE_API_KEY: OperationDescriptor = OperationDescriptor {
    name: "revoke_api_key",
    tier_floor: Tier::Starter,
    feature_flag: None,
    counter_name: "api_calls",
    audit_worthy: true,
};

pub const RATE_LIMIT_STATUS: OperationDescriptor = OperationDescriptor {
    name: "rate_limit_status",
    tier_floor: Tier::Free,
    feature_flag: None,
    counter_name: "api_calls",
    audit_worthy: false,
};
