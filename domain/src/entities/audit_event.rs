// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! AuditEvent — append-only log line (spec.md §3, §4.9). Never updated or
//! deleted; corrections are new events referencing the original by id.

use crate::value_objects::{AuditEventId, ContentDigest, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    Evidence { id: String, content_digest: Option<ContentDigest> },
    User { id: String },
    ApiKey { id: String },
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: AuditEventId,
    /// Monotonic sequence number within the event's calendar-day partition
    /// (spec.md §4.9).
    pub sequence: u64,
    pub partition: String,
    /// `None` for system-initiated actions (spec.md §3: "actor user-id
    /// (may be system)").
    pub actor: Option<UserId>,
    pub subject: Subject,
    pub action: String,
    pub outcome: String,
    pub request_fingerprint: Option<String>,
    #[serde(with = "crate::services::datetime_serde")]
    pub timestamp: DateTime<Utc>,
    /// Present only when `action == "correction"`; references the event
    /// being corrected (spec.md §4.9).
    pub corrects: Option<AuditEventId>,
}

impl AuditEvent {
    pub fn partition_for(at: DateTime<Utc>) -> String {
        at.format("%Y-%m-%d").to_string()
    }

    /// Deterministic serialized bytes for digesting a range of events
    /// (spec.md §4.9 `verify`). NFC-normalization/field-sorting is not
    /// needed here because every field is already plain ASCII-safe or a
    /// canonical hex/RFC-3339 string.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let subject = match &self.subject {
            Subject::Evidence { id, content_digest } => {
                format!("evidence:{id}:{}", content_digest.map(|d| d.to_hex()).unwrap_or_default())
            }
            Subject::User { id } => format!("user:{id}"),
            Subject::ApiKey { id } => format!("api_key:{id}"),
            Subject::None => "none".to_string(),
        };
        format!(
            "{}|{}|{}|{}|{}|{}|{}",
            self.partition,
            self.sequence,
            self.actor.map(|a| a.to_string()).unwrap_or_default(),
            subject,
            self.action,
            self.outcome,
            self.timestamp.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        )
        .into_bytes()
    }
}
