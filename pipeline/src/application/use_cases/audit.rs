// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `AuditVerify` (spec.md §4.9, §6.1): recomputes the digest over a
//! partition range and hands back both the events and the digest so a
//! caller can compare it against a previously recorded value.

use std::sync::Arc;

use evidence_domain::entities::AuditEvent;
use evidence_domain::error::CoreError;
use evidence_domain::value_objects::ContentDigest;

use crate::application::services::AuditLogger;

pub struct AuditVerifyUseCase {
    audit: Arc<AuditLogger>,
}

impl AuditVerifyUseCase {
    pub fn new(audit: Arc<AuditLogger>) -> Self {
        Self { audit }
    }

    pub async fn execute(&self, from_partition: &str, to_partition: &str) -> Result<(Vec<AuditEvent>, ContentDigest), CoreError> {
        self.audit.verify(from_partition, to_partition).await
    }
}
