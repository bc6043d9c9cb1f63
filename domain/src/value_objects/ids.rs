// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Entity identifiers.
//!
//! Every id in the data model (spec.md §3) is a distinct newtype so that,
//! for example, a `UserId` can never be passed where an `EvidenceId` is
//! expected. All of them share the ULID machinery in [`generic_id`].

use super::generic_id::{GenericId, IdCategory};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

macro_rules! entity_id {
    ($id:ident, $marker:ident, $category:literal) => {
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $id(GenericId<$marker>);

        #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
        pub struct $marker;

        impl IdCategory for $marker {
            fn category_name() -> &'static str {
                $category
            }
        }

        impl $id {
            pub fn new() -> Self {
                Self(GenericId::new())
            }

            pub fn from_ulid(ulid: Ulid) -> Result<Self, crate::CoreError> {
                Ok(Self(GenericId::from_ulid(ulid)?))
            }

            pub fn parse(s: &str) -> Result<Self, crate::CoreError> {
                Ok(Self(GenericId::from_string(s)?))
            }

            pub fn as_ulid(&self) -> Ulid {
                self.0.as_ulid()
            }
        }

        impl Default for $id {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Debug for $id {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::fmt::Display for $id {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $id {
            type Err = crate::CoreError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }
    };
}

entity_id!(UserId, UserMarker, "user");
entity_id!(ApiKeyId, ApiKeyMarker, "api_key");
entity_id!(EvidenceId, EvidenceMarker, "evidence");
entity_id!(AnalysisId, AnalysisMarker, "analysis");
entity_id!(AuditEventId, AuditEventMarker, "audit_event");
entity_id!(SessionId, SessionMarker, "session");
