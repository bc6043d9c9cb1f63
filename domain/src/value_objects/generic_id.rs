// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Generic, time-ordered identifier shared by every entity id in this crate.
//!
//! Each concrete id (`UserId`, `EvidenceId`, ...) is a newtype over
//! `GenericId<Marker>` so that two ids of different entity kinds can never
//! be confused at compile time, while the ULID machinery (generation,
//! parsing, ordering, validation) is written exactly once.

use crate::CoreError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::marker::PhantomData;
use ulid::Ulid;

/// Per-entity validation and naming, implemented once per marker type.
pub trait IdCategory: Clone + Eq + std::fmt::Debug + Serialize + DeserializeOwned {
    /// Human-readable category name used in error messages (e.g. `"evidence"`).
    fn category_name() -> &'static str;

    /// Category-specific validation beyond "is a well-formed ULID".
    fn validate(_ulid: &Ulid) -> Result<(), CoreError> {
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenericId<M: IdCategory> {
    ulid: Ulid,
    #[serde(skip)]
    _marker: PhantomData<M>,
}

impl<M: IdCategory> GenericId<M> {
    pub fn new() -> Self {
        Self { ulid: Ulid::new(), _marker: PhantomData }
    }

    pub fn from_ulid(ulid: Ulid) -> Result<Self, CoreError> {
        M::validate(&ulid)?;
        Ok(Self { ulid, _marker: PhantomData })
    }

    pub fn from_string(s: &str) -> Result<Self, CoreError> {
        let ulid = Ulid::from_string(s).map_err(|e| {
            CoreError::malformed_request(format!("invalid {} id '{}': {}", M::category_name(), s, e))
        })?;
        Self::from_ulid(ulid)
    }

    pub fn as_ulid(&self) -> Ulid {
        self.ulid
    }

    pub fn timestamp_ms(&self) -> u64 {
        self.ulid.timestamp_ms()
    }
}

impl<M: IdCategory> Default for GenericId<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: IdCategory> Clone for GenericId<M> {
    fn clone(&self) -> Self {
        Self { ulid: self.ulid, _marker: PhantomData }
    }
}
impl<M: IdCategory> Copy for GenericId<M> {}
impl<M: IdCategory> PartialEq for GenericId<M> {
    fn eq(&self, other: &Self) -> bool {
        self.ulid == other.ulid
    }
}
impl<M: IdCategory> Eq for GenericId<M> {}
impl<M: IdCategory> PartialOrd for GenericId<M> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl<M: IdCategory> Ord for GenericId<M> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.ulid.cmp(&other.ulid)
    }
}
impl<M: IdCategory> std::hash::Hash for GenericId<M> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.ulid.hash(state);
    }
}
impl<M: IdCategory> std::fmt::Debug for GenericId<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Id({})", M::category_name(), self.ulid)
    }
}
impl<M: IdCategory> Display for GenericId<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ulid)
    }
}
