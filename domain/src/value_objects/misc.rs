// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Small value objects that do not warrant their own module.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pinned rule-set identifier for the Violation Scanner, Compliance
/// Checker, and Motion Recommender (GLOSSARY: "Analyzer profile version").
/// Included in every fingerprint so upgrading the rules invalidates
/// cached results.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalyzerProfileVersion(String);

impl AnalyzerProfileVersion {
    pub fn new(v: impl Into<String>) -> Self {
        Self(v.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for AnalyzerProfileVersion {
    fn default() -> Self {
        Self("v3".to_string())
    }
}

impl fmt::Display for AnalyzerProfileVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Free-text case number tag, part of the fingerprint context subset
/// (spec.md §4.1).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseNumber(String);

impl CaseNumber {
    pub fn new(v: impl Into<String>) -> Self {
        Self(v.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CaseNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque receipt issued by the Gate on a successful grant and redeemed by
/// `Charge` after the protected operation completes (GLOSSARY: "Charge
/// token"). Carries just enough to make `Charge` idempotent and to name
/// the counter it updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeToken {
    token_id: uuid::Uuid,
    pub counter_name: String,
    pub user_id: crate::value_objects::UserId,
}

impl ChargeToken {
    pub fn new(counter_name: impl Into<String>, user_id: crate::value_objects::UserId) -> Self {
        Self { token_id: uuid::Uuid::new_v4(), counter_name: counter_name.into(), user_id }
    }

    pub fn token_id(&self) -> uuid::Uuid {
        self.token_id
    }
}

/// Monthly counter identity: a user plus a calendar year-month (`"2026-08"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        debug_assert!((1..=12).contains(&month));
        Self { year, month }
    }

    pub fn from_date(date: chrono::DateTime<chrono::Utc>) -> Self {
        use chrono::Datelike;
        Self { year: date.year(), month: date.month() }
    }

    pub fn as_key(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_key())
    }
}
