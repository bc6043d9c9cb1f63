// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! UsageCounter — per-user, per-month metering row (spec.md §3).
//!
//! Invariant: counters are monotonically non-decreasing within a month; a
//! new month rolls to a fresh row.

use crate::value_objects::{UserId, YearMonth};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterValues {
    pub pdf_documents_processed: u64,
    pub videos_processed: u64,
    pub video_hours: u64,
    pub transcription_minutes: u64,
    pub api_calls: u64,
    pub cases_created: u64,
}

impl CounterValues {
    pub fn get(&self, name: &str) -> u64 {
        match name {
            "pdf_documents_processed" => self.pdf_documents_processed,
            "videos_processed" => self.videos_processed,
            "video_hours" => self.video_hours,
            "transcription_minutes" => self.transcription_minutes,
            "api_calls" => self.api_calls,
            "cases_created" => self.cases_created,
            _ => 0,
        }
    }

    pub fn add(&mut self, name: &str, amount: u64) {
        match name {
            "pdf_documents_processed" => self.pdf_documents_processed += amount,
            "videos_processed" => self.videos_processed += amount,
            "video_hours" => self.video_hours += amount,
            "transcription_minutes" => self.transcription_minutes += amount,
            "api_calls" => self.api_calls += amount,
            "cases_created" => self.cases_created += amount,
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageCounter {
    pub user_id: UserId,
    pub year_month: YearMonth,
    pub counters: CounterValues,
}

impl UsageCounter {
    pub fn new_for(user_id: UserId, year_month: YearMonth) -> Self {
        Self { user_id, year_month, counters: CounterValues::default() }
    }
}
