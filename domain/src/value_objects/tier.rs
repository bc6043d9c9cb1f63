// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Subscription tier — selects quotas, rate capacities, and feature flags
//! (spec.md §3, GLOSSARY).

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Ordered `free < starter < professional < premium < enterprise`; `admin`
/// satisfies any floor (spec.md §4.8 step 2) without itself being on the
/// linear scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Free,
    Starter,
    Professional,
    Premium,
    Enterprise,
    Admin,
}

impl Tier {
    fn rank(self) -> u8 {
        match self {
            Tier::Free => 0,
            Tier::Starter => 1,
            Tier::Professional => 2,
            Tier::Premium => 3,
            Tier::Enterprise => 4,
            Tier::Admin => u8::MAX,
        }
    }

    /// `self` meets or exceeds `floor`; admin always passes.
    pub fn meets_floor(self, floor: Tier) -> bool {
        self == Tier::Admin || self.rank() >= floor.rank()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Starter => "starter",
            Tier::Professional => "professional",
            Tier::Premium => "premium",
            Tier::Enterprise => "enterprise",
            Tier::Admin => "admin",
        }
    }
}

impl PartialOrd for Tier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Tier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_meets_any_floor() {
        assert!(Tier::Admin.meets_floor(Tier::Enterprise));
        assert!(Tier::Admin.meets_floor(Tier::Free));
    }

    #[test]
    fn tier_ordering_is_linear() {
        assert!(Tier::Free < Tier::Starter);
        assert!(Tier::Starter < Tier::Professional);
        assert!(Tier::Professional < Tier::Premium);
        assert!(Tier::Premium < Tier::Enterprise);
    }

    #[test]
    fn free_does_not_meet_professional_floor() {
        assert!(!Tier::Free.meets_floor(Tier::Professional));
    }
}
