// /////////////////////////////////////////////////////////////////////////////
// Evidence Processing Platform
// Copyright (c) 2026 Evidence Processing Platform Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! RFC-3339 millisecond-precision serde for `DateTime<Utc>` fields
//! (spec.md §4.7: "timestamps as RFC-3339 UTC with millisecond
//! precision").
//!
//! `chrono`'s default `Serialize` impl preserves whatever sub-second
//! precision the value happens to carry, which is not deterministic
//! across construction paths. Every timestamp that can end up in a
//! canonical report or an audit digest goes through this module via
//! `#[serde(with = "datetime_serde")]` instead.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    DateTime::parse_from_rfc3339(&s).map(|dt| dt.with_timezone(&Utc)).map_err(serde::de::Error::custom)
}

/// `Option<DateTime<Utc>>` counterpart, used on fields such as
/// `completed_at` or `last_used_at` that may be absent.
pub mod optional {
    use super::*;

    pub fn serialize<S>(opt_dt: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match opt_dt {
            Some(dt) => serializer.serialize_some(&dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt_s: Option<String> = Option::deserialize(deserializer)?;
        match opt_s {
            Some(s) => {
                DateTime::parse_from_rfc3339(&s).map(|dt| Some(dt.with_timezone(&Utc))).map_err(serde::de::Error::custom)
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(serde::Serialize, serde::Deserialize)]
    struct Wrapper {
        #[serde(with = "crate::services::datetime_serde")]
        at: DateTime<Utc>,
    }

    #[test]
    fn round_trips_at_millisecond_precision() {
        let at = DateTime::parse_from_rfc3339("2024-01-15T10:30:45.123456789Z").unwrap().with_timezone(&Utc);
        let json = serde_json::to_string(&Wrapper { at }).unwrap();
        assert!(json.contains("2024-01-15T10:30:45.123Z"), "got {json}");
        let back: Wrapper = serde_json::from_str(&json).unwrap();
        assert_eq!(back.at.timestamp_millis(), at.timestamp_millis());
    }
}
