//! Serde adapters for entity timestamps and due dates.
//!
//! # Invariants
//! - Timestamps are written as RFC 3339 UTC with millisecond precision.
//! - Timestamps are read from RFC 3339 or from a bare `YYYY-MM-DD` date,
//!   which is interpreted as midnight UTC.
//! - Due dates are `YYYY-MM-DD`; an empty string reads as "no due date".
//! - In-memory timestamps never carry more precision than is persisted.

use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serializer};

const DATE_FORMAT: &str = "%Y-%m-%d";
const PERSISTED_SUBSEC_DIGITS: u16 = 3;

/// Current time truncated to the persisted millisecond precision.
pub fn now() -> DateTime<Utc> {
    truncate_to_persisted(Utc::now())
}

/// Drops sub-millisecond digits so the value equals its persisted form.
pub fn truncate_to_persisted(value: DateTime<Utc>) -> DateTime<Utc> {
    value.trunc_subsecs(PERSISTED_SUBSEC_DIGITS)
}

/// Parses an ISO 8601 timestamp or calendar date into UTC.
///
/// Sub-millisecond digits are dropped.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(truncate_to_persisted(parsed.with_timezone(&Utc)));
    }

    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Formats a timestamp the same way it is persisted.
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses a `YYYY-MM-DD` due date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

/// Formats a due date as `YYYY-MM-DD`.
pub fn format_date(value: &NaiveDate) -> String {
    value.format(DATE_FORMAT).to_string()
}

pub(crate) mod required {
    use super::*;
    use serde::de::Error as _;

    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_timestamp(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw)
            .ok_or_else(|| D::Error::custom(format!("invalid timestamp `{raw}`")))
    }
}

pub(crate) mod optional {
    use super::*;
    use serde::de::Error as _;

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => serializer.serialize_str(&format_timestamp(value)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => parse_timestamp(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid timestamp `{raw}`"))),
        }
    }
}

pub(crate) mod optional_date {
    use super::*;
    use serde::de::Error as _;

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => serializer.serialize_str(&format_date(value)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => parse_date(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid due date `{raw}`"))),
        }
    }
}
