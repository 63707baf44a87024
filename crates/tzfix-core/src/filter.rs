use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("cannot parse {raw:?} as a date or datetime")]
pub struct TimeBoundError {
    pub raw: String,
}

/// One end of a capture-time range.
///
/// `Floating` values carry no offset and are sent as-is; the catalog decides
/// how to interpret them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeBound {
    Absolute(DateTime<FixedOffset>),
    Floating(NaiveDateTime),
}

impl TimeBound {
    /// Parses the lower bound of a range.
    pub fn parse_start(raw: &str) -> Result<Self, TimeBoundError> {
        Self::parse(raw)
    }

    /// Parses the upper bound of a range. A floating bound at exactly midnight
    /// (including a bare date) is widened to the last microsecond of that day.
    pub fn parse_end(raw: &str) -> Result<Self, TimeBoundError> {
        Ok(match Self::parse(raw)? {
            TimeBound::Floating(dt) if dt.time() == NaiveTime::MIN => {
                let end_of_day = NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999)
                    .unwrap_or(NaiveTime::MIN);
                TimeBound::Floating(dt.date().and_time(end_of_day))
            }
            other => other,
        })
    }

    fn parse(raw: &str) -> Result<Self, TimeBoundError> {
        let trimmed = raw.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(TimeBound::Absolute(dt));
        }
        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
                return Ok(TimeBound::Floating(dt));
            }
        }
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            return Ok(TimeBound::Floating(date.and_time(NaiveTime::MIN)));
        }

        Err(TimeBoundError {
            raw: raw.to_string(),
        })
    }
}

impl fmt::Display for TimeBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeBound::Absolute(dt) => f.write_str(&dt.to_rfc3339()),
            TimeBound::Floating(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
        }
    }
}

impl Serialize for TimeBound {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Search criteria for one batch, serialized in the catalog's request shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilter {
    pub is_visible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taken_after: Option<TimeBound>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taken_before: Option<TimeBound>,
}

impl Default for SearchFilter {
    fn default() -> Self {
        Self {
            is_visible: true,
            original_file_name: None,
            taken_after: None,
            taken_before: None,
        }
    }
}

impl SearchFilter {
    pub fn is_unrestricted(&self) -> bool {
        self.original_file_name.is_none() && self.taken_after.is_none() && self.taken_before.is_none()
    }
}
