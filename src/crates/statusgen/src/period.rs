//! Reporting periods
//!
//! A period is either a relative keyword or an explicit `YYYY-MM-DD to YYYY-MM-DD`
//! range. Anything else is rejected at parse time.

use crate::error::{Result, StatusError};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const DATE_FORMAT: &str = "%Y-%m-%d";
const RANGE_SEPARATOR: &str = " to ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportingPeriod {
    LastWeek,
    LastMonth,
    Range { start: NaiveDate, end: NaiveDate },
}

impl ReportingPeriod {
    /// Length in days of a relative window.
    pub fn relative_days(&self) -> Option<i64> {
        match self {
            ReportingPeriod::LastWeek => Some(7),
            ReportingPeriod::LastMonth => Some(30),
            ReportingPeriod::Range { .. } => None,
        }
    }

    /// The window that follows this one, with the same length.
    ///
    /// Relative periods start at `today`; ranges start at their own end date.
    pub fn next(&self, today: NaiveDate) -> ReportingPeriod {
        match *self {
            ReportingPeriod::Range { start, end } => ReportingPeriod::Range {
                start: end,
                end: end + (end - start),
            },
            relative => {
                let days = relative.relative_days().unwrap_or(7);
                ReportingPeriod::Range {
                    start: today,
                    end: today + Duration::days(days),
                }
            }
        }
    }

    /// Cut-off for "prior progress": `now` for relative periods, midnight UTC
    /// of the end date for ranges.
    pub fn end_boundary(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            ReportingPeriod::Range { end, .. } => end.and_time(NaiveTime::MIN).and_utc(),
            _ => now,
        }
    }
}

impl FromStr for ReportingPeriod {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        match trimmed {
            "last_week" => return Ok(ReportingPeriod::LastWeek),
            "last_month" => return Ok(ReportingPeriod::LastMonth),
            _ => {}
        }

        let invalid = || StatusError::InvalidPeriod(s.to_string());
        let (start, end) = trimmed.split_once(RANGE_SEPARATOR).ok_or_else(invalid)?;
        let start = NaiveDate::parse_from_str(start.trim(), DATE_FORMAT).map_err(|_| invalid())?;
        let end = NaiveDate::parse_from_str(end.trim(), DATE_FORMAT).map_err(|_| invalid())?;
        if end < start {
            return Err(invalid());
        }
        Ok(ReportingPeriod::Range { start, end })
    }
}

impl fmt::Display for ReportingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportingPeriod::LastWeek => f.write_str("last_week"),
            ReportingPeriod::LastMonth => f.write_str("last_month"),
            ReportingPeriod::Range { start, end } => write!(
                f,
                "{}{}{}",
                start.format(DATE_FORMAT),
                RANGE_SEPARATOR,
                end.format(DATE_FORMAT)
            ),
        }
    }
}

impl Serialize for ReportingPeriod {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ReportingPeriod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Next period for a raw period string.
pub fn next_period(current: &str, today: NaiveDate) -> Result<String> {
    Ok(current.parse::<ReportingPeriod>()?.next(today).to_string())
}
