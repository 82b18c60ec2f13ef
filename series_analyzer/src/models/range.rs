//! Open/closed date ranges for filtering an uploaded series.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The time window selected by the user (serde snake_case).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateRange {
    /// Inclusive start, open end (through the last available row).
    Open {
        /// Inclusive start timestamp (UTC).
        start: DateTime<Utc>,
    },

    /// Inclusive start..=end.
    Closed {
        /// Inclusive start timestamp (UTC).
        start: DateTime<Utc>,
        /// Inclusive end timestamp (UTC).
        end: DateTime<Utc>,
    },
}

impl DateRange {
    /// Builds a range from a start bound and an optional end bound.
    pub fn new(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Self {
        match end {
            Some(end) => Self::Closed { start, end },
            None => Self::Open { start },
        }
    }

    /// Inclusive start bound.
    pub fn start(&self) -> DateTime<Utc> {
        match *self {
            Self::Open { start } | Self::Closed { start, .. } => start,
        }
    }

    /// Explicit end bound, if the range is closed.
    pub fn end(&self) -> Option<DateTime<Utc>> {
        match *self {
            Self::Open { .. } => None,
            Self::Closed { end, .. } => Some(end),
        }
    }

    /// Whether `ts` falls inside the range, inclusive on both bounds.
    ///
    /// A closed range with `end < start` matches nothing; backwards input is
    /// accepted upstream and simply selects the empty set.
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        match *self {
            Self::Open { start } => ts >= start,
            Self::Closed { start, end } => ts >= start && ts <= end,
        }
    }
}
