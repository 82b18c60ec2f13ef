//! The analysis engine: filter an uploaded series by date range, derive a
//! per-row column, and aggregate it into a [`Report`].
//!
//! The engine is a pure function of its inputs. Identical inputs always
//! produce an identical report.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{candle::Candle, range::DateRange, series::CandleSeries};
use crate::report::Report;

/// How many trailing derived rows a report shows.
const RECENT_ROWS: usize = 5;

/// Which statistic to derive per row (serde snake_case, matching the menu
/// button payloads).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    /// Mean of `(high + low) / 2` per row.
    Weekly,
    /// Mean of `high - low` per row.
    Daily,
}

impl AnalysisKind {
    /// The derived value for one row.
    pub fn derive(&self, candle: &Candle) -> f64 {
        match self {
            Self::Weekly => (candle.high + candle.low) / 2.0,
            Self::Daily => candle.high - candle.low,
        }
    }
}

/// A kind name that is neither `weekly` nor `daily`.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown analysis kind: '{0}'")]
pub struct UnknownKindError(pub String);

impl FromStr for AnalysisKind {
    type Err = UnknownKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weekly" => Ok(Self::Weekly),
            "daily" => Ok(Self::Daily),
            other => Err(UnknownKindError(other.to_string())),
        }
    }
}

/// Errors from [`analyze`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalysisError {
    /// The requested range matched no rows. Aggregates over an empty set are
    /// undefined, so this is reported instead of a NaN-filled report. A
    /// backwards range (end before start) lands here too.
    #[error("no data in the requested range")]
    EmptyRange,
}

/// Filters `series` by `range` and aggregates the derived column.
///
/// Filtering preserves upload order; the report's recent-values block is the
/// tail of the filtered rows, not a time-sorted tail. For an open-ended
/// range the echoed end date is the latest timestamp among the filtered
/// rows.
pub fn analyze(
    series: &CandleSeries,
    kind: AnalysisKind,
    range: &DateRange,
) -> Result<Report, AnalysisError> {
    let derived: Vec<(DateTime<Utc>, f64)> = series
        .candles
        .iter()
        .filter(|c| range.contains(c.timestamp))
        .map(|c| (c.timestamp, kind.derive(c)))
        .collect();

    if derived.is_empty() {
        return Err(AnalysisError::EmptyRange);
    }

    let periods = derived.len();
    let mean = derived.iter().map(|(_, v)| v).sum::<f64>() / periods as f64;

    let mut max = f64::NEG_INFINITY;
    let mut min = f64::INFINITY;
    for (_, v) in &derived {
        max = max.max(*v);
        min = min.min(*v);
    }

    let end = match range.end() {
        Some(end) => end,
        None => derived
            .iter()
            .map(|(ts, _)| *ts)
            .max()
            .unwrap_or_else(|| range.start()),
    };

    let recent = derived[periods.saturating_sub(RECENT_ROWS)..].to_vec();

    Ok(Report {
        kind,
        start: range.start(),
        end,
        mean,
        max,
        min,
        periods,
        recent,
    })
}
