//! Canonical in-memory representation of one uploaded time-series row.
//!
//! This struct is the standard unit handed from [`crate::ingest`] to
//! [`crate::analysis`], regardless of where the upload came from.

use chrono::{DateTime, Utc};

/// A single time-series row with a high and a low observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candle {
    /// The timestamp for this row (UTC).
    pub timestamp: DateTime<Utc>,

    /// Highest value observed during the interval.
    pub high: f64,

    /// Lowest value observed during the interval.
    pub low: f64,
}
