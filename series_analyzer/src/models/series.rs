//! A collection of time-series rows in upload order.

use chrono::{DateTime, Utc};

use crate::models::candle::Candle;

/// Represents one complete uploaded data set.
///
/// Rows are kept exactly as uploaded and are not assumed to be sorted by
/// time; consumers filter by range predicate, never by position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandleSeries {
    /// The rows, in upload order.
    pub candles: Vec<Candle>,
}

impl CandleSeries {
    pub fn new(candles: Vec<Candle>) -> Self {
        Self { candles }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Earliest timestamp present. Scans every row because the series may be
    /// unsorted.
    pub fn min_timestamp(&self) -> Option<DateTime<Utc>> {
        self.candles.iter().map(|c| c.timestamp).min()
    }

    /// Latest timestamp present. Scans every row because the series may be
    /// unsorted.
    pub fn max_timestamp(&self) -> Option<DateTime<Utc>> {
        self.candles.iter().map(|c| c.timestamp).max()
    }
}
