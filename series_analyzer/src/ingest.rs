//! CSV ingest: turning uploaded bytes into a [`CandleSeries`].
//!
//! ## What this does
//! - Requires a header row and locates `time`, `high`, `low` by name.
//!   Extra columns are ignored.
//! - Accepts timestamps as RFC 3339, `YYYY-MM-DD HH:MM:SS`, or a bare
//!   `YYYY-MM-DD` (promoted to midnight UTC).
//! - Fails the whole upload on the first bad row; there is no partial
//!   success. Errors carry the offending 1-based data line number.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use snafu::{ResultExt, Snafu};

use crate::models::{candle::Candle, series::CandleSeries};

/// Columns the header row must contain.
const REQUIRED_COLUMNS: [&str; 3] = ["time", "high", "low"];

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum IngestError {
    /// The header row is missing one of the required columns.
    #[snafu(display("missing required column '{name}' (expected: time, high, low)"))]
    MissingColumn { name: String },

    /// The bytes could not be read as CSV at all.
    #[snafu(display("malformed CSV: {source}"))]
    Read { source: csv::Error },

    /// A `time` cell did not parse as a supported timestamp.
    #[snafu(display("bad timestamp on line {line}: '{value}'"))]
    BadTimestamp { line: usize, value: String },

    /// A `high`/`low` cell did not parse as a number.
    #[snafu(display("bad number in column '{column}' on line {line}: '{value}'"))]
    BadNumber {
        line: usize,
        column: String,
        value: String,
    },
}

/// Parses uploaded CSV bytes into a [`CandleSeries`], preserving row order.
pub fn parse_candles(bytes: &[u8]) -> Result<CandleSeries, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = reader.headers().context(ReadSnafu)?.clone();
    let mut indices = [0usize; REQUIRED_COLUMNS.len()];
    for (slot, name) in indices.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| IngestError::MissingColumn { name: name.into() })?;
    }
    let [time_idx, high_idx, low_idx] = indices;

    let mut candles = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.context(ReadSnafu)?;
        let line = i + 1;

        let raw_time = record.get(time_idx).unwrap_or("");
        let timestamp = parse_timestamp(raw_time).ok_or_else(|| IngestError::BadTimestamp {
            line,
            value: raw_time.to_string(),
        })?;

        let high = parse_number(&record, high_idx, "high", line)?;
        let low = parse_number(&record, low_idx, "low", line)?;

        candles.push(Candle {
            timestamp,
            high,
            low,
        });
    }

    Ok(CandleSeries::new(candles))
}

fn parse_number(
    record: &csv::StringRecord,
    idx: usize,
    column: &str,
    line: usize,
) -> Result<f64, IngestError> {
    let raw = record.get(idx).unwrap_or("");
    raw.parse().map_err(|_| IngestError::BadNumber {
        line,
        column: column.to_string(),
        value: raw.to_string(),
    })
}

/// RFC 3339, `YYYY-MM-DD HH:MM:SS`, or bare `YYYY-MM-DD` -> UTC.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
