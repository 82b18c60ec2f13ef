//! User-facing report text for a completed analysis.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::analysis::AnalysisKind;

/// Aggregated results for one analysis run.
///
/// Rendering is deterministic: values to 4 decimal places, dates as
/// `YYYY-MM-DD`, sections in a fixed order.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// Which derived column was aggregated.
    pub kind: AnalysisKind,
    /// Start of the analyzed window, as requested.
    pub start: DateTime<Utc>,
    /// End of the analyzed window. For an open-ended request this is the
    /// latest timestamp among the filtered rows.
    pub end: DateTime<Utc>,
    /// Mean of the derived column over the filtered rows.
    pub mean: f64,
    /// Maximum of the derived column.
    pub max: f64,
    /// Minimum of the derived column.
    pub min: f64,
    /// Count of rows that passed the filter.
    pub periods: usize,
    /// Up to the last 5 derived rows, in filtered order.
    pub recent: Vec<(DateTime<Utc>, f64)>,
}

impl Report {
    fn title(&self) -> &'static str {
        match self.kind {
            AnalysisKind::Weekly => "Weekly Averages Analysis",
            AnalysisKind::Daily => "Daily Candle Range Analysis",
        }
    }

    fn mean_label(&self) -> &'static str {
        match self.kind {
            AnalysisKind::Weekly => "Total Average",
            AnalysisKind::Daily => "Average Daily Range",
        }
    }

    fn stat_label(&self) -> &'static str {
        match self.kind {
            AnalysisKind::Weekly => "average",
            AnalysisKind::Daily => "daily range",
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.title())?;
        writeln!(f)?;
        writeln!(
            f,
            "Date Range: {} to {}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )?;
        writeln!(f, "{}: {:.4}", self.mean_label(), self.mean)?;
        writeln!(f)?;
        writeln!(f, "Recent values:")?;
        for (ts, value) in &self.recent {
            writeln!(f, "{}  {:.4}", ts.format("%Y-%m-%d"), value)?;
        }
        writeln!(f)?;
        writeln!(f, "Additional Statistics:")?;
        writeln!(f, "Number of periods analyzed: {}", self.periods)?;
        writeln!(f, "Maximum {}: {:.4}", self.stat_label(), self.max)?;
        write!(f, "Minimum {}: {:.4}", self.stat_label(), self.min)
    }
}
