use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

/// Only the first few skipped rows are logged individually.
const MAX_LOGGED_SKIPS: usize = 10;

/// Why a single source row was excluded from the dataset.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowError {
    #[error("unparseable timestamp '{0}'")]
    BadTimestamp(String),
    #[error("unknown season code {0}")]
    UnknownSeason(i64),
    #[error("unknown weather code {0}")]
    UnknownWeather(i64),
    #[error("workingday must be 0 or 1, got {0}")]
    BadWorkingDay(i64),
    #[error("holiday must be 0 or 1, got {0}")]
    BadHoliday(i64),
    #[error("invalid {column} count {value}")]
    InvalidCount { column: &'static str, value: i64 },
    #[error("{column} must be a whole number, got {value}")]
    NotInteger { column: &'static str, value: f64 },
    #[error("missing value in required column '{0}'")]
    Missing(&'static str),
    #[error("could not decode row: {0}")]
    Decode(String),
}

impl RowError {
    /// Short, stable name used to bucket skipped rows in a [`LoadReport`].
    pub fn kind(&self) -> &'static str {
        match self {
            RowError::BadTimestamp(_) => "bad timestamp",
            RowError::UnknownSeason(_) => "unknown season",
            RowError::UnknownWeather(_) => "unknown weather",
            RowError::BadWorkingDay(_) => "bad workingday",
            RowError::BadHoliday(_) => "bad holiday",
            RowError::InvalidCount { .. } => "invalid count",
            RowError::NotInteger { .. } => "non-integer value",
            RowError::Missing(_) => "missing value",
            RowError::Decode(_) => "undecodable row",
        }
    }
}

/// Outcome of reading a source file: how many rows were kept and why the
/// rest were dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub rows_read: usize,
    pub rows_kept: usize,
    /// Skipped row count per [`RowError::kind`].
    pub skipped: BTreeMap<String, usize>,
}

impl LoadReport {
    pub fn record_kept(&mut self) {
        self.rows_read += 1;
        self.rows_kept += 1;
    }

    /// Count a dropped row. `row` is the 0-based data row number.
    pub fn record_skip(&mut self, row: usize, err: &RowError) {
        self.rows_read += 1;
        let total = self.skipped_total();
        if total < MAX_LOGGED_SKIPS {
            log::warn!("Skipping row {row}: {err}");
        } else if total == MAX_LOGGED_SKIPS {
            log::warn!("Further skipped rows are not logged individually");
        }
        *self.skipped.entry(err.kind().to_string()).or_default() += 1;
    }

    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }
}
