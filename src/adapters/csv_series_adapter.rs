//! CSV file series adapter.
//!
//! Reads `{base_path}/{indicator}.csv`. The first column is the date; the
//! value comes from a column headed `value`, `close` or `adj close`, or the
//! second column when none of those exist. Characters outside
//! `[A-Za-z0-9._-]` in the indicator id become `_` in the file name, so
//! `^IXIC` is read from `_IXIC.csv`.

use crate::domain::error::FetchError;
use crate::domain::series::{Observation, TimeSeries};
use crate::ports::series_port::SeriesPort;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fs;
use std::path::{Path, PathBuf};

pub struct CsvSeriesAdapter {
    base_path: PathBuf,
}

impl CsvSeriesAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn file_stem(indicator_id: &str) -> String {
        indicator_id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }

    fn csv_path(&self, indicator_id: &str) -> PathBuf {
        self.base_path
            .join(format!("{}.csv", Self::file_stem(indicator_id)))
    }
}

/// Parse a date cell into a naive calendar date. Timestamps with an offset
/// keep their local date.
pub fn parse_date_cell(cell: &str) -> Option<NaiveDate> {
    let cell = cell.trim();
    if let Ok(date) = NaiveDate::parse_from_str(cell, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(cell, "%Y-%m-%d %H:%M:%S") {
        return Some(ts.date());
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(cell) {
        return Some(ts.date_naive());
    }
    DateTime::parse_from_str(cell, "%Y-%m-%d %H:%M:%S%:z")
        .ok()
        .map(|ts| ts.date_naive())
}

fn is_missing(cell: &str) -> bool {
    matches!(
        cell.trim().to_lowercase().as_str(),
        "" | "." | "nan" | "null" | "na"
    )
}

fn value_column(headers: &csv::StringRecord) -> usize {
    headers
        .iter()
        .position(|h| {
            matches!(
                h.trim().to_lowercase().as_str(),
                "value" | "close" | "adj close"
            )
        })
        .unwrap_or(1)
}

/// Read a series file directly. Rows dated before `start_date` are dropped.
pub fn read_series_file(
    path: &Path,
    indicator_id: &str,
    start_date: NaiveDate,
) -> Result<TimeSeries, FetchError> {
    let content = fs::read_to_string(path).map_err(|e| FetchError::Io {
        indicator: indicator_id.to_string(),
        reason: format!("{}: {}", path.display(), e),
    })?;

    let parse_err = |reason: String| FetchError::Parse {
        indicator: indicator_id.to_string(),
        reason,
    };

    let mut rdr = csv::Reader::from_reader(content.as_bytes());
    let column = value_column(
        rdr.headers()
            .map_err(|e| parse_err(format!("CSV header error: {}", e)))?,
    );

    let mut observations = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| parse_err(format!("CSV parse error: {}", e)))?;

        let date_str = record
            .get(0)
            .ok_or_else(|| parse_err("missing date column".into()))?;
        let date = parse_date_cell(date_str)
            .ok_or_else(|| parse_err(format!("invalid date '{}'", date_str)))?;

        if date < start_date {
            continue;
        }

        let value_str = record
            .get(column)
            .ok_or_else(|| parse_err("missing value column".into()))?;
        if is_missing(value_str) {
            continue;
        }
        let value: f64 = value_str
            .trim()
            .parse()
            .map_err(|e| parse_err(format!("invalid value '{}': {}", value_str, e)))?;

        observations.push(Observation::new(date, value));
    }

    observations.sort_by(Observation::chronological_cmp);
    Ok(TimeSeries::new(observations))
}

impl SeriesPort for CsvSeriesAdapter {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch_series(
        &self,
        indicator_id: &str,
        start_date: NaiveDate,
    ) -> Result<TimeSeries, FetchError> {
        read_series_file(&self.csv_path(indicator_id), indicator_id, start_date)
    }
}
