#![allow(dead_code)]

use chrono::NaiveDate;
use macrolens::domain::error::FetchError;
pub use macrolens::domain::series::{Observation, TimeSeries};
use macrolens::ports::series_port::SeriesPort;
use std::cell::RefCell;
use std::collections::HashMap;

pub struct MockSeriesPort {
    pub data: HashMap<String, TimeSeries>,
    pub errors: HashMap<String, FetchError>,
    pub requests: RefCell<Vec<(String, NaiveDate)>>,
}

impl MockSeriesPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn with_series(mut self, id: &str, series: TimeSeries) -> Self {
        self.data.insert(id.to_string(), series);
        self
    }

    pub fn with_error(mut self, id: &str, err: FetchError) -> Self {
        self.errors.insert(id.to_string(), err);
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requests.borrow().iter().map(|(id, _)| id.clone()).collect()
    }
}

impl SeriesPort for MockSeriesPort {
    fn name(&self) -> &str {
        "mock"
    }

    fn fetch_series(&self, indicator_id: &str, start_date: NaiveDate) -> Result<TimeSeries, FetchError> {
        self.requests
            .borrow_mut()
            .push((indicator_id.to_string(), start_date));
        if let Some(err) = self.errors.get(indicator_id) {
            return Err(err.clone());
        }
        self.data
            .get(indicator_id)
            .cloned()
            .ok_or_else(|| FetchError::Empty {
                indicator: indicator_id.to_string(),
            })
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// First-of-month observations starting at `start`.
pub fn monthly_series(start: NaiveDate, values: &[f64]) -> TimeSeries {
    let mut current = start;
    let mut out = Vec::with_capacity(values.len());
    for &v in values {
        out.push(Observation::new(current, v));
        current = current
            .checked_add_months(chrono::Months::new(1))
            .unwrap();
    }
    TimeSeries::new(out)
}

/// One observation per calendar day, rising by `step` each day.
pub fn daily_series(start: NaiveDate, count: usize, start_value: f64, step: f64) -> TimeSeries {
    (0..count)
        .map(|i| {
            Observation::new(
                start + chrono::Duration::days(i as i64),
                start_value + step * i as f64,
            )
        })
        .collect()
}

pub fn credential_missing() -> FetchError {
    FetchError::CredentialMissing {
        provider: "FRED".to_string(),
    }
}

/// Macro and price ports where every request succeeds with data covering
/// the first half of 2024.
pub fn healthy_ports() -> (MockSeriesPort, MockSeriesPort) {
    let macro_port = MockSeriesPort::new()
        .with_series(
            "M2SL",
            monthly_series(date(2024, 1, 1), &[20_700.0, 20_750.0, 20_820.0, 20_900.0, 20_950.0, 21_000.0]),
        )
        .with_series(
            "NFCI",
            monthly_series(date(2024, 1, 1), &[-0.40, -0.42, -0.45, -0.47, -0.50, -0.52]),
        );
    let price_port = MockSeriesPort::new()
        .with_series("^IXIC", daily_series(date(2024, 1, 1), 180, 15_000.0, 10.0))
        .with_series("BTC-USD", daily_series(date(2024, 1, 1), 180, 42_000.0, 100.0))
        .with_series("GC=F", daily_series(date(2024, 1, 1), 180, 2_000.0, 1.0))
        .with_series("DX-Y.NYB", daily_series(date(2024, 1, 1), 180, 102.0, 0.01));
    (macro_port, price_port)
}
