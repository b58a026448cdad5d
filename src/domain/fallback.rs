//! Deterministic placeholder data used when a provider fails.
//!
//! Ingest calls these on the `Err` branch of a fetch; the aligner and the
//! classifier never know whether they are looking at real or synthetic data
//! beyond [`MacroSnapshot::series_available`].

use crate::domain::series::{Observation, TimeSeries};
use crate::domain::signal::MacroSnapshot;
use chrono::NaiveDate;

pub const SYNTHETIC_PERIODS: usize = 24;
const SYNTHETIC_START: (i32, u32) = (2023, 1);

/// Last calendar day of the month `offset` months after the synthetic start.
fn month_end(offset: usize) -> Option<NaiveDate> {
    let (year, month) = SYNTHETIC_START;
    let months = (year * 12 + month as i32 - 1) + offset as i32 + 1;
    let next_first = NaiveDate::from_ymd_opt(months.div_euclid(12), months.rem_euclid(12) as u32 + 1, 1)?;
    next_first.pred_opt()
}

fn synthetic(value_at: impl Fn(usize) -> f64) -> TimeSeries {
    (0..SYNTHETIC_PERIODS)
        .filter_map(|i| month_end(i).map(|date| Observation::new(date, value_at(i))))
        .collect()
}

/// Month-end liquidity: `20000 + 50 * i` from 2023-01-31.
pub fn synthetic_liquidity_series() -> TimeSeries {
    synthetic(|i| 20_000.0 + 50.0 * i as f64)
}

/// Month-end financial conditions: `-0.5 + 0.01 * i` from 2023-01-31.
pub fn synthetic_conditions_series() -> TimeSeries {
    synthetic(|i| -0.5 + 0.01 * i as f64)
}

pub fn fallback_snapshot() -> MacroSnapshot {
    MacroSnapshot {
        latest_liquidity: 21_000.0,
        previous_liquidity: 20_800.0,
        latest_financial_conditions: -0.5,
        series_available: false,
    }
}
