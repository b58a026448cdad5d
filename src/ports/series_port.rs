//! Time-series provider port.

use crate::domain::error::FetchError;
use crate::domain::series::TimeSeries;
use chrono::NaiveDate;

pub trait SeriesPort {
    /// Human-readable provider name for logs and warnings.
    fn name(&self) -> &str;

    /// Observations of `indicator_id` on or after `start_date`.
    fn fetch_series(
        &self,
        indicator_id: &str,
        start_date: NaiveDate,
    ) -> Result<TimeSeries, FetchError>;
}
