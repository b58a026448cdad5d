//! Provider orchestration.
//!
//! Fetches raw series through a [`SeriesPort`] and turns every provider
//! failure into a deterministic substitute plus a warning, so that the
//! aligner and the classifier only ever see well-formed series.

use crate::domain::error::FetchError;
use crate::domain::fallback::{
    fallback_snapshot, synthetic_conditions_series, synthetic_liquidity_series,
};
use crate::domain::series::TimeSeries;
use crate::domain::signal::MacroSnapshot;
use crate::ports::series_port::SeriesPort;
use chrono::NaiveDate;
use tracing::{debug, info, warn};

/// Where a series came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Provider,
    Synthetic,
    Unavailable,
}

#[derive(Debug, Clone)]
pub struct MacroInputs {
    pub liquidity: TimeSeries,
    pub liquidity_provenance: Provenance,
    pub conditions: TimeSeries,
    pub conditions_provenance: Provenance,
    pub snapshot: MacroSnapshot,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct AssetHistory {
    pub symbol: String,
    pub series: TimeSeries,
    pub latest_price: Option<f64>,
    pub provenance: Provenance,
    pub warning: Option<String>,
}

fn fetch_logged(
    port: &dyn SeriesPort,
    indicator_id: &str,
    start_date: NaiveDate,
) -> Result<TimeSeries, FetchError> {
    debug!(provider = port.name(), indicator_id, %start_date, "fetching series");
    let result = port.fetch_series(indicator_id, start_date);
    match &result {
        Ok(series) => info!(
            provider = port.name(),
            indicator_id,
            observations = series.len(),
            "series fetched"
        ),
        Err(e) => warn!(provider = port.name(), indicator_id, error = %e, "fetch failed"),
    }
    result
}

/// Warning text for a series replaced by synthetic data. Credential
/// failures are tagged so the user can tell them apart from outages.
fn substitution_warning(indicator_id: &str, err: &FetchError) -> String {
    if err.is_credential() {
        format!(
            "{}: {} (credential problem, using synthetic data)",
            indicator_id, err
        )
    } else {
        format!("{}: {} (using synthetic data)", indicator_id, err)
    }
}

/// Liquidity and financial-conditions series plus the classifier snapshot.
///
/// A failed series is replaced by its synthetic counterpart. The snapshot is
/// read from the series only when both came from the provider and hold
/// enough points; otherwise the fixed fallback snapshot is used.
pub fn load_macro_inputs(
    port: &dyn SeriesPort,
    liquidity_id: &str,
    conditions_id: &str,
    start_date: NaiveDate,
) -> MacroInputs {
    let mut warnings = Vec::new();

    let (liquidity, liquidity_provenance) = match fetch_logged(port, liquidity_id, start_date) {
        Ok(series) => (series, Provenance::Provider),
        Err(e) => {
            warnings.push(substitution_warning(liquidity_id, &e));
            (synthetic_liquidity_series(), Provenance::Synthetic)
        }
    };

    let (conditions, conditions_provenance) = match fetch_logged(port, conditions_id, start_date) {
        Ok(series) => (series, Provenance::Provider),
        Err(e) => {
            warnings.push(substitution_warning(conditions_id, &e));
            (synthetic_conditions_series(), Provenance::Synthetic)
        }
    };

    let both_real =
        liquidity_provenance == Provenance::Provider && conditions_provenance == Provenance::Provider;
    let snapshot = match MacroSnapshot::from_series(&liquidity, &conditions) {
        Some(snapshot) if both_real => snapshot,
        Some(_) => fallback_snapshot(),
        None => {
            warnings.push(format!(
                "{}/{}: not enough observations for a snapshot (using fallback values)",
                liquidity_id, conditions_id
            ));
            fallback_snapshot()
        }
    };

    if !snapshot.series_available {
        warn!("macro snapshot uses fallback values");
    }

    MacroInputs {
        liquidity,
        liquidity_provenance,
        conditions,
        conditions_provenance,
        snapshot,
        warnings,
    }
}

/// Price history for one symbol. A failure yields an empty series and no
/// latest price.
pub fn load_asset_history(port: &dyn SeriesPort, symbol: &str, start_date: NaiveDate) -> AssetHistory {
    match fetch_logged(port, symbol, start_date) {
        Ok(series) => {
            let latest_price = series.latest().map(|o| o.value);
            AssetHistory {
                symbol: symbol.to_string(),
                series,
                latest_price,
                provenance: Provenance::Provider,
                warning: None,
            }
        }
        Err(e) => AssetHistory {
            symbol: symbol.to_string(),
            series: TimeSeries::empty(),
            latest_price: None,
            provenance: Provenance::Unavailable,
            warning: Some(format!("{}: {}", symbol, e)),
        },
    }
}
