//! One evaluation cycle: fetch, classify, forecast, align.

use crate::domain::aligner::{AlignedTable, align_labelled};
use crate::domain::forecast::{AssetClass, AssetForecast, ForecastTable, Forecasts, forecast_signal};
use crate::domain::ingest::{AssetHistory, MacroInputs, Provenance, load_asset_history, load_macro_inputs};
use crate::domain::series::{Frequency, TimeSeries};
use crate::domain::signal::{MacroSignal, MacroSnapshot, SignalRules};
use crate::ports::series_port::SeriesPort;
use chrono::{Days, NaiveDate};
use tracing::debug;

pub const DEFAULT_MANUFACTURING_INDEX: f64 = 48.2;

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub liquidity_series: String,
    pub conditions_series: String,
    pub macro_lookback_days: i64,
    pub price_lookback_days: i64,
    /// Provider symbol per asset class, indexed by [`AssetClass::index`].
    pub symbols: [String; 4],
    pub manufacturing_index: f64,
    pub signal_rules: SignalRules,
    pub forecast_table: ForecastTable,
}

impl DashboardConfig {
    pub fn symbol(&self, asset: AssetClass) -> &str {
        &self.symbols[asset.index()]
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            liquidity_series: "M2SL".to_string(),
            conditions_series: "NFCI".to_string(),
            macro_lookback_days: 730,
            price_lookback_days: 365,
            symbols: AssetClass::ALL.map(|a| a.default_symbol().to_string()),
            manufacturing_index: DEFAULT_MANUFACTURING_INDEX,
            signal_rules: SignalRules::default(),
            forecast_table: ForecastTable::standard(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AssetPanel {
    pub asset: AssetClass,
    pub symbol: String,
    pub latest_price: Option<f64>,
    pub history: TimeSeries,
    pub history_frequency: Frequency,
    pub provenance: Provenance,
    pub aligned: AlignedTable,
    pub forecast: AssetForecast,
}

#[derive(Debug, Clone)]
pub struct DashboardReport {
    pub generated_on: NaiveDate,
    pub snapshot: MacroSnapshot,
    pub signal: MacroSignal,
    pub manufacturing_index: f64,
    pub forecasts: Forecasts,
    pub liquidity: TimeSeries,
    pub liquidity_frequency: Frequency,
    pub conditions: TimeSeries,
    pub panels: Vec<AssetPanel>,
    pub warnings: Vec<String>,
}

impl DashboardReport {
    pub fn panel(&self, asset: AssetClass) -> Option<&AssetPanel> {
        self.panels.iter().find(|p| p.asset == asset)
    }
}

/// Assemble the report from already-fetched inputs. Pure.
pub fn build_dashboard(
    inputs: MacroInputs,
    histories: [AssetHistory; 4],
    config: &DashboardConfig,
    generated_on: NaiveDate,
) -> DashboardReport {
    let signal = inputs.snapshot.classify(&config.signal_rules);
    let forecasts = forecast_signal(&config.forecast_table, &signal, config.manufacturing_index);
    let liquidity_frequency = Frequency::infer(&inputs.liquidity);

    let mut warnings = inputs.warnings;
    let mut panels = Vec::with_capacity(AssetClass::ALL.len());

    for (asset, history) in AssetClass::ALL.into_iter().zip(histories) {
        if let Some(w) = history.warning {
            warnings.push(w);
        }

        let history_frequency = Frequency::infer(&history.series);
        if history_frequency.is_sub_monthly() || liquidity_frequency.is_sub_monthly() {
            debug!(
                symbol = %history.symbol,
                asset_frequency = %history_frequency,
                liquidity_frequency = %liquidity_frequency,
                "resampling to monthly periods"
            );
        }

        let aligned = align_labelled(&history.series, &inputs.liquidity, &history.symbol);
        if aligned.is_empty() && !history.series.is_empty() {
            warnings.push(format!(
                "{}: no overlapping months with {}",
                history.symbol, config.liquidity_series
            ));
        }

        panels.push(AssetPanel {
            asset,
            symbol: history.symbol,
            latest_price: history.latest_price,
            history: history.series,
            history_frequency,
            provenance: history.provenance,
            aligned,
            forecast: *forecasts.get(asset),
        });
    }

    DashboardReport {
        generated_on,
        snapshot: inputs.snapshot,
        signal,
        manufacturing_index: config.manufacturing_index,
        forecasts,
        liquidity: inputs.liquidity,
        liquidity_frequency,
        conditions: inputs.conditions,
        panels,
        warnings,
    }
}

/// `today` minus `lookback_days`, saturating at the earliest representable
/// date. A negative lookback counts as zero.
pub fn lookback_start(today: NaiveDate, lookback_days: i64) -> NaiveDate {
    let days = Days::new(lookback_days.max(0).unsigned_abs());
    today.checked_sub_days(days).unwrap_or(NaiveDate::MIN)
}

/// Full cycle against the given providers.
pub fn run_dashboard(
    macro_port: &dyn SeriesPort,
    price_port: &dyn SeriesPort,
    config: &DashboardConfig,
    today: NaiveDate,
) -> DashboardReport {
    let macro_start = lookback_start(today, config.macro_lookback_days);
    let price_start = lookback_start(today, config.price_lookback_days);

    let inputs = load_macro_inputs(
        macro_port,
        &config.liquidity_series,
        &config.conditions_series,
        macro_start,
    );
    let histories =
        AssetClass::ALL.map(|asset| load_asset_history(price_port, config.symbol(asset), price_start));

    build_dashboard(inputs, histories, config, today)
}
