//! Per-asset qualitative forecasts from the macro signal.
//!
//! The rules live in a [`ForecastTable`] as data: one rule per asset class,
//! each naming the signal condition it depends on and the outcome on either
//! side of it. [`ForecastTable::standard`] is the canonical table.
//!
//! The reserve-currency rule depends only on financial conditions and
//! ignores the liquidity trend, unlike the other three. This is intended.

use crate::domain::signal::{ConditionsState, MacroSignal, Trend};
use std::fmt;

/// The closed set of tracked asset classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetClass {
    Equity,
    RiskAsset,
    StoreOfValue,
    ReserveCurrency,
}

impl AssetClass {
    pub const ALL: [AssetClass; 4] = [
        AssetClass::Equity,
        AssetClass::RiskAsset,
        AssetClass::StoreOfValue,
        AssetClass::ReserveCurrency,
    ];

    pub fn index(self) -> usize {
        match self {
            AssetClass::Equity => 0,
            AssetClass::RiskAsset => 1,
            AssetClass::StoreOfValue => 2,
            AssetClass::ReserveCurrency => 3,
        }
    }

    /// Key used in the `[assets]` config section.
    pub fn config_key(self) -> &'static str {
        match self {
            AssetClass::Equity => "equity",
            AssetClass::RiskAsset => "risk_asset",
            AssetClass::StoreOfValue => "store_of_value",
            AssetClass::ReserveCurrency => "reserve_currency",
        }
    }

    pub fn default_symbol(self) -> &'static str {
        match self {
            AssetClass::Equity => "^IXIC",
            AssetClass::RiskAsset => "BTC-USD",
            AssetClass::StoreOfValue => "GC=F",
            AssetClass::ReserveCurrency => "DX-Y.NYB",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            AssetClass::Equity => "Equity index",
            AssetClass::RiskAsset => "Risk asset",
            AssetClass::StoreOfValue => "Store of value",
            AssetClass::ReserveCurrency => "Reserve currency index",
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForecastLabel {
    BullishStrong,
    Bullish,
    Lateral,
    Neutral,
    Volatile,
    BearishWeak,
    BearishStrong,
}

impl fmt::Display for ForecastLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ForecastLabel::BullishStrong => "strongly bullish",
            ForecastLabel::Bullish => "bullish",
            ForecastLabel::Lateral => "lateral",
            ForecastLabel::Neutral => "neutral",
            ForecastLabel::Volatile => "volatile",
            ForecastLabel::BearishWeak => "bearish",
            ForecastLabel::BearishStrong => "strongly bearish",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RiskAnnotation {
    ContractionRisk,
}

impl fmt::Display for RiskAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskAnnotation::ContractionRisk => write!(f, "contraction risk"),
        }
    }
}

/// The signal condition a rule branches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    TrendRising,
    Accommodative,
    RisingAndAccommodative,
}

impl Driver {
    pub fn holds(self, trend: Trend, conditions: ConditionsState) -> bool {
        let rising = trend == Trend::Rising;
        let easy = conditions == ConditionsState::Accommodative;
        match self {
            Driver::TrendRising => rising,
            Driver::Accommodative => easy,
            Driver::RisingAndAccommodative => rising && easy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub label: ForecastLabel,
    pub qualifier: Option<&'static str>,
}

impl Outcome {
    pub const fn new(label: ForecastLabel, qualifier: Option<&'static str>) -> Self {
        Self { label, qualifier }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastRule {
    pub driver: Driver,
    pub when_true: Outcome,
    pub when_false: Outcome,
    /// Adds [`RiskAnnotation::ContractionRisk`] below the contraction
    /// threshold, on top of whichever outcome was chosen.
    pub contraction_sensitive: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastTable {
    rules: [ForecastRule; 4],
    pub contraction_threshold: f64,
}

impl ForecastTable {
    pub fn standard() -> Self {
        let equity = ForecastRule {
            driver: Driver::TrendRising,
            when_true: Outcome::new(ForecastLabel::Bullish, Some("trend following")),
            when_false: Outcome::new(ForecastLabel::Lateral, None),
            contraction_sensitive: true,
        };
        let risk_asset = ForecastRule {
            driver: Driver::RisingAndAccommodative,
            when_true: Outcome::new(ForecastLabel::BullishStrong, None),
            when_false: Outcome::new(ForecastLabel::Volatile, Some("range-bound")),
            contraction_sensitive: false,
        };
        let store_of_value = ForecastRule {
            driver: Driver::TrendRising,
            when_true: Outcome::new(ForecastLabel::Bullish, Some("store of value")),
            when_false: Outcome::new(ForecastLabel::Neutral, None),
            contraction_sensitive: false,
        };
        let reserve_currency = ForecastRule {
            driver: Driver::Accommodative,
            when_true: Outcome::new(ForecastLabel::BearishWeak, Some("weakening")),
            when_false: Outcome::new(ForecastLabel::Bullish, Some("strengthening")),
            contraction_sensitive: false,
        };

        Self {
            rules: [equity, risk_asset, store_of_value, reserve_currency],
            contraction_threshold: 50.0,
        }
    }

    pub fn with_contraction_threshold(mut self, threshold: f64) -> Self {
        self.contraction_threshold = threshold;
        self
    }

    pub fn with_rule(mut self, asset: AssetClass, rule: ForecastRule) -> Self {
        self.rules[asset.index()] = rule;
        self
    }

    pub fn rule(&self, asset: AssetClass) -> &ForecastRule {
        &self.rules[asset.index()]
    }

    pub fn evaluate(
        &self,
        trend: Trend,
        conditions: ConditionsState,
        manufacturing_index: f64,
    ) -> Forecasts {
        let contraction = manufacturing_index < self.contraction_threshold;
        let entries = AssetClass::ALL.map(|asset| {
            let rule = self.rule(asset);
            let outcome = if rule.driver.holds(trend, conditions) {
                rule.when_true
            } else {
                rule.when_false
            };
            AssetForecast {
                asset,
                label: outcome.label,
                qualifier: outcome.qualifier,
                risk: (rule.contraction_sensitive && contraction)
                    .then_some(RiskAnnotation::ContractionRisk),
            }
        });
        Forecasts { entries }
    }
}

impl Default for ForecastTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssetForecast {
    pub asset: AssetClass,
    pub label: ForecastLabel,
    pub qualifier: Option<&'static str>,
    pub risk: Option<RiskAnnotation>,
}

impl fmt::Display for AssetForecast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)?;
        if let Some(q) = self.qualifier {
            write!(f, " ({})", q)?;
        }
        if let Some(risk) = self.risk {
            write!(f, " [{}]", risk)?;
        }
        Ok(())
    }
}

/// One forecast for every [`AssetClass`], always complete.
#[derive(Debug, Clone, PartialEq)]
pub struct Forecasts {
    entries: [AssetForecast; 4],
}

impl Forecasts {
    pub fn get(&self, asset: AssetClass) -> &AssetForecast {
        &self.entries[asset.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &AssetForecast> {
        self.entries.iter()
    }
}

/// Forecast with the standard table.
pub fn forecast(trend: Trend, conditions: ConditionsState, manufacturing_index: f64) -> Forecasts {
    ForecastTable::standard().evaluate(trend, conditions, manufacturing_index)
}

pub fn forecast_signal(table: &ForecastTable, signal: &MacroSignal, manufacturing_index: f64) -> Forecasts {
    table.evaluate(signal.trend, signal.conditions_state, manufacturing_index)
}
