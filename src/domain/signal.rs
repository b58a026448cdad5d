//! Qualitative liquidity and financial-conditions classification.

use crate::domain::series::TimeSeries;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trend {
    Rising,
    Falling,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Rising => write!(f, "rising"),
            Trend::Falling => write!(f, "falling"),
        }
    }
}

/// Presentation label derived from [`Trend`]; carries no extra information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiquiditySignal {
    Reflationary,
    Disinflationary,
}

impl From<Trend> for LiquiditySignal {
    fn from(trend: Trend) -> Self {
        match trend {
            Trend::Rising => LiquiditySignal::Reflationary,
            Trend::Falling => LiquiditySignal::Disinflationary,
        }
    }
}

impl fmt::Display for LiquiditySignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiquiditySignal::Reflationary => write!(f, "reflationary"),
            LiquiditySignal::Disinflationary => write!(f, "disinflationary"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionsState {
    Accommodative,
    Restrictive,
}

impl fmt::Display for ConditionsState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionsState::Accommodative => write!(f, "accommodative"),
            ConditionsState::Restrictive => write!(f, "restrictive"),
        }
    }
}

/// How an unchanged liquidity reading is classified.
///
/// `Rising` is the canonical policy (`latest >= previous`). `Falling`
/// reproduces a strict `latest > previous` test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrendTieBreak {
    #[default]
    Rising,
    Falling,
}

impl FromStr for TrendTieBreak {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rising" => Ok(TrendTieBreak::Rising),
            "falling" => Ok(TrendTieBreak::Falling),
            other => Err(format!("unknown trend tie-break '{}', expected rising or falling", other)),
        }
    }
}

/// Thresholds for the classifier. The defaults are the canonical rules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalRules {
    pub tie_break: TrendTieBreak,
    /// Conditions strictly below this level are accommodative.
    pub conditions_threshold: f64,
}

impl Default for SignalRules {
    fn default() -> Self {
        Self {
            tie_break: TrendTieBreak::Rising,
            conditions_threshold: 0.0,
        }
    }
}

/// The numbers the classifier looks at for one evaluation cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacroSnapshot {
    pub latest_liquidity: f64,
    pub previous_liquidity: f64,
    pub latest_financial_conditions: f64,
    /// False when the snapshot came from synthetic fallback data.
    pub series_available: bool,
}

impl MacroSnapshot {
    /// Last two liquidity readings and the last conditions reading.
    ///
    /// Returns `None` when the liquidity series has fewer than two usable
    /// points or the conditions series has none.
    pub fn from_series(liquidity: &TimeSeries, conditions: &TimeSeries) -> Option<Self> {
        let (latest_liquidity, previous_liquidity) = liquidity.latest_pair()?;
        let latest_financial_conditions = conditions.latest()?.value;
        Some(Self {
            latest_liquidity,
            previous_liquidity,
            latest_financial_conditions,
            series_available: true,
        })
    }

    pub fn classify(&self, rules: &SignalRules) -> MacroSignal {
        classify_with(
            self.latest_liquidity,
            self.previous_liquidity,
            self.latest_financial_conditions,
            rules,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacroSignal {
    pub trend: Trend,
    pub liquidity_signal: LiquiditySignal,
    pub conditions_state: ConditionsState,
}

/// Classify with the canonical rules: ties count as rising, zero is
/// restrictive.
pub fn classify(latest_liquidity: f64, previous_liquidity: f64, latest_conditions: f64) -> MacroSignal {
    classify_with(
        latest_liquidity,
        previous_liquidity,
        latest_conditions,
        &SignalRules::default(),
    )
}

pub fn classify_with(
    latest_liquidity: f64,
    previous_liquidity: f64,
    latest_conditions: f64,
    rules: &SignalRules,
) -> MacroSignal {
    let rising = match rules.tie_break {
        TrendTieBreak::Rising => latest_liquidity >= previous_liquidity,
        TrendTieBreak::Falling => latest_liquidity > previous_liquidity,
    };
    let trend = if rising { Trend::Rising } else { Trend::Falling };

    let conditions_state = if latest_conditions < rules.conditions_threshold {
        ConditionsState::Accommodative
    } else {
        ConditionsState::Restrictive
    };

    MacroSignal {
        trend,
        liquidity_signal: trend.into(),
        conditions_state,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn tie_counts_as_rising() {
        let s = classify(100.0, 100.0, -0.1);
        assert_eq!(s.trend, Trend::Rising);
        assert_eq!(s.liquidity_signal, LiquiditySignal::Reflationary);
        assert_eq!(s.conditions_state, ConditionsState::Accommodative);
    }

    #[test]
    fn zero_conditions_is_restrictive() {
        let s = classify(100.0, 101.0, 0.0);
        assert_eq!(s.trend, Trend::Falling);
        assert_eq!(s.liquidity_signal, LiquiditySignal::Disinflationary);
        assert_eq!(s.conditions_state, ConditionsState::Restrictive);
    }

    #[test]
    fn strict_tie_break_classifies_tie_as_falling() {
        let rules = SignalRules {
            tie_break: TrendTieBreak::Falling,
            ..SignalRules::default()
        };
        assert_eq!(classify_with(100.0, 100.0, -1.0, &rules).trend, Trend::Falling);
        assert_eq!(classify_with(100.5, 100.0, -1.0, &rules).trend, Trend::Rising);
    }

    #[test]
    fn extremes_classify_without_panicking() {
        let s = classify(f64::MAX, f64::MIN, f64::NEG_INFINITY);
        assert_eq!(s.trend, Trend::Rising);
        assert_eq!(s.conditions_state, ConditionsState::Accommodative);

        let s = classify(f64::NEG_INFINITY, 0.0, f64::INFINITY);
        assert_eq!(s.trend, Trend::Falling);
        assert_eq!(s.conditions_state, ConditionsState::Restrictive);
    }

    #[test]
    fn nan_inputs_fall_to_the_negative_branch() {
        let s = classify(f64::NAN, 1.0, f64::NAN);
        assert_eq!(s.trend, Trend::Falling);
        assert_eq!(s.conditions_state, ConditionsState::Restrictive);
    }

    #[test]
    fn tie_break_parses_from_config_text() {
        assert_eq!("Rising".parse::<TrendTieBreak>(), Ok(TrendTieBreak::Rising));
        assert_eq!(" falling ".parse::<TrendTieBreak>(), Ok(TrendTieBreak::Falling));
        assert!("sideways".parse::<TrendTieBreak>().is_err());
    }

    #[test]
    fn snapshot_from_series_takes_latest_values() {
        let d = |m| NaiveDate::from_ymd_opt(2024, m, 1).unwrap();
        let liquidity = TimeSeries::from_pairs(vec![(d(3), 21_000.0), (d(1), 20_500.0), (d(2), 20_800.0)]);
        let conditions = TimeSeries::from_pairs(vec![(d(1), -0.4), (d(2), -0.45)]);

        let snap = MacroSnapshot::from_series(&liquidity, &conditions).unwrap();
        assert_eq!(snap.latest_liquidity, 21_000.0);
        assert_eq!(snap.previous_liquidity, 20_800.0);
        assert_eq!(snap.latest_financial_conditions, -0.45);
        assert!(snap.series_available);

        let signal = snap.classify(&SignalRules::default());
        assert_eq!(signal.trend, Trend::Rising);
        assert_eq!(signal.conditions_state, ConditionsState::Accommodative);
    }

    #[test]
    fn snapshot_needs_two_liquidity_points() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let one = TimeSeries::from_pairs(vec![(d, 1.0)]);
        assert!(MacroSnapshot::from_series(&one, &one).is_none());
        assert!(MacroSnapshot::from_series(&TimeSeries::empty(), &one).is_none());
    }

    #[test]
    fn labels_render_lowercase() {
        assert_eq!(Trend::Rising.to_string(), "rising");
        assert_eq!(LiquiditySignal::Disinflationary.to_string(), "disinflationary");
        assert_eq!(ConditionsState::Accommodative.to_string(), "accommodative");
    }
}
