//! Configuration validation.
//!
//! Checks every configured value before a dashboard run. The manufacturing
//! index is only required to be a number; it is never range-checked.

use crate::domain::error::MacroError;
use crate::domain::forecast::AssetClass;
use crate::domain::signal::TrendTieBreak;
use crate::ports::config_port::ConfigPort;

/// Upper bound for any `lookback_days` key, roughly a century.
pub const MAX_LOOKBACK_DAYS: i64 = 36_500;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), MacroError> {
    validate_fred(config)?;
    validate_lookback(config, "prices")?;
    validate_assets(config)?;
    validate_signal(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> MacroError {
    MacroError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn validate_fred(config: &dyn ConfigPort) -> Result<(), MacroError> {
    validate_lookback(config, "fred")?;
    validate_positive_int(config, "fred", "timeout_secs")?;

    if let Some(url) = config.get_string("fred", "base_url") {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(invalid("fred", "base_url", "base_url must be an http(s) URL"));
        }
    }

    for key in ["liquidity_series", "conditions_series"] {
        if let Some(id) = config.get_string("fred", key) {
            if id.chars().any(char::is_whitespace) {
                return Err(invalid("fred", key, "series id must not contain whitespace"));
            }
        }
    }
    Ok(())
}

fn validate_positive_int(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), MacroError> {
    let Some(raw) = config.get_string(section, key) else {
        return Ok(());
    };
    match raw.parse::<i64>() {
        Ok(v) if v > 0 => Ok(()),
        Ok(_) => Err(invalid(section, key, format!("{} must be positive", key))),
        Err(_) => Err(invalid(section, key, format!("{} must be an integer", key))),
    }
}

fn validate_lookback(config: &dyn ConfigPort, section: &str) -> Result<(), MacroError> {
    validate_positive_int(config, section, "lookback_days")?;
    let days = config.get_int(section, "lookback_days", 0);
    if days > MAX_LOOKBACK_DAYS {
        return Err(invalid(
            section,
            "lookback_days",
            format!("lookback_days must not exceed {}", MAX_LOOKBACK_DAYS),
        ));
    }
    Ok(())
}

fn validate_number(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), MacroError> {
    let Some(raw) = config.get_string(section, key) else {
        return Ok(());
    };
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(()),
        _ => Err(invalid(section, key, format!("{} must be a finite number", key))),
    }
}

fn validate_assets(config: &dyn ConfigPort) -> Result<(), MacroError> {
    for asset in AssetClass::ALL {
        if let Some(symbol) = config.get_string("assets", asset.config_key()) {
            if symbol.chars().any(|c| c.is_whitespace() || c == '/' || c == '\\') {
                return Err(invalid(
                    "assets",
                    asset.config_key(),
                    "symbol must not contain whitespace or path separators",
                ));
            }
        }
    }
    Ok(())
}

fn validate_signal(config: &dyn ConfigPort) -> Result<(), MacroError> {
    validate_number(config, "signal", "manufacturing_index")?;
    validate_number(config, "signal", "contraction_threshold")?;
    validate_number(config, "signal", "conditions_threshold")?;

    if let Some(tie) = config.get_string("signal", "trend_tie") {
        tie.parse::<TrendTieBreak>()
            .map_err(|reason| invalid("signal", "trend_tie", reason))?;
    }
    Ok(())
}
