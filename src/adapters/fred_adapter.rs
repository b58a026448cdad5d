//! FRED (Federal Reserve Economic Data) HTTP adapter.

use crate::domain::error::FetchError;
use crate::domain::series::{Observation, TimeSeries};
use crate::ports::series_port::SeriesPort;
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.stlouisfed.org/fred";
const PROVIDER: &str = "FRED";

/// Settings handed to the adapter at construction time.
#[derive(Debug, Clone, PartialEq)]
pub struct FredConfig {
    /// `None` when no key was configured. Blank keys are normalised to `None`.
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl FredConfig {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<RawObservation>,
}

#[derive(Debug, Deserialize)]
struct RawObservation {
    date: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error_message: Option<String>,
}

/// Decode an observations payload. FRED marks missing values with `"."`.
pub fn parse_observations(indicator: &str, body: &str) -> Result<TimeSeries, FetchError> {
    let parsed: ObservationsResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Parse {
            indicator: indicator.to_string(),
            reason: e.to_string(),
        })?;

    let mut observations = Vec::with_capacity(parsed.observations.len());
    for raw in parsed.observations {
        if raw.value.trim() == "." {
            continue;
        }
        let date = NaiveDate::parse_from_str(&raw.date, "%Y-%m-%d").map_err(|e| {
            FetchError::Parse {
                indicator: indicator.to_string(),
                reason: format!("invalid date '{}': {}", raw.date, e),
            }
        })?;
        let value: f64 = raw.value.trim().parse().map_err(|e| FetchError::Parse {
            indicator: indicator.to_string(),
            reason: format!("invalid value '{}': {}", raw.value, e),
        })?;
        observations.push(Observation::new(date, value));
    }

    if observations.is_empty() {
        return Err(FetchError::Empty {
            indicator: indicator.to_string(),
        });
    }
    Ok(TimeSeries::new(observations))
}

/// Map a non-success response to a typed failure. FRED answers a bad key
/// with HTTP 400 and an `error_message` naming `api_key`.
pub fn classify_failure(indicator: &str, status: u16, body: &str) -> FetchError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|e| e.error_message)
        .unwrap_or_default();

    match status {
        401 | 403 => FetchError::CredentialInvalid {
            provider: PROVIDER.to_string(),
            reason: if message.is_empty() {
                format!("HTTP {}", status)
            } else {
                message
            },
        },
        400 if message.contains("api_key") => FetchError::CredentialInvalid {
            provider: PROVIDER.to_string(),
            reason: message,
        },
        _ => FetchError::Status {
            indicator: indicator.to_string(),
            status,
        },
    }
}

pub struct FredAdapter {
    client: reqwest::blocking::Client,
    config: FredConfig,
}

impl FredAdapter {
    pub fn new(config: FredConfig) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("macrolens/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Http {
                indicator: PROVIDER.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self { client, config })
    }

    fn observations_url(&self) -> String {
        format!(
            "{}/series/observations",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

impl SeriesPort for FredAdapter {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn fetch_series(
        &self,
        indicator_id: &str,
        start_date: NaiveDate,
    ) -> Result<TimeSeries, FetchError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| FetchError::CredentialMissing {
                provider: PROVIDER.to_string(),
            })?;

        let start = start_date.format("%Y-%m-%d").to_string();
        debug!(indicator_id, %start, "requesting FRED observations");

        let response = self
            .client
            .get(self.observations_url())
            .query(&[
                ("series_id", indicator_id),
                ("api_key", api_key),
                ("file_type", "json"),
                ("observation_start", start.as_str()),
            ])
            .send()
            .map_err(|e| FetchError::Http {
                indicator: indicator_id.to_string(),
                reason: e.without_url().to_string(),
            })?;

        let status = response.status();
        let body = response.text().map_err(|e| FetchError::Http {
            indicator: indicator_id.to_string(),
            reason: e.to_string(),
        })?;

        if !status.is_success() {
            return Err(classify_failure(indicator_id, status.as_u16(), &body));
        }

        parse_observations(indicator_id, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "realtime_start": "2024-06-01",
        "count": 3,
        "observations": [
            {"realtime_start": "2024-06-01", "realtime_end": "2024-06-01", "date": "2024-01-01", "value": "20866.1"},
            {"realtime_start": "2024-06-01", "realtime_end": "2024-06-01", "date": "2024-02-01", "value": "."},
            {"realtime_start": "2024-06-01", "realtime_end": "2024-06-01", "date": "2024-03-01", "value": "20901.4"}
        ]
    }"#;

    #[test]
    fn parses_observations_and_skips_missing() {
        let series = parse_observations("M2SL", BODY).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(
            series.observations()[1].date,
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
        assert_eq!(series.observations()[1].value, 20901.4);
    }

    #[test]
    fn empty_observation_list_is_empty_error() {
        let err = parse_observations("NFCI", r#"{"observations": []}"#).unwrap_err();
        assert_eq!(
            err,
            FetchError::Empty {
                indicator: "NFCI".into()
            }
        );
    }

    #[test]
    fn malformed_body_is_parse_error() {
        let err = parse_observations("NFCI", "<html>").unwrap_err();
        assert!(matches!(err, FetchError::Parse { .. }));
    }

    #[test]
    fn bad_key_is_credential_invalid() {
        let body = r#"{"error_code":400,"error_message":"Bad Request.  The value for variable api_key is not registered."}"#;
        let err = classify_failure("M2SL", 400, body);
        assert!(matches!(err, FetchError::CredentialInvalid { .. }));
    }

    #[test]
    fn other_400_is_status_error() {
        let body = r#"{"error_code":400,"error_message":"Bad Request.  The series does not exist."}"#;
        let err = classify_failure("NOPE", 400, body);
        assert_eq!(
            err,
            FetchError::Status {
                indicator: "NOPE".into(),
                status: 400
            }
        );
    }

    #[test]
    fn forbidden_is_credential_invalid() {
        let err = classify_failure("M2SL", 403, "");
        assert!(matches!(err, FetchError::CredentialInvalid { reason, .. } if reason == "HTTP 403"));
    }

    #[test]
    fn missing_key_fails_before_any_request() {
        let adapter = FredAdapter::new(FredConfig::new(None)).unwrap();
        let err = adapter
            .fetch_series("M2SL", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
            .unwrap_err();
        assert_eq!(
            err,
            FetchError::CredentialMissing {
                provider: "FRED".into()
            }
        );
    }

    #[test]
    fn blank_key_counts_as_missing() {
        assert_eq!(FredConfig::new(Some("   ".into())).api_key, None);
        assert_eq!(
            FredConfig::new(Some("abc".into())).api_key,
            Some("abc".to_string())
        );
    }
}
