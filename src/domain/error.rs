//! Domain error types.

/// Failure reported by a series provider.
///
/// Never reaches the aligner or the classifier: ingest converts every
/// variant into a synthetic substitute plus a warning.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    #[error("no API credential configured for {provider}")]
    CredentialMissing { provider: String },

    #[error("{provider} rejected the API credential: {reason}")]
    CredentialInvalid { provider: String, reason: String },

    #[error("request for {indicator} failed: {reason}")]
    Http { indicator: String, reason: String },

    #[error("{indicator} returned HTTP {status}")]
    Status { indicator: String, status: u16 },

    #[error("could not parse {indicator}: {reason}")]
    Parse { indicator: String, reason: String },

    #[error("{indicator} returned no observations")]
    Empty { indicator: String },

    #[error("failed to read {indicator}: {reason}")]
    Io { indicator: String, reason: String },
}

impl FetchError {
    /// True when the failure is about the credential rather than the data.
    pub fn is_credential(&self) -> bool {
        matches!(
            self,
            FetchError::CredentialMissing { .. } | FetchError::CredentialInvalid { .. }
        )
    }
}

/// Top-level error type for macrolens.
#[derive(Debug, thiserror::Error)]
pub enum MacroError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("report rendering failed: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&MacroError> for std::process::ExitCode {
    fn from(err: &MacroError) -> Self {
        let code: u8 = match err {
            MacroError::Io(_) => 1,
            MacroError::ConfigParse { .. }
            | MacroError::ConfigMissing { .. }
            | MacroError::ConfigInvalid { .. } => 2,
            MacroError::Fetch(_) => 3,
            MacroError::Report { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_states_are_distinct() {
        let missing = FetchError::CredentialMissing {
            provider: "FRED".into(),
        };
        let invalid = FetchError::CredentialInvalid {
            provider: "FRED".into(),
            reason: "api_key not registered".into(),
        };
        assert_ne!(missing, invalid);
        assert!(missing.is_credential());
        assert!(invalid.is_credential());
        assert!(missing.to_string().contains("no API credential"));
        assert!(invalid.to_string().contains("rejected"));
    }

    #[test]
    fn data_failures_are_not_credential_failures() {
        let err = FetchError::Empty {
            indicator: "M2SL".into(),
        };
        assert!(!err.is_credential());
        assert_eq!(err.to_string(), "M2SL returned no observations");
    }

    #[test]
    fn fetch_error_converts_into_macro_error() {
        let err: MacroError = FetchError::Status {
            indicator: "NFCI".into(),
            status: 500,
        }
        .into();
        assert_eq!(err.to_string(), "NFCI returned HTTP 500");
    }
}
