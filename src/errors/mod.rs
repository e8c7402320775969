/// Structured error handling for the APR estimator
///
/// Pure numeric stages fail fast with `InvalidInput` / `InvalidConfiguration`.
/// Missing upstream data surfaces as `DataUnavailable`. Everything network-shaped
/// is a `Transport` error owned by the data source; the core never retries.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AprError {
    #[error("Invalid input '{field}': {reason}")] InvalidInput {
        field: String,
        reason: String,
    },

    #[error("Invalid configuration '{field}': {reason}")] InvalidConfiguration {
        field: String,
        reason: String,
    },

    #[error("Data unavailable for {resource}: {reason}")] DataUnavailable {
        resource: String,
        reason: String,
    },

    #[error("Transport error from {endpoint}: {message}")] Transport {
        endpoint: String,
        message: String,
    },

    #[error("Failed to parse {data_type}: {error}")] Parse {
        data_type: String,
        error: String,
    },

    #[error("Config file error: {0}")] Config(String),
}

impl AprError {
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AprError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_configuration(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AprError::InvalidConfiguration {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn data_unavailable(resource: impl Into<String>, reason: impl Into<String>) -> Self {
        AprError::DataUnavailable {
            resource: resource.into(),
            reason: reason.into(),
        }
    }

    pub fn transport(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        AprError::Transport {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    pub fn parse(data_type: impl Into<String>, error: impl Into<String>) -> Self {
        AprError::Parse {
            data_type: data_type.into(),
            error: error.into(),
        }
    }

    /// Worth retrying by the caller (the estimator itself never retries)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AprError::Transport { .. })
    }

    /// The pool or its data could not be obtained at all
    pub fn is_unavailable(&self) -> bool {
        matches!(self, AprError::DataUnavailable { .. } | AprError::Transport { .. })
    }
}

// =============================================================================
// CONVERSIONS
// =============================================================================

impl From<reqwest::Error> for AprError {
    fn from(err: reqwest::Error) -> Self {
        let endpoint = err
            .url()
            .map(|u| u.host_str().unwrap_or("unknown").to_string())
            .unwrap_or_else(|| "unknown".to_string());
        AprError::Transport {
            endpoint,
            message: format!("HTTP request failed: {}", err),
        }
    }
}

impl From<serde_json::Error> for AprError {
    fn from(err: serde_json::Error) -> Self {
        AprError::parse("JSON", err.to_string())
    }
}

impl From<toml::de::Error> for AprError {
    fn from(err: toml::de::Error) -> Self {
        AprError::Config(format!("TOML parse error: {}", err))
    }
}

impl From<std::io::Error> for AprError {
    fn from(err: std::io::Error) -> Self {
        AprError::Config(format!("IO error: {}", err))
    }
}

pub type AprResult<T> = Result<T, AprError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_field_and_reason() {
        let err = AprError::invalid_input("lower_price_usd", "must be positive");
        assert_eq!(err.to_string(), "Invalid input 'lower_price_usd': must be positive");
    }

    #[test]
    fn test_classification() {
        assert!(AprError::transport("gateway", "timeout").is_recoverable());
        assert!(!AprError::invalid_configuration("tick_spacing", "zero").is_recoverable());
        assert!(AprError::data_unavailable("pool 0xabc", "not found").is_unavailable());
        assert!(!AprError::parse("JSON", "eof").is_unavailable());
    }
}
