/// Configuration utilities - loading, validation, and access helpers
use super::schemas::Config;
use crate::errors::{AprError, AprResult};
use crate::logger::{self, LogTag};
use std::path::Path;

/// Default configuration file path
pub const CONFIG_FILE_PATH: &str = "data/config.toml";

/// Environment variable that overrides `subgraph.api_key`
pub const API_KEY_ENV: &str = "SUBGRAPH_API_KEY";

/// Load configuration from a specific file path
///
/// A missing file is not an error: defaults are used and a warning is logged.
/// `SUBGRAPH_API_KEY` overrides the file's key, then the result is validated
/// and returned so callers can pass sections into the estimators explicitly.
pub fn load_config_from_path(path: &str) -> AprResult<Config> {
    let mut config = read_config_file(path)?;

    if let Ok(key) = std::env::var(API_KEY_ENV) {
        if !key.trim().is_empty() {
            config.subgraph.api_key = key.trim().to_string();
        }
    }

    config.validate()?;
    Ok(config)
}

/// Parse a config file without environment overrides or validation
pub fn read_config_file(path: &str) -> AprResult<Config> {
    if !Path::new(path).exists() {
        logger::warning(
            LogTag::Config,
            &format!("Config file '{}' not found, using default values", path),
        );
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(path)
        .map_err(|e| AprError::Config(format!("Failed to read config file '{}': {}", path, e)))?;

    let config = parse_config(&contents)?;
    logger::debug(LogTag::Config, &format!("Loaded configuration from {}", path));
    Ok(config)
}

pub fn parse_config(contents: &str) -> AprResult<Config> {
    Ok(toml::from_str::<Config>(contents)?)
}

/// Write a configuration file (used by `--init-config`)
pub fn save_config(config: &Config, path: &str) -> AprResult<()> {
    let config_str = toml::to_string_pretty(config)
        .map_err(|e| AprError::Config(format!("Failed to serialize config: {}", e)))?;

    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    std::fs::write(path, config_str)
        .map_err(|e| AprError::Config(format!("Failed to write config file '{}': {}", path, e)))?;

    Ok(())
}

impl Config {
    /// Reject values the estimators cannot work with
    pub fn validate(&self) -> AprResult<()> {
        let subgraph = &self.subgraph;
        if subgraph.timeout_secs == 0 {
            return Err(AprError::invalid_configuration(
                "subgraph.timeout_secs",
                "must be greater than zero",
            ));
        }
        if subgraph.max_concurrent_requests == 0 {
            return Err(AprError::invalid_configuration(
                "subgraph.max_concurrent_requests",
                "must be at least one",
            ));
        }
        if subgraph.gateway_url.trim().is_empty() || subgraph.subgraph_id.trim().is_empty() {
            return Err(AprError::invalid_configuration(
                "subgraph",
                "gateway_url and subgraph_id must be set",
            ));
        }

        let estimator = &self.estimator;
        if !(estimator.days_per_year.is_finite() && estimator.days_per_year > 0.0) {
            return Err(AprError::invalid_configuration(
                "estimator.days_per_year",
                "must be a positive number",
            ));
        }
        if estimator.history_days == 0 {
            return Err(AprError::invalid_configuration(
                "estimator.history_days",
                "must be at least one day",
            ));
        }
        if !(estimator.fallback_fee_period_days.is_finite()
            && estimator.fallback_fee_period_days > 0.0)
        {
            return Err(AprError::invalid_configuration(
                "estimator.fallback_fee_period_days",
                "must be a positive number",
            ));
        }
        if estimator.default_tick_spacing <= 0 {
            return Err(AprError::invalid_configuration(
                "estimator.default_tick_spacing",
                "must be a positive integer",
            ));
        }
        estimator.emissions_estimator()?;

        let position = &self.position;
        if !(position.lower_price_usd > 0.0 && position.upper_price_usd > 0.0) {
            return Err(AprError::invalid_configuration(
                "position",
                "default price bounds must be positive",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apr::emissions::EmissionsPolicy;
    use crate::apr::ticks::TickModel;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.estimator.days_per_year, 365.0);
        assert_eq!(config.estimator.default_tick_spacing, 60);
        assert_eq!(config.estimator.references.len(), 2);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = parse_config(
            r#"
            [estimator]
            emissions_policy = "proportional"
            tick_model = "exact"
            history_days = 14

            [subgraph]
            api_key = "abc"
            "#,
        )
        .unwrap();

        assert_eq!(config.estimator.emissions_policy, EmissionsPolicy::Proportional);
        assert_eq!(config.estimator.tick_model, TickModel::Exact);
        assert_eq!(config.estimator.history_days, 14);
        assert_eq!(config.estimator.days_per_year, 365.0);
        assert_eq!(config.subgraph.api_key, "abc");
        assert_eq!(config.subgraph.timeout_secs, 15);
    }

    #[test]
    fn test_reference_table_from_toml() {
        let config = parse_config(
            r#"
            [[estimator.references]]
            width_usd = 100.0
            apr = 400.0

            [[estimator.references]]
            width_usd = 400.0
            apr = 100.0
            "#,
        )
        .unwrap();

        assert_eq!(config.estimator.references.len(), 2);
        assert_eq!(config.estimator.references[1].width_usd, 400.0);
        assert!(config.estimator.references[0].lower_price.is_none());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.estimator.default_tick_spacing = 0;
        assert!(matches!(
            config.validate(),
            Err(AprError::InvalidConfiguration { .. })
        ));

        let mut config = Config::default();
        config.estimator.references.clear();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.subgraph.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.subgraph.max_concurrent_requests = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_field_type_is_a_config_error() {
        let result = parse_config("[estimator]\nhistory_days = \"seven\"\n");
        assert!(matches!(result, Err(AprError::Config(_))));
    }

    #[test]
    fn test_default_config_round_trips_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(parse_config(&text).unwrap(), config);
    }

    #[test]
    fn test_loading_twice_returns_fresh_configs() {
        let path = "data/does-not-exist/config.toml";
        let first = load_config_from_path(path).unwrap();
        let second = load_config_from_path(path).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.estimator, Config::default().estimator);
    }

    #[test]
    fn test_endpoint_url() {
        let mut config = Config::default();
        config.subgraph.api_key = "KEY".to_string();
        config.subgraph.gateway_url = "https://gateway.example/api/".to_string();
        config.subgraph.subgraph_id = "SUB".to_string();
        assert_eq!(
            config.subgraph.endpoint_url(),
            "https://gateway.example/api/KEY/subgraphs/id/SUB"
        );
    }
}
