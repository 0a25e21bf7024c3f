use std::collections::HashMap;
use std::env;
use std::str::FromStr;

use thiserror::Error;

/// Runtime configuration, loaded from environment variables at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Listener address, e.g. `0.0.0.0:8080`.
    pub bind_address: String,
    /// Simulated work duration of the home endpoint, in milliseconds.
    pub home_delay_ms: u64,
    /// Whole-request timeout applied by the timeout layer.
    pub request_timeout_secs: u64,
    /// When false the trace provider is disabled and every request logs
    /// the sentinel trace id.
    pub tracing_enabled: bool,
    /// Bounded queue size between request tasks and the span worker.
    pub span_queue_capacity: usize,
    /// Span batch size before an eager flush.
    pub span_batch_size: usize,
    /// Flush interval for partial span batches, in milliseconds.
    pub span_flush_interval_ms: u64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidVar { name: &'static str, value: String },
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| "0.0.0.0:8080".to_string());

        Ok(Config {
            bind_address,
            home_delay_ms: parse_var(vars, "HOME_DELAY_MS", 200)?,
            request_timeout_secs: parse_var(vars, "REQUEST_TIMEOUT_SECS", 30)?,
            tracing_enabled: parse_var(vars, "TRACING_ENABLED", true)?,
            span_queue_capacity: parse_var(vars, "SPAN_QUEUE_CAPACITY", 2048)?,
            span_batch_size: parse_var(vars, "SPAN_BATCH_SIZE", 64)?,
            span_flush_interval_ms: parse_var(vars, "SPAN_FLUSH_INTERVAL_MS", 5000)?,
        })
    }
}

fn parse_var<T: FromStr>(
    vars: &HashMap<String, String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match vars.get(name) {
        Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidVar {
            name,
            value: raw.clone(),
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vars_defaults() {
        let config = Config::from_vars(&HashMap::new()).expect("defaults should load");

        assert_eq!(config.bind_address, "0.0.0.0:8080");
        assert_eq!(config.home_delay_ms, 200);
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.tracing_enabled);
        assert_eq!(config.span_queue_capacity, 2048);
        assert_eq!(config.span_batch_size, 64);
        assert_eq!(config.span_flush_interval_ms, 5000);
    }

    #[test]
    fn test_from_vars_overrides() {
        let vars = HashMap::from([
            ("BIND_ADDRESS".to_string(), "127.0.0.1:9000".to_string()),
            ("HOME_DELAY_MS".to_string(), "50".to_string()),
            ("REQUEST_TIMEOUT_SECS".to_string(), "5".to_string()),
            ("TRACING_ENABLED".to_string(), "false".to_string()),
            ("SPAN_QUEUE_CAPACITY".to_string(), "16".to_string()),
            ("SPAN_BATCH_SIZE".to_string(), "4".to_string()),
            ("SPAN_FLUSH_INTERVAL_MS".to_string(), "100".to_string()),
        ]);

        let config = Config::from_vars(&vars).expect("overrides should load");

        assert_eq!(config.bind_address, "127.0.0.1:9000");
        assert_eq!(config.home_delay_ms, 50);
        assert_eq!(config.request_timeout_secs, 5);
        assert!(!config.tracing_enabled);
        assert_eq!(config.span_queue_capacity, 16);
        assert_eq!(config.span_batch_size, 4);
        assert_eq!(config.span_flush_interval_ms, 100);
    }

    #[test]
    fn test_from_vars_invalid_delay() {
        let vars = HashMap::from([("HOME_DELAY_MS".to_string(), "soon".to_string())]);

        let result = Config::from_vars(&vars);
        assert!(
            matches!(result, Err(ConfigError::InvalidVar { name, value }) if name == "HOME_DELAY_MS" && value == "soon")
        );
    }

    #[test]
    fn test_from_vars_invalid_bool() {
        let vars = HashMap::from([("TRACING_ENABLED".to_string(), "yes".to_string())]);

        let result = Config::from_vars(&vars);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidVar { name, .. }) if name == "TRACING_ENABLED"
        ));
    }

    #[test]
    fn test_from_vars_negative_number_rejected() {
        let vars = HashMap::from([("SPAN_BATCH_SIZE".to_string(), "-1".to_string())]);

        let result = Config::from_vars(&vars);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidVar { name, .. }) if name == "SPAN_BATCH_SIZE"
        ));
    }
}
