//! Checkout configuration loaded from environment variables.

use domain::DEFAULT_LOW_STOCK_THRESHOLD;

/// Checkout configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `CHECKOUT_LOW_STOCK_THRESHOLD`: units at or below which a SKU is
///   reported as low on stock (default: `10`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `CHECKOUT_LOG_JSON`: emit JSON log lines when `true`/`1` (default: `false`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutConfig {
    pub low_stock_threshold: u32,
    pub log_level: String,
    pub log_json: bool,
}

impl CheckoutConfig {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`, falling back to defaults for
    /// missing or unparsable values.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            low_stock_threshold: lookup("CHECKOUT_LOW_STOCK_THRESHOLD")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.low_stock_threshold),
            log_level: lookup("RUST_LOG")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.log_level),
            log_json: lookup("CHECKOUT_LOG_JSON")
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.log_json),
        }
    }
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_values() {
        let config = CheckoutConfig::default();
        assert_eq!(config.low_stock_threshold, 10);
        assert_eq!(config.log_level, "info");
        assert!(!config.log_json);
    }

    #[test]
    fn test_missing_variables_use_defaults() {
        let config = CheckoutConfig::from_lookup(|_| None);
        assert_eq!(config, CheckoutConfig::default());
    }

    #[test]
    fn test_reads_overrides() {
        let config = CheckoutConfig::from_lookup(lookup_from(&[
            ("CHECKOUT_LOW_STOCK_THRESHOLD", "3"),
            ("RUST_LOG", "checkout=debug"),
            ("CHECKOUT_LOG_JSON", "TRUE"),
        ]));
        assert_eq!(config.low_stock_threshold, 3);
        assert_eq!(config.log_level, "checkout=debug");
        assert!(config.log_json);
    }

    #[test]
    fn test_unparsable_threshold_falls_back() {
        let config = CheckoutConfig::from_lookup(lookup_from(&[
            ("CHECKOUT_LOW_STOCK_THRESHOLD", "lots"),
            ("CHECKOUT_LOG_JSON", "nope"),
        ]));
        assert_eq!(config.low_stock_threshold, 10);
        assert!(!config.log_json);
    }
}
