//! Engine configuration loading from config.toml
//!
//! The tuning knobs here bound the engine's resource use and parameterize the
//! derivations it performs at violation-creation time. Values come from a
//! TOML configuration file when one is present; every knob has a default that
//! matches the deployed system, so a missing file is not an error for
//! library consumers.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the `[engine]` table of config.toml
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound on records fetched from the store per aggregation call.
    ///
    /// Aggregating over an unbounded candidate set is explicitly bounded by
    /// this cap: exceeding it truncates the candidate set rather than
    /// failing, so very large datasets produce an approximate (and logged)
    /// result instead of an error.
    pub max_fetch_records: usize,
    /// Days a violator has to settle, counted from the capture instant
    /// (creation instant when no capture time was reported). Used to derive
    /// `due_date` at creation.
    pub compliance_window_days: i64,
    /// Minimum violation count for a violator to be considered a repeat
    /// offender, both for the issuance-time snapshot and as the default for
    /// the on-demand report.
    pub repeat_offender_min_count: usize,
    /// Page size applied when a list request does not specify one.
    pub default_page_size: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_fetch_records: 5000,
            compliance_window_days: 15,
            repeat_offender_min_count: 3,
            default_page_size: 10,
        }
    }
}

/// Top-level config.toml structure
#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    engine: EngineConfig,
}

/// Loads engine configuration from a TOML file
///
/// # Arguments
/// * `path` - Path to the config.toml file
///
/// # Returns
/// * `Ok(EngineConfig)` - Successfully parsed configuration
/// * `Err(Error)` - Failed to read or parse the configuration file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<EngineConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    let file: ConfigFile = toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;

    Ok(file.engine)
}

/// Loads engine configuration from the default location (./config.toml),
/// falling back to the built-in defaults when the file does not exist.
pub fn load_default_config() -> Result<EngineConfig> {
    if Path::new("config.toml").exists() {
        load_config("config.toml")
    } else {
        Ok(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_engine_config() {
        let toml_str = r"
            [engine]
            max_fetch_records = 2000
            compliance_window_days = 30
            repeat_offender_min_count = 2
            default_page_size = 25
        ";

        let file: ConfigFile = toml::from_str(toml_str).unwrap();
        assert_eq!(file.engine.max_fetch_records, 2000);
        assert_eq!(file.engine.compliance_window_days, 30);
        assert_eq!(file.engine.repeat_offender_min_count, 2);
        assert_eq!(file.engine.default_page_size, 25);
    }

    #[test]
    fn test_partial_config_falls_back_to_defaults() {
        let toml_str = r"
            [engine]
            max_fetch_records = 100
        ";

        let file: ConfigFile = toml::from_str(toml_str).unwrap();
        assert_eq!(file.engine.max_fetch_records, 100);
        assert_eq!(file.engine.compliance_window_days, 15);
        assert_eq!(file.engine.repeat_offender_min_count, 3);
        assert_eq!(file.engine.default_page_size, 10);
    }

    #[test]
    fn test_empty_config_is_all_defaults() {
        let file: ConfigFile = toml::from_str("").unwrap();
        let defaults = EngineConfig::default();
        assert_eq!(file.engine.max_fetch_records, defaults.max_fetch_records);
        assert_eq!(file.engine.default_page_size, defaults.default_page_size);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let result = toml::from_str::<ConfigFile>("[engine\nmax_fetch_records = ");
        assert!(result.is_err());
    }
}
