//! Configuration file handling
//!
//! Handles TOML configuration parsing and validation. Every section is
//! optional; missing values fall back to built-in defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{
    DEFAULT_BASE_URL, DEFAULT_COUNTER_THRESHOLD, DEFAULT_PAGE_SIZE, DEFAULT_TIMEOUT_SECS,
    ENV_SERVICE_KEY, MAX_PAGE_SIZE, MAX_TIMEOUT_SECS, MIN_TIMEOUT_SECS,
};
use crate::endpoints::{builtin_families, merge_families, EndpointFamily};
use crate::models::{ConfigError, Direction, Terminal};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiSettings,
    pub credential: CredentialSettings,
    pub query: QuerySettings,
    pub counter_codes: CounterCodeSettings,
    /// Extra endpoint families; a name matching a built-in replaces it
    pub families: Vec<EndpointFamily>,
}

/// Provider connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
    /// Per-request timeout in seconds (1-10)
    pub timeout_secs: u64,
    /// Rows requested per call (1-300)
    pub page_size: u32,
    /// Fan out independent calls
    pub parallel: bool,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            page_size: DEFAULT_PAGE_SIZE,
            parallel: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialSettings {
    pub service_key: Option<String>,
    /// Send the key exactly as written instead of decode-then-encode
    pub verbatim: bool,
}

/// Default query selection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuerySettings {
    /// Terminal labels; empty means all
    pub terminals: Vec<String>,
    /// Gate/counter filter inputs, each comma-separated
    pub gates: Vec<String>,
    /// "departure", "arrival" or "both"
    pub direction: Option<String>,
    /// Fixed endpoint family; unset means discovery
    pub family: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterCodeSettings {
    pub enabled: bool,
    pub threshold: u32,
}

impl Default for CounterCodeSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            threshold: DEFAULT_COUNTER_THRESHOLD,
        }
    }
}

impl AppConfig {
    /// Load and validate a configuration file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `explicit` if given, else the default file if it exists, else defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// `<config dir>/gatewatch/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("gatewatch").join("config.toml"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_timeout(self.api.timeout_secs)?;
        validate_page_size(self.api.page_size)?;
        for label in &self.query.terminals {
            label.parse::<Terminal>()?;
        }
        if let Some(direction) = &self.query.direction {
            parse_directions(direction)?;
        }
        for family in &self.families {
            family.validate()?;
        }
        Ok(())
    }

    /// Built-in families with configured ones merged in
    pub fn families(&self) -> Vec<EndpointFamily> {
        merge_families(builtin_families(), &self.families)
    }

    /// Credential from the file, falling back to the environment
    pub fn service_key(&self) -> Option<String> {
        self.credential
            .service_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(ENV_SERVICE_KEY).ok().filter(|k| !k.trim().is_empty()))
    }
}

pub fn validate_timeout(secs: u64) -> Result<(), ConfigError> {
    if (MIN_TIMEOUT_SECS..=MAX_TIMEOUT_SECS).contains(&secs) {
        Ok(())
    } else {
        Err(ConfigError::InvalidTimeout(secs))
    }
}

pub fn validate_page_size(rows: u32) -> Result<(), ConfigError> {
    if (1..=MAX_PAGE_SIZE).contains(&rows) {
        Ok(())
    } else {
        Err(ConfigError::InvalidPageSize(rows))
    }
}

/// "both" expands to departures then arrivals
pub fn parse_directions(value: &str) -> Result<Vec<Direction>, ConfigError> {
    if value.trim().eq_ignore_ascii_case("both") {
        return Ok(Direction::ALL.to_vec());
    }
    Ok(vec![value.parse()?])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_all_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.api.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.families().len(), 3);
    }

    #[test]
    fn test_partial_sections() {
        let config: AppConfig = toml::from_str(
            r#"
[api]
page_size = 50

[query]
terminals = ["T2"]
gates = ["230, 231"]
family = "standard"
"#,
        )
        .unwrap();

        config.validate().unwrap();
        assert_eq!(config.api.page_size, 50);
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.query.family.as_deref(), Some("standard"));
    }

    #[test]
    fn test_custom_family_table() {
        let config: AppConfig = toml::from_str(
            r#"
[[families]]
name = "odp"
params = { credential = "ServiceKey" }

[families.departure]
direction = "departure"
base_path = "StatusOfPassengerFlightsOdp"
operation = "getPassengerDeparturesOdp"
terminal_param = "searchTerminalId"
requires_date = true

[families.arrival]
direction = "arrival"
base_path = "StatusOfPassengerFlightsOdp"
operation = "getPassengerArrivalsOdp"
"#,
        )
        .unwrap();

        config.validate().unwrap();
        let families = config.families();
        assert_eq!(families.len(), 3);
        assert_eq!(families[0].departure.terminal_param, "searchTerminalId");
        assert!(families[0].departure.requires_date);
        assert_eq!(families[0].arrival.terminal_param, "terminalId");
        assert_eq!(families[0].params.credential, "ServiceKey");
        assert_eq!(families[0].params.rows, "numOfRows");
    }

    #[test]
    fn test_bounds() {
        assert!(validate_timeout(0).is_err());
        assert!(validate_timeout(10).is_ok());
        assert!(validate_timeout(11).is_err());
        assert!(validate_page_size(0).is_err());
        assert!(validate_page_size(300).is_ok());
        assert!(validate_page_size(301).is_err());
    }

    #[test]
    fn test_unknown_terminal_rejected() {
        let config: AppConfig = toml::from_str("[query]\nterminals = [\"T9\"]").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::UnknownTerminal(_))));
    }

    #[test]
    fn test_parse_directions() {
        assert_eq!(parse_directions("both").unwrap(), Direction::ALL.to_vec());
        assert_eq!(parse_directions("Arrival").unwrap(), vec![Direction::Arrival]);
        assert!(parse_directions("sideways").is_err());
    }
}
