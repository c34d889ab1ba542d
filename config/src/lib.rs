//! # Configuration Management for RowHaus
//!
//! This crate provides the configuration structures shared by the RowHaus
//! components, currently the value converter defaults.
//!
//! ## Quick Start
//!
//! ### TOML File Configuration
//! ```toml
//! [conversion]
//! instant_offset = "+02:00"
//! text_array_type = "varchar"
//! numeric_array_type = "numeric"
//! ```
//!
//! Load configuration:
//! ```rust
//! use config::AppConfig;
//!
//! // Parse inline TOML; every key is optional
//! let config = AppConfig::parse("[conversion]\ninstant_offset = \"+02:00\"")?;
//! assert_eq!(config.conversion.instant_offset()?.local_minus_utc(), 7200);
//!
//! // `AppConfig::load()` reads ROWHAUS_CONFIG (also from .env) or ./rowhaus.toml
//! # Ok::<(), config::ConfigError>(())
//! ```

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::{env, path::Path};
use thiserror::Error;

const DEFAULT_CONFIG_PATH: &str = "./rowhaus.toml";
const CONFIG_PATH_VAR: &str = "ROWHAUS_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Environment variable error: {0}")]
    Env(#[from] env::VarError),
    #[error("Dotenvy error: {0}")]
    Dotenvy(#[from] dotenvy::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub conversion: ConversionConfig,
}

/// Value converter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Offset instants are written with, `+HH:MM`, `Z` or `UTC`
    pub instant_offset: String,
    /// Array element type name used for strings and string forms
    pub text_array_type: String,
    /// Array element type name used for all numbers
    pub numeric_array_type: String,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            instant_offset: "+00:00".to_string(),
            text_array_type: "varchar".to_string(),
            numeric_array_type: "numeric".to_string(),
        }
    }
}

impl ConversionConfig {
    pub fn new(
        instant_offset: String,
        text_array_type: String,
        numeric_array_type: String,
    ) -> Self {
        Self {
            instant_offset,
            text_array_type,
            numeric_array_type,
        }
    }

    /// Parsed instant offset
    pub fn instant_offset(&self) -> Result<FixedOffset, ConfigError> {
        let raw = self.instant_offset.trim();
        if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
            return FixedOffset::east_opt(0)
                .ok_or_else(|| ConfigError::Invalid("UTC offset unavailable".to_string()));
        }
        raw.parse::<FixedOffset>().map_err(|e| {
            ConfigError::Invalid(format!("Invalid instant_offset '{}': {}", raw, e))
        })
    }
}

impl AppConfig {
    /// Load configuration from the TOML file named in the environment (or .env),
    /// the default path, or fall back to defaults
    pub fn load() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            // A missing .env file is fine
            if !e.not_found() {
                return Err(e.into());
            }
        }

        let config = if let Ok(config_path) = env::var(CONFIG_PATH_VAR) {
            Self::from_file(&config_path)?
        } else if Path::new(DEFAULT_CONFIG_PATH).exists() {
            Self::from_file(DEFAULT_CONFIG_PATH)?
        } else {
            Self::default()
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.conversion.instant_offset()?;

        if self.conversion.text_array_type.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "Conversion text_array_type cannot be empty".to_string(),
            ));
        }
        if self.conversion.numeric_array_type.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "Conversion numeric_array_type cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
