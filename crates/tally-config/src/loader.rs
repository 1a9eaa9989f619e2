//! Configuration loading from YAML with environment variable overrides.

use crate::schema::{Config, RatePreset};
use std::env;
use std::path::Path;
use tally_common::{Result as TallyResult, TallyError};
use thiserror::Error;
use tracing::{debug, info};

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading configuration file
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML configuration: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Configuration validation error
    #[error("Configuration validation failed: {0}")]
    ValidationError(#[source] TallyError),

    /// Environment variable parsing error
    #[error("Failed to parse environment variable '{var}': {source}")]
    EnvParseError {
        /// Name of the offending variable
        var: String,
        /// Underlying parse failure
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl From<ConfigError> for TallyError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::ValidationError(inner) => inner,
            other => Self::config_with_source("Failed to load configuration", other),
        }
    }
}

/// Configuration loader for the application
pub struct ConfigLoader;

impl ConfigLoader {
    /// Environment variable naming an explicit configuration file
    pub const PATH_VAR: &'static str = "TALLY_CONFIG_PATH";

    /// Load configuration from a YAML file with environment variable overrides
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let mut config = Self::parse(&content)?;
        Self::apply_overrides_from(&mut config, |var| env::var(var).ok())?;
        config.validate().map_err(ConfigError::ValidationError)?;

        info!(path = %path.as_ref().display(), "Configuration loaded");
        Ok(config)
    }

    /// Parse YAML without overrides or validation
    pub fn parse(content: &str) -> Result<Config, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load configuration from the first source found:
    /// `TALLY_CONFIG_PATH`, `config.yaml`, `config.yml`, then built-in defaults
    pub fn load() -> TallyResult<Config> {
        let config = if let Ok(config_path) = env::var(Self::PATH_VAR) {
            Self::load_config(&config_path)?
        } else if Path::new("config.yaml").exists() {
            Self::load_config("config.yaml")?
        } else if Path::new("config.yml").exists() {
            Self::load_config("config.yml")?
        } else {
            debug!("No configuration file found, using defaults");
            let mut config = Config::default();
            Self::apply_overrides_from(&mut config, |var| env::var(var).ok())?;
            config.validate().map_err(ConfigError::ValidationError)?;
            config
        };

        Ok(config)
    }

    /// Apply overrides using `lookup` to read variables
    pub fn apply_overrides_from<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("DISCORD_TOKEN") {
            config.discord.token = token;
        }

        if let Some(path) = lookup("TALLY_LEDGER_PATH") {
            config.database.ledger_path = path.into();
        }

        if let Some(path) = lookup("TALLY_PREFERENCES_PATH") {
            config.database.preferences_path = path.into();
        }

        let max_events = lookup("TALLY_RATE_MAX_EVENTS")
            .map(|value| parse_var::<u32>("TALLY_RATE_MAX_EVENTS", &value))
            .transpose()?;
        let window_seconds = lookup("TALLY_RATE_WINDOW_SECONDS")
            .map(|value| parse_var::<u64>("TALLY_RATE_WINDOW_SECONDS", &value))
            .transpose()?;

        // Rate overrides only apply to a custom policy; the other half is
        // taken from whatever preset was active.
        if max_events.is_some() || window_seconds.is_some() {
            let (current_max, current_window) = config.spam_guard.limits();
            config.spam_guard.preset = RatePreset::Custom;
            config.spam_guard.max_events = max_events.unwrap_or(current_max);
            config.spam_guard.window_seconds = window_seconds.unwrap_or_else(|| current_window.as_secs());
        }

        if let Some(value) = lookup("TALLY_BLOCK_MINUTES") {
            config.spam_guard.block_minutes = parse_var("TALLY_BLOCK_MINUTES", &value)?;
        }

        if let Some(level) = lookup("TALLY_LOG_LEVEL") {
            config.logging.level = level;
        }

        Ok(())
    }
}

fn parse_var<T>(var: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.trim().parse().map_err(|e| ConfigError::EnvParseError {
        var: var.to_string(),
        source: Box::new(e),
    })
}
