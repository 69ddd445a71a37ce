use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::{error::ConfigurationError, session::RacePolicy, transport::TransportMode};

pub const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com/v1";
pub const DEFAULT_RELAY_URL: &str = "https://api.allorigins.win/get";
pub const DEFAULT_LOCATION: &str = "London";
pub const DEFAULT_FORECAST_DAYS: u8 = 2;

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// default_location = "London"
/// transport = "relay"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,

    /// Queried when no location is given, like the startup load of the widget.
    pub default_location: String,

    pub base_url: String,

    pub forecast_days: u8,

    /// "direct" or "relay".
    pub transport: String,

    pub relay_url: String,

    /// Request timeout; unset leaves the HTTP client's default in place.
    pub timeout_secs: Option<u64>,

    /// "last_issued_wins" or "last_resolved_wins".
    pub race_policy: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            default_location: DEFAULT_LOCATION.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            forecast_days: DEFAULT_FORECAST_DAYS,
            transport: TransportMode::Direct.as_str().to_string(),
            relay_url: DEFAULT_RELAY_URL.to_string(),
            timeout_secs: None,
            race_policy: RacePolicy::LastIssuedWins.as_str().to_string(),
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-lookup", "weather-lookup")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// API key, ignoring blank values.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    pub fn set_api_key(&mut self, api_key: impl Into<String>) {
        self.api_key = Some(api_key.into());
    }

    /// Replace the stored key when `api_key` carries a non-blank value.
    pub fn override_api_key(&mut self, api_key: Option<String>) {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
    }

    pub fn transport_mode(&self) -> Result<TransportMode, ConfigurationError> {
        TransportMode::try_from(self.transport.as_str())
    }

    pub fn set_transport_mode(&mut self, mode: TransportMode) {
        self.transport = mode.as_str().to_string();
    }

    pub fn race_policy(&self) -> Result<RacePolicy, ConfigurationError> {
        RacePolicy::try_from(self.race_policy.as_str())
    }
}
