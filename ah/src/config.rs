//! AnchorHub configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::coordinator::CoordinatorConfig;
use crate::domain::TrackingCapability;
use crate::provider::LocalAnchorProvider;

/// Main AnchorHub configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level", skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Coordinator behavior
    pub coordinator: CoordinatorConfig,

    /// Local providers registered at startup
    pub providers: ProvidersConfig,

    /// JSONL event log
    #[serde(rename = "event-log")]
    pub event_log: EventLogConfig,
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Project-local config: .anchorhub.yml
        let local_config = PathBuf::from(".anchorhub.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // User config: ~/.config/anchorhub/anchorhub.yml
        if let Some(user_config) = Self::user_config_path()
            && user_config.exists()
        {
            match Self::load_from_file(&user_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Validate configuration before use
    pub fn validate(&self) -> Result<()> {
        self.coordinator.validate().context("Invalid coordinator config")
    }

    /// Read only the log level, before logging is set up
    ///
    /// Errors are swallowed; the full load reports them later.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        Self::load(config_path).ok().and_then(|config| config.log_level)
    }

    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("anchorhub").join("anchorhub.yml"))
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Providers to register, in order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProvidersConfig(pub Vec<ProviderConfig>);

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self(vec![
            ProviderConfig::new("cloud", TrackingCapability::CloudAnchor),
            ProviderConfig::new("image", TrackingCapability::ImageTracking),
        ])
    }
}

impl ProvidersConfig {
    pub fn iter(&self) -> std::slice::Iter<'_, ProviderConfig> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One local provider entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub name: String,

    #[serde(default)]
    pub capability: TrackingCapability,
}

impl ProviderConfig {
    pub fn new(name: impl Into<String>, capability: TrackingCapability) -> Self {
        Self {
            name: name.into(),
            capability,
        }
    }

    /// Build the in-process provider this entry describes
    pub fn build(&self) -> LocalAnchorProvider {
        LocalAnchorProvider::new(self.name.clone(), self.capability)
    }
}

/// Event log configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventLogConfig {
    /// Write relayed events to a JSONL file
    pub enabled: bool,

    /// Log file path; defaults to the data directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}
