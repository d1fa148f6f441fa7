//! Coordinator configuration

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::AutoStart;
use crate::events::{DEFAULT_CHANNEL_CAPACITY, MAX_CHANNEL_CAPACITY};

/// Coordinator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Start providers as soon as they are registered
    #[serde(default, rename = "auto-start")]
    pub auto_start: AutoStart,

    /// Buffer size of the relayed event channel
    #[serde(default = "default_event_capacity", rename = "event-capacity")]
    pub event_capacity: usize,
}

fn default_event_capacity() -> usize {
    debug!("default_event_capacity: called");
    DEFAULT_CHANNEL_CAPACITY
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        debug!("CoordinatorConfig::default: called");
        Self {
            auto_start: AutoStart::Auto,
            event_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl CoordinatorConfig {
    /// Config with providers started only by an explicit `start()`
    pub fn manual() -> Self {
        Self {
            auto_start: AutoStart::Manual,
            ..Default::default()
        }
    }

    /// Reject settings the event bus cannot honor
    pub fn validate(&self) -> eyre::Result<()> {
        if self.event_capacity == 0 || self.event_capacity > MAX_CHANNEL_CAPACITY {
            return Err(eyre::eyre!(
                "event-capacity must be between 1 and {}, got {}",
                MAX_CHANNEL_CAPACITY,
                self.event_capacity
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CoordinatorConfig::default();
        assert_eq!(config.auto_start, AutoStart::Auto);
        assert_eq!(config.event_capacity, DEFAULT_CHANNEL_CAPACITY);
    }

    #[test]
    fn test_manual_config() {
        let config = CoordinatorConfig::manual();
        assert_eq!(config.auto_start, AutoStart::Manual);
        assert_eq!(config.event_capacity, DEFAULT_CHANNEL_CAPACITY);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: CoordinatorConfig = serde_yaml::from_str("auto-start: manual\n").unwrap();
        assert_eq!(config.auto_start, AutoStart::Manual);
        assert_eq!(config.event_capacity, DEFAULT_CHANNEL_CAPACITY);

        let config: CoordinatorConfig = serde_yaml::from_str("event-capacity: 16\n").unwrap();
        assert_eq!(config.auto_start, AutoStart::Auto);
        assert_eq!(config.event_capacity, 16);
    }

    #[test]
    fn test_validate_event_capacity() {
        assert!(CoordinatorConfig::default().validate().is_ok());

        let bounds = CoordinatorConfig {
            event_capacity: MAX_CHANNEL_CAPACITY,
            ..Default::default()
        };
        assert!(bounds.validate().is_ok());

        for event_capacity in [0, MAX_CHANNEL_CAPACITY + 1, usize::MAX] {
            let config = CoordinatorConfig {
                event_capacity,
                ..Default::default()
            };
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("event-capacity"));
        }
    }
}
