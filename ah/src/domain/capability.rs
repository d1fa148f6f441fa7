//! Provider capability tags and start policy

use serde::{Deserialize, Serialize};

/// How a provider relocates its anchors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrackingCapability {
    #[default]
    Unsupported,
    CloudAnchor,
    ImageTracking,
}

impl std::fmt::Display for TrackingCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unsupported => write!(f, "unsupported"),
            Self::CloudAnchor => write!(f, "cloud-anchor"),
            Self::ImageTracking => write!(f, "image-tracking"),
        }
    }
}

impl std::str::FromStr for TrackingCapability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "unsupported" => Ok(Self::Unsupported),
            "cloud-anchor" | "cloud" => Ok(Self::CloudAnchor),
            "image-tracking" | "image" => Ok(Self::ImageTracking),
            _ => Err(format!("Unknown tracking capability: {}", s)),
        }
    }
}

/// Whether providers are started as soon as they are registered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoStart {
    #[default]
    Auto,
    Manual,
}

impl AutoStart {
    pub fn is_auto(&self) -> bool {
        matches!(self, Self::Auto)
    }
}
