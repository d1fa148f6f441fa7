//! Anchor placement: where an anchor goes and how long it should live

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Position in world space (meters)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Orientation quaternion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quat {
    pub const IDENTITY: Quat = Quat {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Requested retention for a created anchor
///
/// Passed through to providers as a hint; the coordinator enforces no timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "kind", content = "at")]
pub enum TimeToLive {
    #[default]
    Indefinite,
    Until(DateTime<Utc>),
}

impl TimeToLive {
    /// Build from a relative lifetime in seconds; negative means indefinite
    ///
    /// Lifetimes too large to represent are also treated as indefinite.
    pub fn from_secs(secs: i64) -> Self {
        if secs < 0 {
            return Self::Indefinite;
        }
        Duration::try_seconds(secs)
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .map_or(Self::Indefinite, Self::Until)
    }

    /// Absolute expiry instant, `None` when indefinite
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Indefinite => None,
            Self::Until(at) => Some(*at),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self {
            Self::Indefinite => false,
            Self::Until(at) => *at <= now,
        }
    }
}

/// Placement for one create request
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AnchorPlacement {
    pub position: Vec3,
    pub orientation: Quat,
    #[serde(default, rename = "time-to-live")]
    pub time_to_live: TimeToLive,
}

impl AnchorPlacement {
    /// Placement with an indefinite lifetime
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
            time_to_live: TimeToLive::Indefinite,
        }
    }

    pub fn with_time_to_live(mut self, time_to_live: TimeToLive) -> Self {
        self.time_to_live = time_to_live;
        self
    }
}
