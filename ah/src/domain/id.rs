//! Anchor identifiers and scene handles

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Globally unique identifier for one anchor, assigned by the provider that created it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnchorId(Uuid);

impl AnchorId {
    /// Sentinel returned when no provider produced an anchor
    pub const EMPTY: AnchorId = AnchorId(Uuid::nil());

    /// Allocate a fresh time-ordered identifier
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// True for the `EMPTY` sentinel
    pub fn is_empty(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for AnchorId {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl std::fmt::Display for AnchorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for AnchorId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Opaque handle to the scene object an anchor is attached to
///
/// The coordinator never interprets it; providers allocate handles and
/// callers use them to correlate events with their own scene objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnchorHandle(u64);

impl AnchorHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for AnchorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
