//! Event types raised by anchor providers and relayed by the coordinator
//!
//! The vocabulary covers:
//! - Session lifecycle (initialized, started, ended)
//! - Operation lifecycle (create started, find started)
//! - Outcomes (created, located, updated, deleted, failures, status text)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{AnchorHandle, AnchorId};

/// Everything a provider can report about its session and its anchors
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AnchorEvent {
    // === Session Lifecycle ===
    /// The vendor backend finished initializing
    SessionInitialized,
    /// The vendor backend is running and can place or search for anchors
    SessionStarted,
    /// The vendor backend stopped
    SessionEnded,

    // === Operation Lifecycle ===
    /// Creation of an anchor began; finishes with `CreateSucceeded` or `CreateFailed`
    CreateStarted,
    /// A search began; `AnchorLocated` follows for every anchor found
    FindStarted,

    // === Outcomes ===
    /// An anchor was created and attached to the given scene handle
    CreateSucceeded { id: AnchorId, handle: AnchorHandle },
    /// The backend could not create the anchor
    CreateFailed,
    /// Progress text while an anchor is being localized
    StatusMessage { message: String },
    /// General backend failure
    Error { message: String },
    /// A requested anchor was found and cached
    AnchorLocated { id: AnchorId, handle: AnchorHandle },
    /// A requested anchor could not be retrieved
    AnchorLocatedError { id: AnchorId, message: String },
    /// The backend changed an anchored object in the scene
    AnchorUpdated { id: AnchorId, handle: AnchorHandle },
    /// The backend deleted an anchor
    AnchorDeleted { id: AnchorId },
}

impl AnchorEvent {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            AnchorEvent::SessionInitialized => "SessionInitialized",
            AnchorEvent::SessionStarted => "SessionStarted",
            AnchorEvent::SessionEnded => "SessionEnded",
            AnchorEvent::CreateStarted => "CreateStarted",
            AnchorEvent::FindStarted => "FindStarted",
            AnchorEvent::CreateSucceeded { .. } => "CreateSucceeded",
            AnchorEvent::CreateFailed => "CreateFailed",
            AnchorEvent::StatusMessage { .. } => "StatusMessage",
            AnchorEvent::Error { .. } => "Error",
            AnchorEvent::AnchorLocated { .. } => "AnchorLocated",
            AnchorEvent::AnchorLocatedError { .. } => "AnchorLocatedError",
            AnchorEvent::AnchorUpdated { .. } => "AnchorUpdated",
            AnchorEvent::AnchorDeleted { .. } => "AnchorDeleted",
        }
    }

    /// The anchor this event is about, if any
    pub fn anchor_id(&self) -> Option<AnchorId> {
        match self {
            AnchorEvent::CreateSucceeded { id, .. }
            | AnchorEvent::AnchorLocated { id, .. }
            | AnchorEvent::AnchorLocatedError { id, .. }
            | AnchorEvent::AnchorUpdated { id, .. }
            | AnchorEvent::AnchorDeleted { id } => Some(*id),
            _ => None,
        }
    }

    /// True for events reporting a failure
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            AnchorEvent::CreateFailed | AnchorEvent::Error { .. } | AnchorEvent::AnchorLocatedError { .. }
        )
    }
}

/// A timestamped event log entry for file persistence
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventLogEntry {
    /// Timestamp of the event
    #[serde(rename = "ts")]
    pub timestamp: DateTime<Utc>,
    /// The event
    pub event: AnchorEvent,
}

impl EventLogEntry {
    /// Create a new log entry with current timestamp
    pub fn new(event: AnchorEvent) -> Self {
        Self {
            timestamp: Utc::now(),
            event,
        }
    }
}
