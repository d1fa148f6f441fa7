//! Provider trait definition

use async_trait::async_trait;
use tracing::debug;

use super::error::ProviderError;
use crate::domain::{AnchorHandle, AnchorId, AnchorPlacement, AnchorSearch, TrackingCapability};
use crate::events::EventSource;

/// A backend that can place, locate, move and delete anchors
///
/// Only `name` and `events` are required. Every operation has a default that
/// fails gracefully: it reports the missing capability through the event
/// source and returns the failure value, so a partial provider can never
/// take the coordinator down.
#[async_trait]
pub trait AnchorProvider: Send + Sync {
    /// Human-readable provider name (for logs)
    fn name(&self) -> &str;

    /// Where this provider raises its events
    fn events(&self) -> &EventSource;

    /// How this provider relocates anchors
    fn tracking_capability(&self) -> TrackingCapability {
        TrackingCapability::Unsupported
    }

    /// Whether the provider's session is active
    fn is_running(&self) -> bool {
        false
    }

    /// Connect to the backend and enter a running state
    async fn start(&self) -> Result<(), ProviderError> {
        debug!(provider = self.name(), "AnchorProvider::start: unsupported");
        self.events().error(&unsupported(self.name(), "start"));
        Err(ProviderError::Unsupported {
            provider: self.name().to_string(),
            operation: "start",
        })
    }

    /// Disconnect from the backend
    ///
    /// On deregistration the coordinator calls this after unwiring the
    /// provider's events and with no registry lock held, so it may call back
    /// into the coordinator.
    fn stop(&self) {
        debug!(provider = self.name(), "AnchorProvider::stop: nothing to stop");
    }

    /// Request an anchor at `placement`; the outcome arrives as events
    fn create_anchor(&self, placement: &AnchorPlacement) {
        debug!(provider = self.name(), ?placement, "AnchorProvider::create_anchor: unsupported");
        self.events().error(&unsupported(self.name(), "create_anchor"));
        self.events().create_failed();
    }

    /// Create an anchor and wait for its identifier; `AnchorId::EMPTY` on failure
    async fn create_anchor_async(&self, placement: &AnchorPlacement) -> AnchorId {
        debug!(provider = self.name(), ?placement, "AnchorProvider::create_anchor_async: unsupported");
        self.events().error(&unsupported(self.name(), "create_anchor_async"));
        self.events().create_failed();
        AnchorId::EMPTY
    }

    /// Request a search; located anchors arrive as `AnchorLocated` events
    fn find_anchors(&self, search: &AnchorSearch) {
        debug!(provider = self.name(), kind = search.kind(), "AnchorProvider::find_anchors: unsupported");
        self.events().error(&unsupported(self.name(), "find_anchors"));
    }

    /// Request a search and wait until the backend accepted it
    async fn find_anchors_async(&self, search: &AnchorSearch) -> bool {
        debug!(provider = self.name(), kind = search.kind(), "AnchorProvider::find_anchors_async: unsupported");
        self.events().error(&unsupported(self.name(), "find_anchors_async"));
        false
    }

    /// Whether the scene object behind `handle` carries one of this provider's anchors
    fn has_anchor(&self, handle: &AnchorHandle) -> bool {
        debug!(provider = self.name(), %handle, "AnchorProvider::has_anchor: unsupported");
        false
    }

    /// Move an existing anchor; moving without the anchor's id loses its backend position
    fn move_anchor(&self, handle: &AnchorHandle, placement: &AnchorPlacement, id: AnchorId) -> bool {
        debug!(provider = self.name(), %handle, %id, ?placement, "AnchorProvider::move_anchor: unsupported");
        false
    }

    /// Delete anchors from the backend
    fn delete_anchors(&self, ids: &[AnchorId]) {
        debug!(provider = self.name(), count = ids.len(), "AnchorProvider::delete_anchors: unsupported");
        self.events().error(&unsupported(self.name(), "delete_anchors"));
    }

    /// Drop locally cached anchors without deleting them from the backend
    fn clear_cache(&self) -> bool {
        debug!(provider = self.name(), "AnchorProvider::clear_cache: unsupported");
        false
    }
}

fn unsupported(provider: &str, operation: &str) -> String {
    format!("{} does not support {}", provider, operation)
}
