//! Per-provider event source
//!
//! Each provider owns an `EventSource`. The coordinator's router binds the
//! bus sender to it on registration and unbinds on deregistration. Delivery
//! runs under the source's lock, so an emission racing an `unbind` either
//! completes before `unbind` returns or never reaches the removed binding.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

use super::types::AnchorEvent;
use crate::domain::{AnchorHandle, AnchorId};

/// Token identifying one binding on an `EventSource`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fan-out point for the events a single provider raises
#[derive(Default)]
pub struct EventSource {
    bindings: Mutex<HashMap<SubscriptionId, broadcast::Sender<AnchorEvent>>>,
}

impl EventSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn bindings(&self) -> MutexGuard<'_, HashMap<SubscriptionId, broadcast::Sender<AnchorEvent>>> {
        self.bindings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Route every future event into `tx`
    pub fn bind(&self, tx: broadcast::Sender<AnchorEvent>) -> SubscriptionId {
        let id = SubscriptionId::new();
        debug!(%id, "EventSource::bind: called");
        self.bindings().insert(id, tx);
        id
    }

    /// Remove a binding; false if it was never bound or already removed
    pub fn unbind(&self, id: SubscriptionId) -> bool {
        let removed = self.bindings().remove(&id).is_some();
        debug!(%id, removed, "EventSource::unbind: called");
        removed
    }

    pub fn binding_count(&self) -> usize {
        self.bindings().len()
    }

    pub fn is_bound(&self, id: SubscriptionId) -> bool {
        self.bindings().contains_key(&id)
    }

    /// Emit a raw event to every binding
    ///
    /// Unbound sources drop events silently.
    pub fn emit(&self, event: AnchorEvent) {
        let bindings = self.bindings();
        debug!(
            event_type = event.event_type(),
            bindings = bindings.len(),
            "EventSource::emit"
        );
        for tx in bindings.values() {
            let _ = tx.send(event.clone());
        }
    }

    // === Convenience methods ===

    pub fn session_initialized(&self) {
        self.emit(AnchorEvent::SessionInitialized);
    }

    pub fn session_started(&self) {
        self.emit(AnchorEvent::SessionStarted);
    }

    pub fn session_ended(&self) {
        self.emit(AnchorEvent::SessionEnded);
    }

    pub fn create_started(&self) {
        self.emit(AnchorEvent::CreateStarted);
    }

    pub fn find_started(&self) {
        self.emit(AnchorEvent::FindStarted);
    }

    pub fn create_succeeded(&self, id: AnchorId, handle: AnchorHandle) {
        self.emit(AnchorEvent::CreateSucceeded { id, handle });
    }

    pub fn create_failed(&self) {
        self.emit(AnchorEvent::CreateFailed);
    }

    pub fn status_message(&self, message: &str) {
        self.emit(AnchorEvent::StatusMessage {
            message: message.to_string(),
        });
    }

    pub fn error(&self, message: &str) {
        self.emit(AnchorEvent::Error {
            message: message.to_string(),
        });
    }

    pub fn anchor_located(&self, id: AnchorId, handle: AnchorHandle) {
        self.emit(AnchorEvent::AnchorLocated { id, handle });
    }

    pub fn anchor_located_error(&self, id: AnchorId, message: &str) {
        self.emit(AnchorEvent::AnchorLocatedError {
            id,
            message: message.to_string(),
        });
    }

    pub fn anchor_updated(&self, id: AnchorId, handle: AnchorHandle) {
        self.emit(AnchorEvent::AnchorUpdated { id, handle });
    }

    pub fn anchor_deleted(&self, id: AnchorId) {
        self.emit(AnchorEvent::AnchorDeleted { id });
    }
}

impl std::fmt::Debug for EventSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSource")
            .field("bindings", &self.binding_count())
            .finish()
    }
}
