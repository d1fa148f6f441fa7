//! Event router: binds provider event sources to the coordinator bus

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::events::{AnchorEvent, EventBus, SubscriptionId};
use crate::provider::AnchorProvider;

/// Proof that a provider's events are wired to the coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    id: SubscriptionId,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }
}

/// Owns the coordinator's bus and wires providers into it
pub struct EventRouter {
    bus: EventBus,
}

impl EventRouter {
    pub fn new(capacity: usize) -> Self {
        debug!(capacity, "EventRouter::new: called");
        Self {
            bus: EventBus::new(capacity),
        }
    }

    /// Subscribe to every event relayed from registered providers
    pub fn subscribe(&self) -> broadcast::Receiver<AnchorEvent> {
        self.bus.subscribe()
    }

    /// Relay every event `provider` raises from now on
    pub fn attach(&self, provider: &dyn AnchorProvider) -> Subscription {
        let id = provider.events().bind(self.bus.sender());
        info!(provider = provider.name(), subscription = %id, "Provider events attached");
        Subscription { id }
    }

    /// Stop relaying `provider`'s events
    ///
    /// Safe to call with a subscription that was never attached or was
    /// already detached; returns whether a binding was removed.
    pub fn detach(&self, provider: &dyn AnchorProvider, subscription: Option<Subscription>) -> bool {
        let Some(subscription) = subscription else {
            debug!(provider = provider.name(), "EventRouter::detach: nothing attached");
            return false;
        };
        let removed = provider.events().unbind(subscription.id);
        if removed {
            info!(provider = provider.name(), subscription = %subscription.id, "Provider events detached");
        } else {
            warn!(provider = provider.name(), subscription = %subscription.id, "Provider binding already gone");
        }
        removed
    }
}
