//! Event Bus - the coordinator's public event stream
//!
//! The EventBus uses a tokio broadcast channel to deliver relayed provider
//! events to every subscriber. Providers never hold the bus; the event router
//! binds its sender to each registered provider's `EventSource`.

use tokio::sync::broadcast;
use tracing::debug;

use super::types::AnchorEvent;

/// Default channel capacity (events)
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Largest channel capacity a bus accepts (events)
pub const MAX_CHANNEL_CAPACITY: usize = 1 << 20;

/// Broadcast channel carrying every relayed anchor event
pub struct EventBus {
    tx: broadcast::Sender<AnchorEvent>,
}

impl EventBus {
    /// Create a new event bus, clamping `capacity` to `1..=MAX_CHANNEL_CAPACITY`
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, MAX_CHANNEL_CAPACITY);
        debug!(capacity, "EventBus::new: creating event bus");
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to receive events
    ///
    /// Only events emitted after subscription are received.
    pub fn subscribe(&self) -> broadcast::Receiver<AnchorEvent> {
        debug!("EventBus::subscribe: new subscriber");
        self.tx.subscribe()
    }

    /// Sender half used to bind provider event sources to this bus
    pub(crate) fn sender(&self) -> broadcast::Sender<AnchorEvent> {
        self.tx.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AnchorId;
    use tokio::sync::broadcast::error::TryRecvError;

    #[tokio::test]
    async fn test_sender_feeds_subscribers() {
        let bus = EventBus::new(100);
        let mut rx = bus.subscribe();
        let id = AnchorId::new();

        bus.sender().send(AnchorEvent::AnchorDeleted { id }).unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.anchor_id(), Some(id));
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn test_send_without_subscribers_is_dropped() {
        let bus = EventBus::new(100);
        assert!(bus.sender().send(AnchorEvent::SessionStarted).is_err());
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let bus = EventBus::new(100);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.sender().send(AnchorEvent::CreateFailed).unwrap();

        assert_eq!(rx1.recv().await.unwrap(), AnchorEvent::CreateFailed);
        assert_eq!(rx2.recv().await.unwrap(), AnchorEvent::CreateFailed);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let bus = EventBus::new(0);
        let mut rx = bus.subscribe();
        let tx = bus.sender();

        tx.send(AnchorEvent::FindStarted).unwrap();
        tx.send(AnchorEvent::CreateStarted).unwrap();

        assert!(matches!(rx.try_recv(), Err(TryRecvError::Lagged(1))));
        assert_eq!(rx.try_recv().unwrap(), AnchorEvent::CreateStarted);
    }

    #[test]
    fn test_oversized_capacity_is_clamped() {
        // An unclamped capacity this large panics inside tokio
        let bus = EventBus::new(usize::MAX);
        let mut rx = bus.subscribe();
        bus.sender().send(AnchorEvent::SessionEnded).unwrap();
        assert_eq!(rx.try_recv().unwrap(), AnchorEvent::SessionEnded);
    }
}
