//! Coordinator facade: the single entry point for anchor operations

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::config::CoordinatorConfig;
use super::dispatch;
use super::registry::ProviderRegistry;
use super::router::EventRouter;
use crate::domain::{AnchorHandle, AnchorId, AnchorPlacement, AnchorSearch, AutoStart, TrackingCapability};
use crate::events::AnchorEvent;
use crate::provider::AnchorProvider;

/// Lifecycle of a coordinator instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinatorState {
    #[default]
    Uninitialized,
    Started,
    Stopped,
}

/// Fans anchor operations out to every registered provider and relays
/// their events on one stream
pub struct Coordinator {
    config: CoordinatorConfig,
    registry: ProviderRegistry,
    router: EventRouter,
    state: Mutex<CoordinatorState>,
}

impl Coordinator {
    /// Create a new Coordinator with the given configuration
    pub fn new(config: CoordinatorConfig) -> Self {
        debug!(?config, "Coordinator::new: called");
        Self {
            router: EventRouter::new(config.event_capacity),
            registry: ProviderRegistry::new(),
            state: Mutex::new(CoordinatorState::Uninitialized),
            config,
        }
    }

    pub fn auto_start(&self) -> AutoStart {
        self.config.auto_start
    }

    pub fn state(&self) -> CoordinatorState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, next: CoordinatorState) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        debug!(from = ?*state, to = ?next, "Coordinator: state transition");
        *state = next;
    }

    /// Subscribe to every event raised by currently registered providers
    pub fn subscribe(&self) -> broadcast::Receiver<AnchorEvent> {
        self.router.subscribe()
    }

    // === Registry ===

    /// Registered providers, in registration order
    pub fn providers(&self) -> Vec<Arc<dyn AnchorProvider>> {
        self.registry.snapshot()
    }

    pub fn provider_count(&self) -> usize {
        self.registry.len()
    }

    pub fn is_registered(&self, provider: &Arc<dyn AnchorProvider>) -> bool {
        self.registry.contains(provider)
    }

    /// Whether `provider` is registered with its events relayed
    pub fn is_subscribed(&self, provider: &Arc<dyn AnchorProvider>) -> bool {
        self.registry.is_subscribed(provider).unwrap_or(false)
    }

    /// Register a provider and relay its events
    ///
    /// Returns false if it is already registered. Under `AutoStart::Auto`
    /// the provider is started right away; a failed start is logged and
    /// leaves the provider registered.
    pub async fn register(&self, provider: Arc<dyn AnchorProvider>) -> bool {
        debug!(provider = provider.name(), "Coordinator::register: called");
        if !self.registry.insert_with(Arc::clone(&provider), |p| self.router.attach(p)) {
            warn!(provider = provider.name(), "Provider already registered");
            return false;
        }
        info!(
            provider = provider.name(),
            capability = %provider.tracking_capability(),
            "Provider registered"
        );

        if self.config.auto_start.is_auto()
            && let Err(e) = provider.start().await
        {
            warn!(provider = provider.name(), error = %e, "Provider failed to auto-start");
        }
        true
    }

    /// Unwire, stop and remove a provider
    ///
    /// Returns false if it was not registered. The provider stays listed
    /// while it stops, and `stop` runs with no registry lock held.
    pub fn deregister(&self, provider: &Arc<dyn AnchorProvider>) -> bool {
        debug!(provider = provider.name(), "Coordinator::deregister: called");
        let unwired = self.registry.unwire_with(provider, |entry| {
            let subscription = entry.take_subscription();
            self.router.detach(entry.provider().as_ref(), subscription);
        });
        if !unwired {
            warn!(provider = provider.name(), "Provider not registered");
            return false;
        }

        provider.stop();
        self.registry.remove(provider);
        info!(provider = provider.name(), "Provider deregistered");
        true
    }

    /// Deregister every provider; returns how many were removed
    pub fn deregister_all(&self) -> usize {
        debug!("Coordinator::deregister_all: called");
        let mut removed = 0;
        for provider in self.providers() {
            if self.deregister(&provider) {
                removed += 1;
            }
        }
        removed
    }

    /// Registered providers declaring `capability`; `None` when there are none
    pub fn providers_by_capability(&self, capability: TrackingCapability) -> Option<Vec<Arc<dyn AnchorProvider>>> {
        self.registry.by_capability(capability)
    }

    // === Lifecycle ===

    /// Start every registered provider, one after another
    ///
    /// A provider that fails to start reports through its own events; earlier
    /// providers stay started.
    pub async fn start(&self) {
        let providers = self.providers();
        info!(count = providers.len(), "Starting anchor providers");
        let started = dispatch::start_all(&providers).await;
        debug!(started, total = providers.len(), "Coordinator::start: done");
        self.set_state(CoordinatorState::Started);
    }

    /// Stop every registered provider; they stay registered
    pub fn stop(&self) {
        let providers = self.providers();
        info!(count = providers.len(), "Stopping anchor providers");
        dispatch::stop_all(&providers);
        self.set_state(CoordinatorState::Stopped);
    }

    /// Stop every provider, then deregister them all
    pub fn shutdown(&self) {
        debug!("Coordinator::shutdown: called");
        self.stop();
        let removed = self.deregister_all();
        info!(removed, "Coordinator shut down");
    }

    // === Anchor operations ===

    /// Ask every provider to create an anchor at `placement`
    pub fn create_anchor(&self, placement: &AnchorPlacement) {
        dispatch::create_anchor(&self.providers(), placement);
    }

    /// Create an anchor through the first registered provider
    ///
    /// Returns `AnchorId::EMPTY` when no provider is registered or the
    /// provider failed.
    pub async fn create_anchor_async(&self, placement: &AnchorPlacement) -> AnchorId {
        dispatch::create_anchor_async(&self.providers(), placement).await
    }

    /// Ask every provider to search; results arrive as `AnchorLocated` events
    ///
    /// # Panics
    ///
    /// On an empty `Ids` or `Args` search.
    pub fn find_anchors(&self, search: &AnchorSearch) {
        dispatch::find_anchors(&self.providers(), search);
    }

    /// Search through the first registered provider
    ///
    /// # Panics
    ///
    /// On an empty `Ids` or `Args` search.
    pub async fn find_anchors_async(&self, search: &AnchorSearch) -> bool {
        dispatch::find_anchors_async(&self.providers(), search).await
    }

    /// Whether any provider has an anchor on `handle`
    pub fn has_anchor(&self, handle: &AnchorHandle) -> bool {
        dispatch::has_anchor(&self.providers(), handle)
    }

    /// Move an anchor through the first provider that accepts it
    pub fn move_anchor(&self, handle: &AnchorHandle, placement: &AnchorPlacement, id: AnchorId) -> bool {
        dispatch::move_anchor(&self.providers(), handle, placement, id)
    }

    /// Ask every provider to delete `ids`
    pub fn delete_anchors(&self, ids: &[AnchorId]) {
        dispatch::delete_anchors(&self.providers(), ids);
    }

    /// Ask every provider to drop its cache; true if any did
    pub fn clear_cache(&self) -> bool {
        dispatch::clear_cache(&self.providers())
    }
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new(CoordinatorConfig::default())
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        if !self.registry.is_empty() {
            debug!(count = self.registry.len(), "Coordinator::drop: deregistering providers");
            self.deregister_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::mock::RecordingProvider;
    use crate::provider::{LocalAnchorProvider, UnsupportedProvider};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{OnceLock, Weak};
    use tokio::sync::broadcast::error::TryRecvError;

    fn manual() -> Coordinator {
        Coordinator::new(CoordinatorConfig::manual())
    }

    #[tokio::test]
    async fn test_initial_state() {
        let coordinator = Coordinator::default();
        assert_eq!(coordinator.state(), CoordinatorState::Uninitialized);
        assert_eq!(coordinator.provider_count(), 0);
        assert_eq!(coordinator.auto_start(), AutoStart::Auto);
    }

    #[tokio::test]
    async fn test_duplicate_registration() {
        let coordinator = manual();
        let provider: Arc<dyn AnchorProvider> = Arc::new(RecordingProvider::new("p"));

        assert!(coordinator.register(Arc::clone(&provider)).await);
        assert!(!coordinator.register(Arc::clone(&provider)).await);
        assert_eq!(coordinator.provider_count(), 1);
        assert_eq!(provider.events().binding_count(), 1);
    }

    #[tokio::test]
    async fn test_auto_start_on_register() {
        let coordinator = Coordinator::default();
        let recording = Arc::new(RecordingProvider::new("p"));

        coordinator.register(recording.clone()).await;

        assert_eq!(RecordingProvider::count(&recording.starts), 1);
        assert!(recording.is_running());
    }

    #[tokio::test]
    async fn test_manual_does_not_start_on_register() {
        let coordinator = manual();
        let recording = Arc::new(RecordingProvider::new("p"));

        coordinator.register(recording.clone()).await;

        assert_eq!(RecordingProvider::count(&recording.starts), 0);
    }

    #[tokio::test]
    async fn test_failed_auto_start_keeps_registration() {
        let coordinator = Coordinator::default();
        let mut rx = coordinator.subscribe();
        let mut provider = RecordingProvider::new("p");
        provider.fail_start = true;
        let provider: Arc<dyn AnchorProvider> = Arc::new(provider);

        assert!(coordinator.register(Arc::clone(&provider)).await);
        assert!(coordinator.is_registered(&provider));
        assert_eq!(
            rx.try_recv().unwrap(),
            AnchorEvent::Error {
                message: "start failed".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_deregister_stops_and_unwires() {
        let coordinator = manual();
        let recording = Arc::new(RecordingProvider::new("p"));
        let provider: Arc<dyn AnchorProvider> = recording.clone();
        coordinator.register(Arc::clone(&provider)).await;
        assert!(coordinator.is_subscribed(&provider));

        let mut rx = coordinator.subscribe();
        assert!(coordinator.deregister(&provider));

        assert_eq!(RecordingProvider::count(&recording.stops), 1);
        assert_eq!(provider.events().binding_count(), 0);
        assert!(!coordinator.is_subscribed(&provider));
        // The stop-time SessionEnded was raised after unwiring
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_deregister_absent() {
        let coordinator = manual();
        let registered: Arc<dyn AnchorProvider> = Arc::new(RecordingProvider::new("a"));
        let stranger = Arc::new(RecordingProvider::new("b"));
        coordinator.register(Arc::clone(&registered)).await;

        let stranger_dyn: Arc<dyn AnchorProvider> = stranger.clone();
        assert!(!coordinator.deregister(&stranger_dyn));
        assert_eq!(coordinator.provider_count(), 1);
        assert_eq!(RecordingProvider::count(&stranger.stops), 0);
    }

    #[tokio::test]
    async fn test_start_stop_lifecycle() {
        let coordinator = manual();
        let providers: Vec<Arc<RecordingProvider>> =
            (0..3).map(|i| Arc::new(RecordingProvider::new(&format!("p{}", i)))).collect();
        for p in &providers {
            coordinator.register(p.clone()).await;
        }

        coordinator.start().await;
        assert_eq!(coordinator.state(), CoordinatorState::Started);
        assert!(providers.iter().all(|p| RecordingProvider::count(&p.starts) == 1));

        coordinator.stop();
        assert_eq!(coordinator.state(), CoordinatorState::Stopped);
        assert!(providers.iter().all(|p| RecordingProvider::count(&p.stops) == 1));
        assert_eq!(coordinator.provider_count(), 3);

        assert_eq!(coordinator.deregister_all(), 3);
        assert_eq!(coordinator.provider_count(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_empties_registry() {
        let coordinator = manual();
        let provider = Arc::new(LocalAnchorProvider::cloud("cloud"));
        coordinator.register(provider.clone()).await;
        coordinator.start().await;

        coordinator.shutdown();

        assert_eq!(coordinator.provider_count(), 0);
        assert_eq!(coordinator.state(), CoordinatorState::Stopped);
        assert!(!provider.is_running());
    }

    #[tokio::test]
    async fn test_drop_deregisters() {
        let recording = Arc::new(RecordingProvider::new("p"));
        {
            let coordinator = manual();
            coordinator.register(recording.clone()).await;
        }
        assert_eq!(RecordingProvider::count(&recording.stops), 1);
        assert_eq!(recording.events().binding_count(), 0);
    }

    #[tokio::test]
    async fn test_capability_lookup() {
        let coordinator = manual();
        coordinator.register(Arc::new(LocalAnchorProvider::cloud("cloud"))).await;
        coordinator.register(Arc::new(UnsupportedProvider::new("stub"))).await;

        let found = coordinator
            .providers_by_capability(TrackingCapability::CloudAnchor)
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name(), "cloud");
        assert!(
            coordinator
                .providers_by_capability(TrackingCapability::ImageTracking)
                .is_none()
        );

        let images = RecordingProvider::new("images").with_capability(TrackingCapability::ImageTracking);
        coordinator.register(Arc::new(images)).await;
        let found = coordinator
            .providers_by_capability(TrackingCapability::ImageTracking)
            .unwrap();
        assert_eq!(found[0].name(), "images");
    }

    #[tokio::test]
    async fn test_relay_is_verbatim() {
        let coordinator = manual();
        let mut rx = coordinator.subscribe();
        let provider = Arc::new(LocalAnchorProvider::cloud("cloud"));
        coordinator.register(provider.clone()).await;
        coordinator.start().await;

        let id = coordinator.create_anchor_async(&AnchorPlacement::default()).await;

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert_eq!(events[0], AnchorEvent::SessionInitialized);
        assert_eq!(events[1], AnchorEvent::SessionStarted);
        assert_eq!(events[2], AnchorEvent::CreateStarted);
        assert_eq!(events[3].anchor_id(), Some(id));
    }

    /// Provider whose `stop` calls back into the coordinator
    struct ReentrantProvider {
        events: crate::events::EventSource,
        coordinator: OnceLock<Weak<Coordinator>>,
        count_during_stop: AtomicUsize,
        stops: AtomicUsize,
    }

    impl AnchorProvider for ReentrantProvider {
        fn name(&self) -> &str {
            "reentrant"
        }

        fn events(&self) -> &crate::events::EventSource {
            &self.events
        }

        fn stop(&self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
            if let Some(coordinator) = self.coordinator.get().and_then(Weak::upgrade) {
                self.count_during_stop
                    .store(coordinator.provider_count(), Ordering::SeqCst);
            }
        }
    }

    #[tokio::test]
    async fn test_stop_may_call_back_into_coordinator() {
        let coordinator = Arc::new(manual());
        let provider = Arc::new(ReentrantProvider {
            events: crate::events::EventSource::new(),
            coordinator: OnceLock::new(),
            count_during_stop: AtomicUsize::new(0),
            stops: AtomicUsize::new(0),
        });
        let _ = provider.coordinator.set(Arc::downgrade(&coordinator));
        let dyn_provider: Arc<dyn AnchorProvider> = provider.clone();
        coordinator.register(Arc::clone(&dyn_provider)).await;

        assert!(coordinator.deregister(&dyn_provider));

        assert_eq!(provider.stops.load(Ordering::SeqCst), 1);
        assert_eq!(provider.count_during_stop.load(Ordering::SeqCst), 1);
        assert_eq!(coordinator.provider_count(), 0);
        assert_eq!(provider.events().binding_count(), 0);
    }
}
