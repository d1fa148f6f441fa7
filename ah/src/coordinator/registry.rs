//! Provider registry: the set of active providers, in registration order
//!
//! Mutation and wiring happen under the write lock, and readers take a
//! snapshot, so no caller ever observes a provider that is half wired.
//! Provider callbacks such as `stop` never run under the lock.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use super::router::Subscription;
use crate::domain::TrackingCapability;
use crate::provider::AnchorProvider;

/// Identity comparison for provider references
pub fn same_provider(a: &Arc<dyn AnchorProvider>, b: &Arc<dyn AnchorProvider>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// One registered provider and its event wiring
pub struct Registration {
    provider: Arc<dyn AnchorProvider>,
    subscription: Option<Subscription>,
}

impl Registration {
    pub fn provider(&self) -> &Arc<dyn AnchorProvider> {
        &self.provider
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Hand the subscription over for teardown, leaving the entry unsubscribed
    pub fn take_subscription(&mut self) -> Option<Subscription> {
        self.subscription.take()
    }
}

/// The set of currently registered providers
#[derive(Default)]
pub struct ProviderRegistry {
    entries: RwLock<Vec<Registration>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Registration>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Registration>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn contains(&self, provider: &Arc<dyn AnchorProvider>) -> bool {
        self.read().iter().any(|r| same_provider(&r.provider, provider))
    }

    /// Whether `provider` is registered with live event wiring; `None` if absent
    pub fn is_subscribed(&self, provider: &Arc<dyn AnchorProvider>) -> Option<bool> {
        self.read()
            .iter()
            .find(|r| same_provider(&r.provider, provider))
            .map(Registration::is_subscribed)
    }

    /// Copy of the registered providers, in registration order
    pub fn snapshot(&self) -> Vec<Arc<dyn AnchorProvider>> {
        self.read().iter().map(|r| Arc::clone(&r.provider)).collect()
    }

    /// Insert `provider`, wiring it with `attach` before any reader can see it
    ///
    /// Returns false, without calling `attach`, when already registered.
    pub fn insert_with<F>(&self, provider: Arc<dyn AnchorProvider>, attach: F) -> bool
    where
        F: FnOnce(&dyn AnchorProvider) -> Subscription,
    {
        let mut entries = self.write();
        if entries.iter().any(|r| same_provider(&r.provider, &provider)) {
            debug!(provider = provider.name(), "ProviderRegistry::insert_with: already registered");
            return false;
        }
        let subscription = attach(provider.as_ref());
        entries.push(Registration {
            provider,
            subscription: Some(subscription),
        });
        debug!(count = entries.len(), "ProviderRegistry::insert_with: inserted");
        true
    }

    /// Unwire `provider` with `unwire`, leaving it registered
    ///
    /// Returns false, without calling `unwire`, when not registered or when
    /// another caller already unwired it. An unwired entry stays visible until
    /// `remove` drops it.
    pub fn unwire_with<F>(&self, provider: &Arc<dyn AnchorProvider>, unwire: F) -> bool
    where
        F: FnOnce(&mut Registration),
    {
        let mut entries = self.write();
        let Some(entry) = entries
            .iter_mut()
            .find(|r| same_provider(&r.provider, provider) && r.is_subscribed())
        else {
            debug!(provider = provider.name(), "ProviderRegistry::unwire_with: not registered or already unwired");
            return false;
        };
        unwire(entry);
        true
    }

    /// Drop `provider` from the registry; false when not registered
    pub fn remove(&self, provider: &Arc<dyn AnchorProvider>) -> bool {
        let mut entries = self.write();
        let Some(index) = entries.iter().position(|r| same_provider(&r.provider, provider)) else {
            debug!(provider = provider.name(), "ProviderRegistry::remove: not registered");
            return false;
        };
        entries.remove(index);
        debug!(count = entries.len(), "ProviderRegistry::remove: removed");
        true
    }

    /// Providers declaring `capability`, in registration order; `None` when none match
    pub fn by_capability(&self, capability: TrackingCapability) -> Option<Vec<Arc<dyn AnchorProvider>>> {
        let found: Vec<_> = self
            .read()
            .iter()
            .filter(|r| r.provider.tracking_capability() == capability)
            .map(|r| Arc::clone(&r.provider))
            .collect();
        debug!(%capability, count = found.len(), "ProviderRegistry::by_capability");
        if found.is_empty() { None } else { Some(found) }
    }
}
