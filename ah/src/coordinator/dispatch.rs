//! Command dispatch over a snapshot of registered providers
//!
//! Three disciplines:
//! - **Broadcast:** every provider is invoked, failures never short-circuit
//! - **First success:** providers are tried in order until one succeeds
//! - **First match:** only the first provider is awaited and its answer returned
//!
//! First match is a deliberate policy for the async operations: the common
//! deployment has one active provider, and callers needing every provider's
//! answer iterate `Coordinator::providers()` themselves.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::{AnchorHandle, AnchorId, AnchorPlacement, AnchorSearch};
use crate::provider::AnchorProvider;

type Providers = [Arc<dyn AnchorProvider>];

/// Reject empty identifier-set searches
///
/// # Panics
///
/// When `search` is an `Ids` or `Args` request with no entries.
pub fn require_identifiers(search: &AnchorSearch) {
    match search {
        AnchorSearch::Ids(ids) => assert!(!ids.is_empty(), "IDs required for anchor search"),
        AnchorSearch::Args(args) => assert!(!args.is_empty(), "anchor args required for anchor search"),
        AnchorSearch::Mode(_) => {}
    }
}

pub fn stop_all(providers: &Providers) {
    debug!(count = providers.len(), "dispatch::stop_all: called");
    for provider in providers {
        provider.stop();
    }
}

/// Await each provider's start in order; failures are logged, never rolled back
pub async fn start_all(providers: &Providers) -> usize {
    debug!(count = providers.len(), "dispatch::start_all: called");
    let mut started = 0;
    for provider in providers {
        match provider.start().await {
            Ok(()) => started += 1,
            Err(e) => warn!(provider = provider.name(), error = %e, "Provider failed to start"),
        }
    }
    started
}

pub fn create_anchor(providers: &Providers, placement: &AnchorPlacement) {
    debug!(count = providers.len(), ?placement, "dispatch::create_anchor: called");
    for provider in providers {
        provider.create_anchor(placement);
    }
}

/// First match: `AnchorId::EMPTY` when there are no providers
pub async fn create_anchor_async(providers: &Providers, placement: &AnchorPlacement) -> AnchorId {
    debug!(count = providers.len(), ?placement, "dispatch::create_anchor_async: called");
    match providers.first() {
        Some(provider) => provider.create_anchor_async(placement).await,
        None => AnchorId::EMPTY,
    }
}

pub fn find_anchors(providers: &Providers, search: &AnchorSearch) {
    require_identifiers(search);
    debug!(count = providers.len(), kind = search.kind(), "dispatch::find_anchors: called");
    for provider in providers {
        provider.find_anchors(search);
    }
}

/// First match: false when there are no providers
pub async fn find_anchors_async(providers: &Providers, search: &AnchorSearch) -> bool {
    require_identifiers(search);
    debug!(count = providers.len(), kind = search.kind(), "dispatch::find_anchors_async: called");
    match providers.first() {
        Some(provider) => provider.find_anchors_async(search).await,
        None => false,
    }
}

/// First success, in registry order
pub fn move_anchor(providers: &Providers, handle: &AnchorHandle, placement: &AnchorPlacement, id: AnchorId) -> bool {
    debug!(count = providers.len(), %handle, %id, "dispatch::move_anchor: called");
    for provider in providers {
        if provider.move_anchor(handle, placement, id) {
            debug!(provider = provider.name(), "dispatch::move_anchor: moved");
            return true;
        }
    }
    false
}

pub fn delete_anchors(providers: &Providers, ids: &[AnchorId]) {
    debug!(count = providers.len(), ids = ids.len(), "dispatch::delete_anchors: called");
    for provider in providers {
        provider.delete_anchors(ids);
    }
}

/// Broadcast with OR aggregation; every provider is asked even after a success
pub fn clear_cache(providers: &Providers) -> bool {
    debug!(count = providers.len(), "dispatch::clear_cache: called");
    let mut any_cleared = false;
    for provider in providers {
        any_cleared |= provider.clear_cache();
    }
    any_cleared
}

/// Broadcast with OR aggregation
pub fn has_anchor(providers: &Providers, handle: &AnchorHandle) -> bool {
    debug!(count = providers.len(), %handle, "dispatch::has_anchor: called");
    let mut found = false;
    for provider in providers {
        found |= provider.has_anchor(handle);
    }
    found
}
