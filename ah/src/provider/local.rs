//! In-memory anchor provider
//!
//! Keeps anchors in process memory and answers every operation through its
//! event source the way a vendor backend would. Used by the `ah` CLI and as a
//! reference implementation of the provider contract.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};

use super::error::ProviderError;
use super::traits::AnchorProvider;
use crate::domain::{
    AnchorArgs, AnchorHandle, AnchorId, AnchorPlacement, AnchorSearch, SearchMode, TrackingCapability,
};
use crate::events::EventSource;
use crate::image::{ImageTrackingState, TrackedImage};

/// A stored anchor
#[derive(Debug, Clone)]
struct StoredAnchor {
    placement: AnchorPlacement,
    handle: AnchorHandle,
}

#[derive(Debug, Default)]
struct LocalState {
    /// Anchors persisted in the "backend"
    anchors: HashMap<AnchorId, StoredAnchor>,
    /// Anchors located during this session (the cache `clear_cache` drops)
    located: HashMap<AnchorId, AnchorHandle>,
    /// Reference images registered through `AnchorSearch::Args`
    images: HashMap<AnchorId, TrackedImage>,
    image_state: ImageTrackingState,
}

/// Provider keeping anchors in process memory
#[derive(Debug)]
pub struct LocalAnchorProvider {
    name: String,
    capability: TrackingCapability,
    events: EventSource,
    running: AtomicBool,
    next_handle: AtomicU64,
    state: Mutex<LocalState>,
}

impl LocalAnchorProvider {
    pub fn new(name: impl Into<String>, capability: TrackingCapability) -> Self {
        let name = name.into();
        debug!(%name, %capability, "LocalAnchorProvider::new: called");
        Self {
            name,
            capability,
            events: EventSource::new(),
            running: AtomicBool::new(false),
            next_handle: AtomicU64::new(1),
            state: Mutex::new(LocalState::default()),
        }
    }

    /// Cloud-anchor flavoured provider
    pub fn cloud(name: impl Into<String>) -> Self {
        Self::new(name, TrackingCapability::CloudAnchor)
    }

    /// Image-tracking flavoured provider
    pub fn image_tracking(name: impl Into<String>) -> Self {
        Self::new(name, TrackingCapability::ImageTracking)
    }

    fn state(&self) -> MutexGuard<'_, LocalState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of anchors currently stored
    pub fn anchor_count(&self) -> usize {
        self.state().anchors.len()
    }

    /// Placement of a stored anchor
    pub fn placement(&self, id: AnchorId) -> Option<AnchorPlacement> {
        self.state().anchors.get(&id).map(|a| a.placement)
    }

    /// Number of anchors located since the last cache clear
    pub fn cached_count(&self) -> usize {
        self.state().located.len()
    }

    pub fn image_state(&self) -> ImageTrackingState {
        self.state().image_state
    }

    pub fn tracked_images(&self) -> Vec<TrackedImage> {
        self.state().images.values().cloned().collect()
    }

    fn allocate_handle(&self) -> AnchorHandle {
        AnchorHandle::new(self.next_handle.fetch_add(1, Ordering::Relaxed))
    }

    /// Raise the not-running error; true when the caller must bail out
    fn reject_if_stopped(&self, operation: &str) -> bool {
        if self.is_running() {
            return false;
        }
        debug!(provider = %self.name, %operation, "LocalAnchorProvider: rejected, not running");
        let reason = ProviderError::NotRunning {
            provider: self.name.clone(),
        };
        self.events.error(&format!("{}, cannot {}", reason, operation));
        true
    }

    fn create(&self, placement: &AnchorPlacement) -> AnchorId {
        if self.reject_if_stopped("create anchor") {
            self.events.create_failed();
            return AnchorId::EMPTY;
        }

        self.events.create_started();

        if placement.time_to_live.is_expired_at(Utc::now()) {
            self.events.status_message("time to live already elapsed");
            self.events.create_failed();
            return AnchorId::EMPTY;
        }

        let id = AnchorId::new();
        let handle = self.allocate_handle();
        {
            let mut state = self.state();
            state.anchors.insert(
                id,
                StoredAnchor {
                    placement: *placement,
                    handle,
                },
            );
            state.located.insert(id, handle);
        }
        debug!(provider = %self.name, %id, %handle, "LocalAnchorProvider: anchor created");
        self.events.create_succeeded(id, handle);
        id
    }

    fn find(&self, search: &AnchorSearch) -> bool {
        if self.reject_if_stopped("find anchors") {
            return false;
        }

        self.events.find_started();

        let targets = match search {
            AnchorSearch::Ids(ids) => ids.clone(),
            AnchorSearch::Args(args) => self.register_images(args),
            AnchorSearch::Mode(SearchMode::Nearby) => self.state().anchors.keys().copied().collect(),
        };

        for id in targets {
            self.locate(id);
        }
        true
    }

    /// Register reference images for image-tracking searches, returning the ids to locate
    fn register_images(&self, args: &[AnchorArgs]) -> Vec<AnchorId> {
        if self.capability != TrackingCapability::ImageTracking {
            return args.iter().map(|a| a.id).collect();
        }

        self.state().image_state = ImageTrackingState::AddingImages;
        let mut targets = Vec::with_capacity(args.len());
        let mut rejected = false;
        for arg in args {
            match TrackedImage::from_args(arg) {
                Some(mut image) => {
                    image.reference_id = arg.id;
                    debug!(provider = %self.name, id = %arg.id, source = ?image.source(), "LocalAnchorProvider: tracking image");
                    self.state().images.insert(arg.id, image);
                    targets.push(arg.id);
                }
                None => {
                    rejected = true;
                    self.events
                        .anchor_located_error(arg.id, "image payload or source url required");
                }
            }
        }
        self.state().image_state = if rejected {
            ImageTrackingState::Error
        } else {
            ImageTrackingState::Done
        };
        targets
    }

    fn locate(&self, id: AnchorId) {
        let now = Utc::now();
        let outcome = {
            let mut state = self.state();
            match state.anchors.get(&id).cloned() {
                Some(anchor) if anchor.placement.time_to_live.is_expired_at(now) => {
                    state.anchors.remove(&id);
                    state.located.remove(&id);
                    Err("anchor expired")
                }
                Some(anchor) => {
                    state.located.insert(id, anchor.handle);
                    Ok(anchor.handle)
                }
                None => Err("anchor not found"),
            }
        };

        match outcome {
            Ok(handle) => self.events.anchor_located(id, handle),
            Err(message) => self.events.anchor_located_error(id, message),
        }
    }
}

#[async_trait]
impl AnchorProvider for LocalAnchorProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn events(&self) -> &EventSource {
        &self.events
    }

    fn tracking_capability(&self) -> TrackingCapability {
        self.capability
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    async fn start(&self) -> Result<(), ProviderError> {
        debug!(provider = %self.name, "LocalAnchorProvider::start: called");
        if self.running.swap(true, Ordering::SeqCst) {
            debug!(provider = %self.name, "LocalAnchorProvider::start: already running");
            return Ok(());
        }
        info!(provider = %self.name, capability = %self.capability, "Local anchor session started");
        self.events.session_initialized();
        self.events.session_started();
        Ok(())
    }

    fn stop(&self) {
        debug!(provider = %self.name, "LocalAnchorProvider::stop: called");
        if self.running.swap(false, Ordering::SeqCst) {
            info!(provider = %self.name, "Local anchor session ended");
            self.events.session_ended();
        }
    }

    fn create_anchor(&self, placement: &AnchorPlacement) {
        debug!(provider = %self.name, ?placement, "LocalAnchorProvider::create_anchor: called");
        self.create(placement);
    }

    async fn create_anchor_async(&self, placement: &AnchorPlacement) -> AnchorId {
        debug!(provider = %self.name, ?placement, "LocalAnchorProvider::create_anchor_async: called");
        self.create(placement)
    }

    fn find_anchors(&self, search: &AnchorSearch) {
        debug!(provider = %self.name, kind = search.kind(), "LocalAnchorProvider::find_anchors: called");
        self.find(search);
    }

    async fn find_anchors_async(&self, search: &AnchorSearch) -> bool {
        debug!(provider = %self.name, kind = search.kind(), "LocalAnchorProvider::find_anchors_async: called");
        self.find(search)
    }

    fn has_anchor(&self, handle: &AnchorHandle) -> bool {
        self.state().located.values().any(|h| h == handle)
    }

    fn move_anchor(&self, handle: &AnchorHandle, placement: &AnchorPlacement, id: AnchorId) -> bool {
        debug!(provider = %self.name, %handle, %id, "LocalAnchorProvider::move_anchor: called");
        if !self.is_running() {
            return false;
        }
        let moved = {
            let mut state = self.state();
            match state.anchors.get_mut(&id) {
                Some(anchor) if anchor.handle == *handle => {
                    anchor.placement = *placement;
                    true
                }
                _ => false,
            }
        };
        if moved {
            self.events.anchor_updated(id, *handle);
        }
        moved
    }

    fn delete_anchors(&self, ids: &[AnchorId]) {
        debug!(provider = %self.name, count = ids.len(), "LocalAnchorProvider::delete_anchors: called");
        if self.reject_if_stopped("delete anchors") {
            return;
        }
        for id in ids {
            let removed = {
                let mut state = self.state();
                state.located.remove(id);
                state.images.remove(id);
                state.anchors.remove(id).is_some()
            };
            if removed {
                self.events.anchor_deleted(*id);
            }
        }
    }

    fn clear_cache(&self) -> bool {
        debug!(provider = %self.name, "LocalAnchorProvider::clear_cache: called");
        if !self.is_running() {
            return false;
        }
        self.state().located.clear();
        true
    }
}
