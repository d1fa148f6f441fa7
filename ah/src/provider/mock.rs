//! Recording provider for coordinator tests

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use super::error::ProviderError;
use super::traits::AnchorProvider;
use crate::domain::{AnchorHandle, AnchorId, AnchorPlacement, AnchorSearch, TrackingCapability};
use crate::events::EventSource;

/// Provider counting every call and returning scripted results
pub(crate) struct RecordingProvider {
    name: String,
    capability: TrackingCapability,
    events: EventSource,
    running: AtomicBool,
    pub fail_start: bool,
    pub move_result: bool,
    pub clear_result: bool,
    pub find_result: bool,
    pub has_result: bool,
    pub created_id: AnchorId,
    pub starts: AtomicUsize,
    pub stops: AtomicUsize,
    pub creates: AtomicUsize,
    pub creates_async: AtomicUsize,
    pub finds: AtomicUsize,
    pub finds_async: AtomicUsize,
    pub moves: AtomicUsize,
    pub deletes: AtomicUsize,
    pub clears: AtomicUsize,
    pub last_search: Mutex<Option<AnchorSearch>>,
}

impl RecordingProvider {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            capability: TrackingCapability::CloudAnchor,
            events: EventSource::new(),
            running: AtomicBool::new(false),
            fail_start: false,
            move_result: false,
            clear_result: false,
            find_result: true,
            has_result: false,
            created_id: AnchorId::new(),
            starts: AtomicUsize::new(0),
            stops: AtomicUsize::new(0),
            creates: AtomicUsize::new(0),
            creates_async: AtomicUsize::new(0),
            finds: AtomicUsize::new(0),
            finds_async: AtomicUsize::new(0),
            moves: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
            clears: AtomicUsize::new(0),
            last_search: Mutex::new(None),
        }
    }

    pub fn with_capability(mut self, capability: TrackingCapability) -> Self {
        self.capability = capability;
        self
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnchorProvider for RecordingProvider {
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
        self.starts.fetch_add(1, Ordering::SeqCst);
        if self.fail_start {
            self.events.error("start failed");
            return Err(ProviderError::StartFailed {
                provider: self.name.clone(),
                reason: "scripted failure".to_string(),
            });
        }
        self.running.store(true, Ordering::SeqCst);
        self.events.session_started();
        Ok(())
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
        self.running.store(false, Ordering::SeqCst);
        self.events.session_ended();
    }

    fn create_anchor(&self, _placement: &AnchorPlacement) {
        self.creates.fetch_add(1, Ordering::SeqCst);
    }

    async fn create_anchor_async(&self, _placement: &AnchorPlacement) -> AnchorId {
        self.creates_async.fetch_add(1, Ordering::SeqCst);
        self.created_id
    }

    fn find_anchors(&self, search: &AnchorSearch) {
        self.finds.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_search.lock() {
            *last = Some(search.clone());
        }
    }

    async fn find_anchors_async(&self, _search: &AnchorSearch) -> bool {
        self.finds_async.fetch_add(1, Ordering::SeqCst);
        self.find_result
    }

    fn has_anchor(&self, _handle: &AnchorHandle) -> bool {
        self.has_result
    }

    fn move_anchor(&self, _handle: &AnchorHandle, _placement: &AnchorPlacement, _id: AnchorId) -> bool {
        self.moves.fetch_add(1, Ordering::SeqCst);
        self.move_result
    }

    fn delete_anchors(&self, _ids: &[AnchorId]) {
        self.deletes.fetch_add(1, Ordering::SeqCst);
    }

    fn clear_cache(&self) -> bool {
        self.clears.fetch_add(1, Ordering::SeqCst);
        self.clear_result
    }
}
