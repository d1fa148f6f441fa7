//! Provider stub with no capabilities

use crate::events::EventSource;

use super::traits::AnchorProvider;

/// A provider that supports nothing
///
/// Every operation is a well-defined failure: errors are raised on its event
/// source and failure values are returned.
#[derive(Debug)]
pub struct UnsupportedProvider {
    name: String,
    events: EventSource,
}

impl UnsupportedProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            events: EventSource::new(),
        }
    }
}

impl Default for UnsupportedProvider {
    fn default() -> Self {
        Self::new("unsupported")
    }
}

impl AnchorProvider for UnsupportedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn events(&self) -> &EventSource {
        &self.events
    }
}
