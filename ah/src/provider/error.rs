//! Provider error types

use thiserror::Error;

/// Errors a provider reports from its start operation
///
/// Anchor operations report failures through events, never through this type.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider} does not support {operation}")]
    Unsupported { provider: String, operation: &'static str },

    #[error("{provider} is not running")]
    NotRunning { provider: String },

    #[error("{provider} failed to start: {reason}")]
    StartFailed { provider: String, reason: String },
}

impl ProviderError {
    pub fn is_unsupported(&self) -> bool {
        matches!(self, ProviderError::Unsupported { .. })
    }
}
