//! Anchor persistence providers
//!
//! A provider wraps one vendor backend (cloud anchors, image tracking, ...).
//! The coordinator only talks to providers through [`AnchorProvider`].

mod error;
mod local;
#[cfg(test)]
pub(crate) mod mock;
mod traits;
mod unsupported;

pub use error::ProviderError;
pub use local::LocalAnchorProvider;
pub use traits::AnchorProvider;
pub use unsupported::UnsupportedProvider;
