//! AnchorHub - spatial anchor provider coordinator
//!
//! AnchorHub fans anchor operations out to a set of pluggable persistence
//! providers and merges their lifecycle events into a single stream.
//!
//! # Core Concepts
//!
//! - **Providers**: anything implementing [`provider::AnchorProvider`]; every
//!   operation has a graceful "unsupported" default
//! - **Registry**: providers are kept in registration order, each at most once
//! - **Event relay**: a registered provider's events surface verbatim on the
//!   coordinator until it is deregistered
//! - **Dispatch**: broadcast for most operations, first-success for moves,
//!   first-provider for the async calls
//!
//! # Modules
//!
//! - [`coordinator`] - Registry, router, dispatcher and the `Coordinator` facade
//! - [`provider`] - Provider contract and the in-process providers
//! - [`events`] - Event vocabulary, event bus and JSONL event log
//! - [`domain`] - Anchor identifiers, placements and searches
//! - [`image`] - Reference images for image-tracking providers
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod coordinator;
pub mod domain;
pub mod events;
pub mod image;
pub mod provider;

pub use config::Config;
pub use coordinator::{Coordinator, CoordinatorConfig, CoordinatorState};
pub use domain::{
    AnchorArgs, AnchorHandle, AnchorId, AnchorPlacement, AnchorSearch, AutoStart, Quat, SearchMode, TimeToLive,
    TrackingCapability, Vec3,
};
pub use events::{AnchorEvent, EventBus, EventSource};
pub use provider::{AnchorProvider, LocalAnchorProvider, ProviderError, UnsupportedProvider};
