//! Coordinator for anchor persistence providers
//!
//! The Coordinator composes four parts:
//! - **Registry:** the ordered set of active providers
//! - **Router:** binds each registered provider's events to one bus
//! - **Dispatcher:** broadcast, first-success and first-match fan-out
//! - **Facade:** the `Coordinator` type callers use

mod config;
mod core;
mod dispatch;
mod registry;
mod router;

pub use config::CoordinatorConfig;
pub use core::{Coordinator, CoordinatorState};
pub use registry::{ProviderRegistry, Registration, same_provider};
pub use router::{EventRouter, Subscription};
