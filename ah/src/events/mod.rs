//! Anchor event plumbing
//!
//! Providers raise events on their own `EventSource`. While a provider is
//! registered, the coordinator's router binds the source to the coordinator's
//! `EventBus`, so every event surfaces verbatim on the coordinator.
//!
//! ```text
//!   Provider A          Provider B          Provider C
//!   EventSource         EventSource         EventSource
//!        │ bound             │ bound             ╳ unbound
//!        └─────────┬─────────┘
//!                  ↓
//!   ┌──────────────────────────────────────┐
//!   │          COORDINATOR EVENT BUS        │
//!   │     (tokio::sync::broadcast channel)  │
//!   └──────────────────────────────────────┘
//!        ↓                ↓
//!   application      EventLogger
//!   subscribers      (.jsonl)
//! ```
//!
//! See [`AnchorEvent`] for the event vocabulary.

mod bus;
mod logger;
mod source;
mod types;

pub use bus::{DEFAULT_CHANNEL_CAPACITY, EventBus, MAX_CHANNEL_CAPACITY};
pub use logger::{EventLogger, read_events, spawn_event_logger};
pub use source::{EventSource, SubscriptionId};
pub use types::{AnchorEvent, EventLogEntry};
