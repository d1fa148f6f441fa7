//! Domain types for anchor persistence
//!
//! Value types shared by providers and the coordinator: identifiers,
//! placements, search requests and capability tags.

mod capability;
mod id;
mod placement;
mod search;

pub use capability::{AutoStart, TrackingCapability};
pub use id::{AnchorHandle, AnchorId};
pub use placement::{AnchorPlacement, Quat, TimeToLive, Vec3};
pub use search::{AnchorArgs, AnchorSearch, SearchMode};
