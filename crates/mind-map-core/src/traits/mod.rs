//! Collaborator traits at the system boundary.
//!
//! The orchestrator only ever talks to relationship discovery, the layout
//! cache, and change tracking through these seams, so tests and hosts can
//! inject their own implementations. Stub implementations live in
//! [`crate::stubs`].

mod cache;
mod changes;
mod relationship;

pub use cache::{LayoutCache, StoredLayout, StoredNode};
pub use changes::{ChangeEvent, ChangeImpact, ChangeKind, ChangeTracker, ProcessingPriority};
pub use relationship::{DiscoveredRelationship, RelationshipProvider};
