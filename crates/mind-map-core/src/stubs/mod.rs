//! Stub implementations of the collaborator traits.
//!
//! These keep the pipeline runnable end-to-end without an external ML
//! collaborator or host storage: an in-memory and a JSON-file layout cache,
//! a deterministic heuristic relationship provider, and a basic change
//! tracker. Tests and demos inject these; hosts replace them.

mod cache_stub;
mod change_tracker_stub;
mod relationship_stub;

pub use cache_stub::{FileLayoutCache, InMemoryLayoutCache};
pub use change_tracker_stub::BasicChangeTracker;
pub use relationship_stub::HeuristicRelationshipProvider;
