//! Change-tracking seam.
//!
//! The tracker classifies collection change events so the orchestrator can
//! choose between targeted invalidation and a full regeneration.

use serde::{Deserialize, Serialize};

use crate::types::NodeId;

/// A change to the source-item collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChangeEvent {
    /// A single item was captured.
    ItemAdded { id: NodeId },
    /// A single item was deleted.
    ItemDeleted { id: NodeId },
    /// An item's text or tags were edited.
    AnnotationEdited { id: NodeId },
    /// Many items arrived at once (import, sync).
    BulkImport { ids: Vec<NodeId> },
}

/// Classification of a change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeKind {
    NewItem,
    DeletedItem,
    AnnotationEdit,
    BulkImport,
}

/// How urgently the orchestrator should react.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingPriority {
    /// Handle on the next generation; the current graph stays visible.
    Background,
    /// Handle now — typically a deletion that would leave the graph stale.
    Immediate,
}

/// Result of classifying a change event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeImpact {
    pub kind: ChangeKind,
    /// Node ids whose cached layouts are affected.
    pub affected: Vec<NodeId>,
    pub priority: ProcessingPriority,
}

/// Classifies change events into an impact the orchestrator acts on.
///
/// Classification is pure bookkeeping, so this seam is synchronous.
pub trait ChangeTracker: Send + Sync {
    fn classify(&self, event: &ChangeEvent) -> ChangeImpact;
}
