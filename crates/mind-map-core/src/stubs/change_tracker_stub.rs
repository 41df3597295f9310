//! Basic change-event classification.

use crate::traits::{ChangeEvent, ChangeImpact, ChangeKind, ChangeTracker, ProcessingPriority};

/// Straightforward change tracker.
///
/// Deletions are classified as [`ProcessingPriority::Immediate`]: the node
/// must leave the graph now or connections point at a ghost. Everything else
/// is background work — the fingerprint changes, so the next generation
/// misses the cache and rebuilds naturally.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicChangeTracker;

impl BasicChangeTracker {
    pub fn new() -> Self {
        Self
    }
}

impl ChangeTracker for BasicChangeTracker {
    fn classify(&self, event: &ChangeEvent) -> ChangeImpact {
        match event {
            ChangeEvent::ItemAdded { id } => ChangeImpact {
                kind: ChangeKind::NewItem,
                affected: vec![*id],
                priority: ProcessingPriority::Background,
            },
            ChangeEvent::ItemDeleted { id } => ChangeImpact {
                kind: ChangeKind::DeletedItem,
                affected: vec![*id],
                priority: ProcessingPriority::Immediate,
            },
            ChangeEvent::AnnotationEdited { id } => ChangeImpact {
                kind: ChangeKind::AnnotationEdit,
                affected: vec![*id],
                priority: ProcessingPriority::Background,
            },
            ChangeEvent::BulkImport { ids } => ChangeImpact {
                kind: ChangeKind::BulkImport,
                affected: ids.clone(),
                priority: ProcessingPriority::Background,
            },
        }
    }
}
