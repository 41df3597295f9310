//! Collection-change intake.
//!
//! The host forwards change events from wherever items live; the tracker
//! classifies them and the orchestrator reacts. Deletions are handled
//! immediately, since a graph showing a deleted item is stale in a way the
//! user notices. Everything else waits for the next generation, which will
//! compute a new fingerprint and regenerate naturally.

use tracing::{debug, info, warn};

use mind_map_core::traits::{ChangeEvent, ChangeImpact, ProcessingPriority};

use crate::error::EngineResult;
use crate::orchestrator::MindMapOrchestrator;

impl MindMapOrchestrator {
    /// React to a collection change event.
    ///
    /// Returns the tracker's classification so the host can schedule a
    /// regeneration for background-priority changes.
    pub async fn apply_change(&self, event: &ChangeEvent) -> EngineResult<ChangeImpact> {
        let impact = self.tracker().classify(event);
        debug!(kind = ?impact.kind, priority = ?impact.priority, affected = impact.affected.len(), "change classified");

        match impact.priority {
            ProcessingPriority::Immediate => {
                let removed = {
                    let mut graph = self.graph_lock().write().await;
                    let mut removed = 0usize;
                    for id in &impact.affected {
                        if graph.remove(id).is_some() {
                            removed += 1;
                        }
                    }
                    if removed > 0 {
                        // Membership changed, so the derived clusters are
                        // stale too.
                        let clusters = mind_map_layout::derive_clusters(&graph);
                        graph.set_clusters(clusters);
                    }
                    removed
                };
                if removed > 0 {
                    self.bump_revision();
                }
                info!(removed, "removed deleted items from the graph");
                if let Err(e) = self.cache().invalidate(&impact.affected).await {
                    warn!(error = %e, "cache invalidation failed; stale entries expire on fingerprint mismatch");
                }
            }
            ProcessingPriority::Background => {
                debug!("deferred to the next generation");
            }
        }
        Ok(impact)
    }
}
