//! Generation state machine, progress reporting, and run reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current state of the generation state machine.
///
/// `Idle → Generating → (Converged | Cancelled) → Idle`; terminal states
/// remain observable on the progress channel until the next run starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationState {
    /// No generation has run or the last one has been consumed.
    #[default]
    Idle,
    /// A generation pipeline is in flight.
    Generating,
    /// The last generation completed (layout converged or hit its cap).
    Converged,
    /// The last generation was cancelled cooperatively.
    Cancelled,
}

impl GenerationState {
    /// Name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            GenerationState::Idle => "idle",
            GenerationState::Generating => "generating",
            GenerationState::Converged => "converged",
            GenerationState::Cancelled => "cancelled",
        }
    }
}

/// Pipeline stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStage {
    CacheCheck,
    Provisional,
    Discovery,
    Nodes,
    Connections,
    Layout,
    Clustering,
    Persisting,
    Done,
}

impl GenerationStage {
    /// Overall progress fraction reached when this stage completes.
    ///
    /// Discovery = 0–30%, nodes = 30–50%, connections = 50–70%,
    /// layout = 70–90%, clustering = 90–100%. The cache check and the
    /// provisional publish precede the measured pipeline.
    pub fn completed_fraction(&self) -> f32 {
        match self {
            GenerationStage::CacheCheck | GenerationStage::Provisional => 0.0,
            GenerationStage::Discovery => 0.3,
            GenerationStage::Nodes => 0.5,
            GenerationStage::Connections => 0.7,
            GenerationStage::Layout => 0.9,
            GenerationStage::Clustering => 1.0,
            GenerationStage::Persisting | GenerationStage::Done => 1.0,
        }
    }
}

/// One progress observation published on the watch channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationProgress {
    pub state: GenerationState,
    pub stage: GenerationStage,
    /// Overall fraction in [0.0, 1.0].
    pub fraction: f32,
}

impl Default for GenerationProgress {
    fn default() -> Self {
        Self {
            state: GenerationState::Idle,
            stage: GenerationStage::CacheCheck,
            fraction: 0.0,
        }
    }
}

/// Report from a completed (non-cancelled) generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Fingerprint the resulting layout was cached under.
    pub fingerprint: String,
    pub node_count: usize,
    pub connection_count: usize,
    pub cluster_count: usize,
    /// Physics iterations executed (0 on a cache hit).
    pub iterations: usize,
    /// Whether the layout converged before the iteration cap.
    pub converged: bool,
    /// Whether this run was served from the layout cache.
    pub cache_hit: bool,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
}

impl GenerationReport {
    pub fn duration(&self) -> chrono::Duration {
        self.ended_at - self.started_at
    }
}

/// Result of one generation call.
#[derive(Debug, Clone)]
pub enum GenerationOutcome {
    /// The pipeline ran to completion (full run or cache hit).
    Completed(GenerationReport),
    /// The run was cancelled; the last committed graph state remains
    /// visible and nothing was persisted.
    Cancelled,
}

impl GenerationOutcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, GenerationOutcome::Cancelled)
    }

    pub fn report(&self) -> Option<&GenerationReport> {
        match self {
            GenerationOutcome::Completed(report) => Some(report),
            GenerationOutcome::Cancelled => None,
        }
    }
}
