//! Mind-Map Engine Library
//!
//! The generation pipeline for one logical mind map:
//! relationship intake → node placement → connection creation → iterative
//! force layout → clustering → cache persistence.
//!
//! # Concurrency model
//!
//! [`MindMapOrchestrator`] exclusively owns the graph for its process
//! lifetime; interactive edits (drag, selection) and the physics loop are
//! serialized through its single `RwLock`-guarded node table. Generation is
//! single-flight: starting a new run cooperatively cancels any in-flight
//! one. The physics loop yields to the scheduler periodically so a
//! generation never blocks the interactive surface.
//!
//! All collaborators are injected at construction — there is no global
//! shared instance.

pub mod changes;
pub mod config;
pub mod error;
pub mod interaction;
pub mod orchestrator;
pub mod progress;

pub use config::{MindMapConfig, PipelineParams};
pub use error::{EngineError, EngineResult};
pub use interaction::Selection;
pub use orchestrator::{importance_for, MindMapOrchestrator};
pub use progress::{GenerationOutcome, GenerationProgress, GenerationReport, GenerationStage, GenerationState};
