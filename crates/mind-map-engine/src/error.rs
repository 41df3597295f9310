//! Error types for mind-map-engine.

use thiserror::Error;

use mind_map_core::CoreError;

/// Top-level error type for orchestrator operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Error from the core data model or a collaborator.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Configuration loading failed.
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),
}

/// Result alias for orchestrator operations.
pub type EngineResult<T> = Result<T, EngineError>;
