//! Error types for mind-map-core.
//!
//! This module defines the central error type [`CoreError`] used throughout
//! the mind-map crates, along with the [`CoreResult<T>`] type alias.

use thiserror::Error;
use uuid::Uuid;

/// Top-level error type for mind-map-core operations.
///
/// Every failure mode in this core degrades gracefully at the call site;
/// these variants exist so callers can log precisely and fall back (for
/// example, a cache failure is handled as a cache miss).
#[derive(Debug, Error)]
pub enum CoreError {
    /// A requested node was not found in the graph.
    #[error("Node not found: {id}")]
    NodeNotFound {
        /// Id of the missing node.
        id: Uuid,
    },

    /// A position or velocity component was NaN or infinite.
    ///
    /// Positions must remain finite at all times; callers reject the write
    /// and keep the previous valid state.
    #[error("Non-finite value for '{field}': ({x}, {y})")]
    NonFiniteValue {
        /// Name of the rejected field ("position" or "velocity").
        field: &'static str,
        /// X component as supplied.
        x: f32,
        /// Y component as supplied.
        y: f32,
    },

    /// A numeric field value is outside its valid range.
    /// Used for importance [0.0, 1.0], strength [0.0, 1.0], etc.
    #[error("Field '{field}' value {value} is out of bounds [{min}, {max}]")]
    OutOfBounds {
        /// Name of the field that failed validation.
        field: String,
        /// The invalid value provided.
        value: f64,
        /// Minimum allowed value (inclusive).
        min: f64,
        /// Maximum allowed value (inclusive).
        max: f64,
    },

    /// Layout-cache read or write failed.
    ///
    /// Read failures are downgraded to a cache miss by the orchestrator;
    /// write failures are logged and the run still completes.
    #[error("Cache error: {0}")]
    CacheError(String),

    /// Configuration loading or validation failed.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Underlying I/O failure (file-backed cache).
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result alias for mind-map-core operations.
pub type CoreResult<T> = Result<T, CoreError>;
