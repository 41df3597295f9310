//! Configuration for the generation pipeline.

use serde::{Deserialize, Serialize};

use mind_map_core::geometry::Bounds;
use mind_map_core::{CoreError, CoreResult};
use mind_map_layout::{LayoutParams, RingLayout};

use crate::error::EngineResult;

/// Pipeline-level tunables.
///
/// The node cap bounds the O(n² × iterations) physics cost per run; raising
/// it changes the documented cost profile, so it is a config value with a
/// deliberate default rather than something derived from the collection
/// size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineParams {
    /// Maximum items that become physics nodes per run (stable prefix).
    pub max_nodes: usize,

    /// Maximum discovered relationships stored per run (stable prefix).
    pub max_connections: usize,

    /// Seed for the provisional-layout jitter. Injectable so tests get
    /// deterministic output.
    pub jitter_seed: u64,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            max_nodes: 20,
            max_connections: 50,
            jitter_seed: 0x6d69_6e64,
        }
    }
}

/// Full configuration for one mind-map instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MindMapConfig {
    pub layout: LayoutParams,
    pub rings: RingLayout,
    pub bounds: Bounds,
    pub pipeline: PipelineParams,
}

impl MindMapConfig {
    /// Load configuration from files and environment.
    ///
    /// Sources, in order:
    /// 1. `config/default.toml` (base settings)
    /// 2. `config/{MIND_MAP_ENV}.toml` (environment-specific)
    /// 3. Environment variables with `MIND_MAP_` prefix
    pub fn load() -> EngineResult<Self> {
        let env = std::env::var("MIND_MAP_ENV").unwrap_or_else(|_| "development".to_string());

        let builder = ::config::Config::builder()
            .add_source(::config::File::with_name("config/default").required(false))
            .add_source(::config::File::with_name(&format!("config/{}", env)).required(false))
            .add_source(::config::Environment::with_prefix("MIND_MAP").separator("__"));

        let config: MindMapConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &std::path::Path) -> EngineResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CoreError::ConfigError(format!(
                "failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        let config: MindMapConfig = toml::from_str(&content)
            .map_err(|e| CoreError::ConfigError(format!("failed to parse config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all numeric ranges.
    pub fn validate(&self) -> CoreResult<()> {
        self.layout.validate()?;
        self.rings.validate()?;
        if self.pipeline.max_nodes == 0 {
            return Err(CoreError::OutOfBounds {
                field: "pipeline.max_nodes".to_string(),
                value: 0.0,
                min: 1.0,
                max: f64::MAX,
            });
        }
        if self.bounds.width() <= 0.0 || self.bounds.height() <= 0.0 {
            return Err(CoreError::ConfigError(format!(
                "bounds must have positive area, got {}x{}",
                self.bounds.width(),
                self.bounds.height()
            )));
        }
        Ok(())
    }
}
