//! Tunable parameters for the force simulation.

use serde::{Deserialize, Serialize};

use mind_map_core::{CoreError, CoreResult};

/// Hard upper bound on iterations regardless of node count.
pub const MAX_ITERATION_CAP: usize = 50;

/// Force-simulation tunables.
///
/// The defaults are calibrated for node radii in the 25–40 range on a
/// roughly 1200×800 canvas. `validate()` guards the ranges that would break
/// the simulation (zero damping oscillates forever, negative time runs
/// backwards).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutParams {
    /// Repulsion scale; force is `repulsion_constant / (d² + 1)` inside the
    /// pairwise minimum distance. The `+ 1` denominator term keeps the force
    /// bounded as d → 0.
    pub repulsion_constant: f32,

    /// Attraction scale; force is
    /// `attraction_constant × strength × (d − rest)` beyond rest distance.
    pub attraction_constant: f32,

    /// Rest distance at full strength: `rest = max_attraction_distance × strength`.
    pub max_attraction_distance: f32,

    /// Extra spacing added to the sum of radii for the repulsion threshold.
    pub collision_margin: f32,

    /// Multiplicative velocity decay per iteration, in (0, 1].
    pub damping: f32,

    /// Integration time step.
    pub time_step: f32,

    /// Mean velocity magnitude below which the layout is considered settled.
    pub convergence_threshold: f32,

    /// Hard iteration cap component; the effective cap is
    /// `min(max_iterations, 2 × node_count)`.
    pub max_iterations: usize,

    /// Iterations between cooperative yields to the host scheduler.
    pub yield_interval: usize,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            repulsion_constant: 6000.0,
            attraction_constant: 0.01,
            max_attraction_distance: 200.0,
            collision_margin: 10.0,
            damping: 0.85,
            time_step: 0.1,
            convergence_threshold: 0.5,
            max_iterations: MAX_ITERATION_CAP,
            yield_interval: 5,
        }
    }
}

impl LayoutParams {
    /// Validate parameter ranges.
    pub fn validate(&self) -> CoreResult<()> {
        let checks: [(&str, f64, f64, f64); 5] = [
            ("repulsion_constant", self.repulsion_constant as f64, 0.0, f64::MAX),
            ("attraction_constant", self.attraction_constant as f64, 0.0, f64::MAX),
            ("damping", self.damping as f64, f64::MIN_POSITIVE, 1.0),
            ("time_step", self.time_step as f64, f64::MIN_POSITIVE, 10.0),
            ("convergence_threshold", self.convergence_threshold as f64, 0.0, f64::MAX),
        ];
        for (field, value, min, max) in checks {
            if !value.is_finite() || value < min || value > max {
                return Err(CoreError::OutOfBounds {
                    field: field.to_string(),
                    value,
                    min,
                    max,
                });
            }
        }
        if self.yield_interval == 0 {
            return Err(CoreError::OutOfBounds {
                field: "yield_interval".to_string(),
                value: 0.0,
                min: 1.0,
                max: f64::MAX,
            });
        }
        Ok(())
    }

    /// Effective iteration cap for a node count.
    pub fn iteration_cap(&self, node_count: usize) -> usize {
        self.max_iterations.min(2 * node_count)
    }
}
