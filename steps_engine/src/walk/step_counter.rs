//! Converting pairs of location fixes into steps.
use serde::{Deserialize, Serialize};

use crate::walk::{Fix, WalkConfig};

/// What one location update contributes to a walk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepUpdate {
    pub distance_m: f64,
    /// Zero when no time has elapsed between fixes.
    pub speed_kmh: f64,
    pub over_speed: bool,
    pub steps: i64,
}

/// Steps for a displacement. Displacements outside the inclusive `[min, max]` band yield nothing.
pub fn steps_for_displacement(distance_m: f64, config: &WalkConfig) -> i64 {
    if distance_m >= config.min_displacement_m && distance_m <= config.max_displacement_m {
        (distance_m / config.step_length_m).floor() as i64
    } else {
        0
    }
}

/// Evaluates the movement from `prev` to `curr`. A fix that arrives no later than its predecessor cannot be given a
/// speed, and is treated as over-speed.
pub fn evaluate(prev: &Fix, curr: &Fix, config: &WalkConfig) -> StepUpdate {
    let distance_m = prev.coord.distance_to(&curr.coord);
    let elapsed = (curr.at - prev.at).num_milliseconds() as f64 / 1000.0;
    if elapsed <= 0.0 {
        return StepUpdate { distance_m, speed_kmh: 0.0, over_speed: true, steps: 0 };
    }
    let speed_kmh = distance_m / elapsed * 3.6;
    let over_speed = speed_kmh > config.max_speed_kmh;
    let steps = if over_speed { 0 } else { steps_for_displacement(distance_m, config) };
    StepUpdate { distance_m, speed_kmh, over_speed, steps }
}
