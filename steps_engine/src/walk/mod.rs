//! # Walk tracking
//!
//! A walk moves through `Idle → AwaitingLiveLocation → Active → Finished`:
//!
//! * choosing a walk form opens a session with today's remaining step allowance as its goal;
//! * the first *live* location share activates it, fetching the temperature and fixing the multiplier;
//! * every further live update is speed-gated and converted into steps;
//! * reaching the goal, or an explicit request, finishes the walk and accrues `steps × multiplier` points.
//!
//! Sessions live only in memory, in a [`SessionRegistry`] owned by the [`WalkTracker`].
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub mod coefficients;
pub mod geo;
pub mod registry;
pub mod services;
pub mod session;
pub mod status;
pub mod step_counter;
pub mod tracker;

pub use geo::{Coordinate, Fix};
pub use registry::{SessionRegistry, WalkPhase};
pub use services::{Button, EditOutcome, MessageHandle, MessagingError, MessagingSink, TemperatureService};
pub use session::{ActiveWalk, StepOutcome};
pub use tracker::{LocationOutcome, LocationUpdate, WalkSummary, WalkTracker};

/// Tuning parameters for step counting. The defaults are the production values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkConfig {
    /// Length of a single step, in metres.
    pub step_length_m: f64,
    /// Displacements shorter than this are GPS jitter and yield no steps.
    pub min_displacement_m: f64,
    /// Displacements longer than this yield no steps.
    pub max_displacement_m: f64,
    /// Updates faster than this are flagged as over-speed and ignored.
    pub max_speed_kmh: f64,
    /// The number of steps that can be rewarded per subject per calendar day.
    pub daily_step_cap: i64,
    pub temperature_refresh: Duration,
    pub temperature_timeout: Duration,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            step_length_m: 0.75,
            min_displacement_m: 5.5,
            max_displacement_m: 50.0,
            max_speed_kmh: 8.0,
            daily_step_cap: 3000,
            temperature_refresh: Duration::from_secs(180),
            temperature_timeout: Duration::from_secs(5),
        }
    }
}
