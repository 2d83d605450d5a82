use chrono::{DateTime, NaiveDate, Utc};

use crate::{
    db_types::{Points, WalkForm},
    walk::{
        services::MessageHandle,
        status::{render_status, StatusView},
        step_counter::{evaluate, StepUpdate},
        Fix,
        WalkConfig,
    },
};

/// An in-progress walk.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveWalk {
    /// Distinguishes this walk from any later walk by the same subject, so that work resumed after an `await` can
    /// tell whether the session it started with is still current.
    pub session_id: u64,
    pub subject: i64,
    pub form: WalkForm,
    /// The calendar day the walk's allowance was taken from.
    pub day: NaiveDate,
    pub goal: i64,
    pub steps: i64,
    pub multiplier: i64,
    pub temperature_c: Option<i64>,
    pub temperature_checked_at: DateTime<Utc>,
    pub last_fix: Fix,
    pub last_speed_kmh: Option<f64>,
    pub over_speed: bool,
    pub message: Option<MessageHandle>,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    pub update: StepUpdate,
    pub goal_reached: bool,
}

impl ActiveWalk {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        session_id: u64,
        subject: i64,
        form: WalkForm,
        day: NaiveDate,
        goal: i64,
        multiplier: i64,
        temperature_c: Option<i64>,
        start: Fix,
    ) -> Self {
        Self {
            session_id,
            subject,
            form,
            day,
            goal,
            steps: 0,
            multiplier,
            temperature_c,
            temperature_checked_at: start.at,
            last_fix: start,
            last_speed_kmh: None,
            over_speed: false,
            message: None,
            started_at: start.at,
        }
    }

    /// Applies a location update. Steps only ever increase, and never beyond the goal.
    pub fn apply(&mut self, fix: Fix, config: &WalkConfig) -> StepOutcome {
        let update = evaluate(&self.last_fix, &fix, config);
        self.over_speed = update.over_speed;
        self.last_speed_kmh = Some(update.speed_kmh);
        if !update.over_speed {
            self.steps += update.steps;
        }
        let goal_reached = self.steps >= self.goal;
        if goal_reached {
            self.steps = self.goal;
        }
        self.last_fix = fix;
        StepOutcome { update, goal_reached }
    }

    pub fn points(&self) -> Points {
        Points::from(self.steps) * self.multiplier
    }

    pub fn temperature_due(&self, now: DateTime<Utc>, config: &WalkConfig) -> bool {
        (now - self.temperature_checked_at).to_std().map(|age| age >= config.temperature_refresh).unwrap_or(false)
    }

    pub fn status_text(&self) -> String {
        render_status(&StatusView {
            temperature_c: self.temperature_c,
            steps: self.steps,
            goal: self.goal,
            points: self.points(),
            multiplier: self.multiplier,
            speed_kmh: self.last_speed_kmh,
            over_speed: self.over_speed,
        })
    }
}
