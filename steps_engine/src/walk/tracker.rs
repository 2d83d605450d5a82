use chrono::{DateTime, NaiveDate, Utc};
use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{EntryMemo, Points, UserRef, WalkForm},
    engine_api::errors::{LedgerError, WalkError},
    events::{EventProducers, WalkFinishedEvent},
    traits::WalkStore,
    walk::{
        coefficients::multiplier_for,
        registry::{SessionRegistry, WalkPhase},
        services::{Button, EditOutcome, MessageHandle, MessagingSink, TemperatureService},
        session::ActiveWalk,
        status::render_summary,
        Coordinate,
        Fix,
        WalkConfig,
    },
};

/// A location report for a subject, as delivered by the chat platform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationUpdate {
    pub subject: i64,
    pub lat: f64,
    pub lon: f64,
    /// When the server received the update.
    pub timestamp: DateTime<Utc>,
    /// True for a continuously updating live share, false for a one-off location.
    pub live: bool,
}

impl LocationUpdate {
    pub fn fix(&self) -> Fix {
        Fix::new(Coordinate::new(self.lat, self.lon), self.timestamp)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkSummary {
    pub subject: i64,
    pub form: WalkForm,
    pub steps: i64,
    pub points: Points,
    pub multiplier: i64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LocationOutcome {
    /// The update did not belong to a walk.
    Ignored,
    Started { goal: i64, multiplier: i64, temperature_c: Option<i64> },
    Progress { steps: i64, goal: i64, points: Points, over_speed: bool },
    Finished(WalkSummary),
}

/// Drives walk sessions from form selection to the ledger.
pub struct WalkTracker<B, T, M> {
    db: B,
    temperature: T,
    messenger: M,
    registry: SessionRegistry,
    config: WalkConfig,
    producers: EventProducers,
}

impl<B, T, M> WalkTracker<B, T, M> {
    pub fn new(db: B, temperature: T, messenger: M, config: WalkConfig, producers: EventProducers) -> Self {
        Self { db, temperature, messenger, registry: SessionRegistry::new(), config, producers }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn config(&self) -> &WalkConfig {
        &self.config
    }

    pub fn phase(&self, subject: i64) -> WalkPhase {
        self.registry.phase(subject)
    }

    /// `Idle → AwaitingLiveLocation`. Returns the step goal for the walk.
    pub fn choose_form(&self, subject: i64, form: WalkForm, today: NaiveDate) -> Result<i64, WalkError> {
        self.registry.begin(subject, form, today, self.config.daily_step_cap)
    }

    /// `AwaitingLiveLocation → Idle`, with no ledger effect.
    pub fn cancel(&self, subject: i64) -> Result<(), WalkError> {
        self.registry.cancel(subject)
    }
}

impl<B, T, M> WalkTracker<B, T, M>
where
    B: WalkStore,
    T: TemperatureService,
    M: MessagingSink,
{
    pub async fn location_update(&self, update: LocationUpdate) -> Result<LocationOutcome, WalkError> {
        match self.registry.phase(update.subject) {
            WalkPhase::Idle => {
                trace!("🚶️ Location from subject {} outside of a walk. Ignoring.", update.subject);
                Ok(LocationOutcome::Ignored)
            },
            WalkPhase::AwaitingLiveLocation { session_id, form, day, goal } => {
                if !update.live {
                    return Err(WalkError::NotLiveLocation);
                }
                self.start(update, session_id, form, day, goal).await
            },
            WalkPhase::Active { session_id } => {
                if !update.live {
                    return Ok(LocationOutcome::Ignored);
                }
                self.advance(update, session_id).await
            },
        }
    }

    async fn start(
        &self,
        update: LocationUpdate,
        session_id: u64,
        form: WalkForm,
        day: NaiveDate,
        goal: i64,
    ) -> Result<LocationOutcome, WalkError> {
        let subject = update.subject;
        let temperature_c = self.fetch_temperature(update.lat, update.lon).await;
        let multiplier = multiplier_for(&self.db, form, temperature_c).await;
        let mut walk = ActiveWalk::new(session_id, subject, form, day, goal, multiplier, temperature_c, update.fix());
        walk.message = match self.messenger.send(subject, &walk.status_text(), &[Button::end_walk()]).await {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!("🚶️ Could not send the walk status to subject {subject}: {e}");
                None
            },
        };
        if !self.registry.activate(walk) {
            debug!("🚶️ Session {session_id} for subject {subject} was superseded before it could start");
            return Ok(LocationOutcome::Ignored);
        }
        info!("🚶️ Subject {subject} started a {form} walk. Goal {goal}, multiplier ×{multiplier}");
        Ok(LocationOutcome::Started { goal, multiplier, temperature_c })
    }

    async fn advance(&self, update: LocationUpdate, session_id: u64) -> Result<LocationOutcome, WalkError> {
        let subject = update.subject;
        let fix = update.fix();
        let config = &self.config;
        let applied = self.registry.with_session(subject, session_id, |walk| {
            let outcome = walk.apply(fix, config);
            let refresh = walk.temperature_due(fix.at, config);
            if refresh {
                walk.temperature_checked_at = fix.at;
            }
            (outcome, refresh, walk.form)
        });
        let (outcome, refresh, form) = match applied {
            Some(a) => a,
            None => return Ok(LocationOutcome::Ignored),
        };
        if outcome.update.over_speed {
            debug!("🚶️ Subject {subject} is moving at {:.1} km/h. Steps not counted.", outcome.update.speed_kmh);
        }
        if outcome.goal_reached {
            info!("🚶️ Subject {subject} reached their goal");
            return match self.finish_walk(subject).await? {
                Some(summary) => Ok(LocationOutcome::Finished(summary)),
                None => Ok(LocationOutcome::Ignored),
            };
        }
        if refresh {
            if let Some(t) = self.fetch_temperature(update.lat, update.lon).await {
                let multiplier = multiplier_for(&self.db, form, Some(t)).await;
                self.registry.with_session(subject, session_id, |walk| {
                    walk.temperature_c = Some(t);
                    walk.multiplier = multiplier;
                });
                debug!("🚶️ Temperature for subject {subject} is now {t}°C. Multiplier ×{multiplier}");
            }
        }
        let snapshot = self.registry.with_session(subject, session_id, |walk| {
            (walk.status_text(), walk.message, walk.steps, walk.goal, walk.points(), walk.over_speed)
        });
        let (text, handle, steps, goal, points, over_speed) = match snapshot {
            Some(s) => s,
            // Finished by someone else while we were fetching the temperature.
            None => return Ok(LocationOutcome::Ignored),
        };
        if let Some(handle) = self.show(subject, handle, &text, &[Button::end_walk()]).await {
            self.registry.with_session(subject, session_id, |walk| walk.message = Some(handle));
        }
        Ok(LocationOutcome::Progress { steps, goal, points, over_speed })
    }

    /// `Active → Finished`. Accrues the walk's points and turns the status message into a summary. Returns `None` if
    /// the subject has no active walk, so finishing twice does nothing.
    pub async fn finish_walk(&self, subject: i64) -> Result<Option<WalkSummary>, WalkError> {
        let walk = match self.registry.take_active(subject) {
            Some(w) => w,
            None => return Ok(None),
        };
        let points = walk.points();
        let memo = EntryMemo::new("Walk reward")
            .with_description(format!("Steps: {}, multiplier: ×{}", walk.steps, walk.multiplier));
        if let Err(e) = self.db.record_walk(UserRef::Telegram(subject), walk.steps, points, memo).await {
            error!("🚶️ Could not record the walk for subject {subject}: {e}");
            if matches!(e, LedgerError::DatabaseError(_)) {
                self.registry.restore(walk);
            }
            return Err(e.into());
        }
        self.registry.record_usage(subject, walk.day, walk.steps);
        let text = render_summary(walk.steps, points, walk.multiplier);
        let event = WalkFinishedEvent {
            subject,
            form: walk.form,
            steps: walk.steps,
            points,
            multiplier: walk.multiplier,
            finished_at: Utc::now(),
        };
        self.producers.publish_walk_finished(event).await;
        self.show(subject, walk.message, &text, &[Button::back()]).await;
        info!("🚶️ Subject {subject} finished walking: {} steps, {points}", walk.steps);
        Ok(Some(WalkSummary { subject, form: walk.form, steps: walk.steps, points, multiplier: walk.multiplier, text }))
    }

    /// Edits the message in place, or sends a new one if there is nothing to edit or the edit failed. Returns the
    /// handle of a newly sent message.
    async fn show(&self, subject: i64, handle: Option<MessageHandle>, text: &str, buttons: &[Button]) -> Option<MessageHandle> {
        if let Some(handle) = handle {
            match self.messenger.edit(&handle, text, buttons).await {
                EditOutcome::Edited | EditOutcome::Unchanged => return None,
                EditOutcome::Failed(reason) => {
                    debug!("🚶️ Could not edit message {} for subject {subject}: {reason}", handle.message_id);
                },
            }
        }
        match self.messenger.send(subject, text, buttons).await {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!("🚶️ Could not send a message to subject {subject}: {e}");
                None
            },
        }
    }

    async fn fetch_temperature(&self, lat: f64, lon: f64) -> Option<i64> {
        match tokio::time::timeout(self.config.temperature_timeout, self.temperature.current_temp_c(lat, lon)).await {
            Ok(result) => result,
            Err(_) => {
                warn!("🚶️ Temperature lookup timed out after {:?}", self.config.temperature_timeout);
                None
            },
        }
    }
}
