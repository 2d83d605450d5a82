//! The process-wide registry of walk sessions.
//!
//! All state lives behind one mutex that is never held across an `.await`. Callers that suspend between reading and
//! writing a session must go through [`SessionRegistry::with_session`], which re-checks that the session they started
//! with is still the current one.
use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use chrono::NaiveDate;
use log::*;

use crate::{
    db_types::WalkForm,
    engine_api::errors::WalkError,
    walk::session::ActiveWalk,
};

#[derive(Debug, Clone, PartialEq)]
enum Slot {
    Awaiting { session_id: u64, form: WalkForm, day: NaiveDate, goal: i64 },
    Active(ActiveWalk),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DailyUsage {
    day: NaiveDate,
    used: i64,
}

#[derive(Debug, Default)]
struct RegistryState {
    sessions: HashMap<i64, Slot>,
    daily: HashMap<i64, DailyUsage>,
    next_session_id: u64,
}

impl RegistryState {
    fn used_on(&self, subject: i64, day: NaiveDate) -> i64 {
        match self.daily.get(&subject) {
            Some(usage) if usage.day == day => usage.used,
            _ => 0,
        }
    }
}

/// A subject's position in the walk lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkPhase {
    Idle,
    AwaitingLiveLocation { session_id: u64, form: WalkForm, day: NaiveDate, goal: i64 },
    Active { session_id: u64 },
}

#[derive(Debug, Default)]
pub struct SessionRegistry {
    state: Mutex<RegistryState>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        // No code path panics while holding the lock, but a poisoned registry is still usable.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn phase(&self, subject: i64) -> WalkPhase {
        match self.lock().sessions.get(&subject) {
            None => WalkPhase::Idle,
            Some(Slot::Awaiting { session_id, form, day, goal }) => {
                WalkPhase::AwaitingLiveLocation { session_id: *session_id, form: *form, day: *day, goal: *goal }
            },
            Some(Slot::Active(walk)) => WalkPhase::Active { session_id: walk.session_id },
        }
    }

    /// Opens a session for `subject`, replacing one that is still waiting for a location. The goal is whatever is left
    /// of `daily_cap` on `day`.
    pub fn begin(&self, subject: i64, form: WalkForm, day: NaiveDate, daily_cap: i64) -> Result<i64, WalkError> {
        let mut state = self.lock();
        if let Some(Slot::Active(_)) = state.sessions.get(&subject) {
            return Err(WalkError::InvalidState("a walk is already in progress".into()));
        }
        let goal = (daily_cap - state.used_on(subject, day)).max(0);
        if goal == 0 {
            return Err(WalkError::DailyLimitReached);
        }
        state.next_session_id += 1;
        let session_id = state.next_session_id;
        state.sessions.insert(subject, Slot::Awaiting { session_id, form, day, goal });
        debug!("🚶️ Subject {subject} chose a {form} walk. Goal: {goal} steps");
        Ok(goal)
    }

    /// Abandons a session that has not started yet.
    pub fn cancel(&self, subject: i64) -> Result<(), WalkError> {
        let mut state = self.lock();
        match state.sessions.get(&subject) {
            Some(Slot::Awaiting { .. }) => {
                state.sessions.remove(&subject);
                debug!("🚶️ Subject {subject} cancelled their walk before it started");
                Ok(())
            },
            Some(Slot::Active(_)) => Err(WalkError::InvalidState("the walk has already started".into())),
            None => Err(WalkError::InvalidState("no walk has been chosen".into())),
        }
    }

    /// Promotes the awaiting session `walk.session_id` to active. Fails if that session is no longer awaiting, e.g.
    /// because it was cancelled while the temperature was being fetched.
    pub fn activate(&self, walk: ActiveWalk) -> bool {
        let mut state = self.lock();
        match state.sessions.get(&walk.subject) {
            Some(Slot::Awaiting { session_id, .. }) if *session_id == walk.session_id => {
                debug!("🚶️ Subject {} started walking (session {})", walk.subject, walk.session_id);
                state.sessions.insert(walk.subject, Slot::Active(walk));
                true
            },
            _ => false,
        }
    }

    /// Runs `f` against the subject's active walk, whichever session it is.
    pub fn with_active<R>(&self, subject: i64, f: impl FnOnce(&mut ActiveWalk) -> R) -> Option<R> {
        match self.lock().sessions.get_mut(&subject) {
            Some(Slot::Active(walk)) => Some(f(walk)),
            _ => None,
        }
    }

    /// Runs `f` against the subject's active walk only if it is still session `session_id`.
    pub fn with_session<R>(&self, subject: i64, session_id: u64, f: impl FnOnce(&mut ActiveWalk) -> R) -> Option<R> {
        match self.lock().sessions.get_mut(&subject) {
            Some(Slot::Active(walk)) if walk.session_id == session_id => Some(f(walk)),
            _ => None,
        }
    }

    /// Removes and returns the subject's active walk. Only one caller can ever take a given walk.
    pub fn take_active(&self, subject: i64) -> Option<ActiveWalk> {
        let mut state = self.lock();
        match state.sessions.remove(&subject) {
            Some(Slot::Active(walk)) => Some(walk),
            Some(other) => {
                state.sessions.insert(subject, other);
                None
            },
            None => None,
        }
    }

    /// Puts back a walk that could not be finished. Does nothing if the subject has since started something else.
    pub fn restore(&self, walk: ActiveWalk) {
        let mut state = self.lock();
        let subject = walk.subject;
        if state.sessions.contains_key(&subject) {
            warn!("🚶️ Could not restore session {} for subject {subject}: the slot is taken", walk.session_id);
            return;
        }
        state.sessions.insert(subject, Slot::Active(walk));
    }

    pub fn record_usage(&self, subject: i64, day: NaiveDate, steps: i64) {
        let mut state = self.lock();
        let used = state.used_on(subject, day) + steps;
        state.daily.insert(subject, DailyUsage { day, used });
        trace!("🚶️ Subject {subject} has used {used} steps on {day}");
    }

    pub fn used_on(&self, subject: i64, day: NaiveDate) -> i64 {
        self.lock().used_on(subject, day)
    }

    pub fn active_sessions(&self) -> usize {
        self.lock().sessions.values().filter(|s| matches!(s, Slot::Active(_))).count()
    }
}
