//! # Autosave Scheduler
//!
//! Decides when a dirty document is persisted in the background.
//!
//! ```text
//!   idle ──deadline──▶ saving ──ok──▶ saved ──(indicator elapsed)──▶ idle
//!                        │
//!                        └──error──▶ idle (still dirty)
//! ```
//!
//! Mutations made while a save is in flight do not arm the timer. Once the
//! last request settles, however it settles, the timer is armed for them.
//!
//! The scheduler owns no timer task. Callers report mutations and poll with
//! the current instant; every time-dependent method has an `_at` variant so
//! tests drive it with explicit instants.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub const DEFAULT_AUTOSAVE_DEBOUNCE: Duration = Duration::from_secs(30);
pub const DEFAULT_SAVED_INDICATOR: Duration = Duration::from_secs(3);

/// Visual save state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AutosaveState {
    Idle,
    Saving,
    Saved,
}

#[derive(Debug)]
pub struct AutosaveScheduler {
    debounce: Duration,
    indicator: Duration,

    /// Unsaved mutations exist since the last successful save
    dirty: bool,

    /// When the pending quiet timer fires
    deadline: Option<Instant>,

    /// Saves issued and not yet answered
    in_flight: usize,

    /// A mutation arrived while a save was in flight
    pending_rearm: bool,

    state: AutosaveState,
    saved_until: Option<Instant>,
    last_saved_at: Option<DateTime<Utc>>,
}

impl AutosaveScheduler {
    pub fn new(debounce: Duration, indicator: Duration) -> Self {
        Self {
            debounce,
            indicator,
            dirty: false,
            deadline: None,
            in_flight: 0,
            pending_rearm: false,
            state: AutosaveState::Idle,
            saved_until: None,
            last_saved_at: None,
        }
    }

    /// Record a mutation; (re)starts the quiet timer when `armable`
    pub fn note_mutation(&mut self, armable: bool) {
        self.note_mutation_at(armable, Instant::now());
    }

    pub fn note_mutation_at(&mut self, armable: bool, now: Instant) {
        self.dirty = true;

        if !armable {
            self.deadline = None;
            return;
        }

        if self.in_flight > 0 {
            debug!("Save in flight, autosave timer not armed");
            self.pending_rearm = true;
            return;
        }

        self.deadline = Some(now + self.debounce);
    }

    /// Drop the pending timer, if any
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Whether the quiet timer has elapsed and a save may start
    pub fn is_due(&self) -> bool {
        self.is_due_at(Instant::now())
    }

    pub fn is_due_at(&self, now: Instant) -> bool {
        self.dirty && self.in_flight == 0 && self.deadline.is_some_and(|deadline| now >= deadline)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// A save was issued (automatic or manual)
    pub fn begin(&mut self) {
        self.deadline = None;
        self.in_flight += 1;
        self.state = AutosaveState::Saving;
        self.saved_until = None;
    }

    /// A save succeeded. `clean` is whether no edit happened since the
    /// request captured the document.
    pub fn succeed_at(&mut self, clean: bool, armable: bool, now: Instant, wall: DateTime<Utc>) {
        if clean {
            self.dirty = false;
        }

        self.state = AutosaveState::Saved;
        self.saved_until = Some(now + self.indicator);
        self.last_saved_at = Some(wall);

        self.settle_at(armable, now);
    }

    /// A save failed; the document stays dirty. The failed edits are not
    /// retried by themselves, only edits made while the save was out are.
    pub fn fail_at(&mut self, armable: bool, now: Instant) {
        warn!(in_flight = self.in_flight, "Save failed, document remains dirty");
        self.settle_at(armable, now);
        self.idle_if_settled();
    }

    /// A stale response was dropped; visual state only changes if nothing
    /// else is in flight
    pub fn discard_at(&mut self, armable: bool, now: Instant) {
        self.settle_at(armable, now);
        self.idle_if_settled();
    }

    /// A request will never be answered; treated like a failure
    pub fn abandon_at(&mut self, armable: bool, now: Instant) {
        self.settle_at(armable, now);
        self.idle_if_settled();
    }

    /// The document now matches the server without a save of ours
    pub fn mark_clean(&mut self) {
        self.dirty = false;
        self.deadline = None;
        self.pending_rearm = false;
    }

    fn settle_at(&mut self, armable: bool, now: Instant) {
        self.in_flight = self.in_flight.saturating_sub(1);
        if self.in_flight > 0 {
            return;
        }

        // Edits made while requests were out still need saving
        if std::mem::take(&mut self.pending_rearm) && self.dirty && armable {
            self.deadline = Some(now + self.debounce);
        }
    }

    fn idle_if_settled(&mut self) {
        if self.in_flight == 0 && self.state == AutosaveState::Saving {
            self.state = AutosaveState::Idle;
        }
    }

    pub fn state(&self) -> AutosaveState {
        self.state_at(Instant::now())
    }

    /// Visual state at `now`; `Saved` reverts to `Idle` once the indicator
    /// has been shown long enough
    pub fn state_at(&self, now: Instant) -> AutosaveState {
        match (self.state, self.saved_until) {
            (AutosaveState::Saved, Some(until)) if now >= until => AutosaveState::Idle,
            (state, _) => state,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        self.last_saved_at
    }
}

impl Default for AutosaveScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_AUTOSAVE_DEBOUNCE, DEFAULT_SAVED_INDICATOR)
    }
}
