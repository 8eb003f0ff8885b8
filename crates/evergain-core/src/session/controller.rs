//! Client-side workout session state machine.
//!
//! The controller owns everything the logger screen shows: the active
//! session and its running totals, the selected exercise and its inputs,
//! the previous set, the next set number, and the rest timer. Every
//! state-changing command is one backend call; local state only changes
//! after the call succeeds.
//!
//! ## State Transitions
//!
//! ```text
//! NoSession --start--> Active --confirm_end--> Ending --ok--> NoSession
//!                        ^                        |
//!                        +-------- error ---------+
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::exercises::group_by_muscle;
use crate::api::WorkoutBackend;
use crate::error::{CoreError, Operation, Result, ValidationError};
use crate::events::Event;
use crate::models::{set_volume, Exercise, LogSetRequest, PreviousSet, Session, WorkoutSet};
use crate::timer::{self, RestTimer, RestTrigger, TickSlot};

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    NoSession,
    Active,
    /// End request in flight.
    Ending,
}

/// Raw text of the per-exercise input fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetInputs {
    pub weight: String,
    pub reps: String,
    pub rpe: String,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq)]
struct ParsedSet {
    weight: f64,
    reps: u32,
    rpe: Option<u8>,
    notes: Option<String>,
}

impl SetInputs {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn parse(&self) -> std::result::Result<ParsedSet, ValidationError> {
        let weight = self.weight.trim();
        let reps = self.reps.trim();
        if weight.is_empty() || reps.is_empty() {
            return Err(ValidationError::MissingSetData);
        }

        let weight = match weight.parse::<f64>() {
            Ok(w) if w.is_finite() && w >= 0.0 => w,
            _ => {
                return Err(ValidationError::InvalidValue {
                    field: "weight".into(),
                    message: format!("'{weight}' is not a valid weight"),
                })
            }
        };
        let reps = reps.parse::<u32>().map_err(|_| ValidationError::InvalidValue {
            field: "reps".into(),
            message: format!("'{reps}' is not a whole number of reps"),
        })?;

        let rpe = match self.rpe.trim() {
            "" => None,
            raw => match raw.parse::<u8>() {
                Ok(r) if (1..=10).contains(&r) => Some(r),
                _ => {
                    return Err(ValidationError::InvalidValue {
                        field: "rpe".into(),
                        message: format!("'{raw}' must be a whole number from 1 to 10"),
                    })
                }
            },
        };

        let notes = Some(self.note.trim())
            .filter(|n| !n.is_empty())
            .map(str::to_string);

        Ok(ParsedSet {
            weight,
            reps,
            rpe,
            notes,
        })
    }
}

/// Proof that the user asked to end a specific session.
///
/// Obtained from [`SessionController::request_end`] and consumed by
/// [`SessionController::confirm_end`] or [`SessionController::cancel_end`].
#[derive(Debug, PartialEq, Eq)]
pub struct PendingEnd {
    session_id: String,
}

impl PendingEnd {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

/// Identifies one previous-set/set-count lookup.
///
/// Only the most recently issued ticket is current; outcomes carrying any
/// other ticket are discarded when applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    session_id: String,
    exercise_name: String,
    generation: u64,
}

impl LookupTicket {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn exercise_name(&self) -> &str {
        &self.exercise_name
    }

    /// Fetch the previous set and the set count concurrently.
    ///
    /// Only borrows the backend, so it can run while the controller keeps
    /// handling input.
    pub async fn run<B: WorkoutBackend>(self, backend: &B) -> LookupOutcome {
        let (previous, count) = tokio::join!(
            backend.last_set(&self.session_id, &self.exercise_name),
            backend.set_count(&self.session_id, &self.exercise_name),
        );
        LookupOutcome {
            ticket: self,
            previous,
            count,
        }
    }
}

#[derive(Debug)]
pub struct LookupOutcome {
    ticket: LookupTicket,
    previous: Result<Option<WorkoutSet>>,
    count: Result<u32>,
}

impl LookupOutcome {
    pub fn ticket(&self) -> &LookupTicket {
        &self.ticket
    }
}

/// Read-only view of the controller for front-ends.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionStatus {
    pub state: SessionState,
    pub session_id: Option<String>,
    pub session_type: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub elapsed: Option<String>,
    pub total_sets: u32,
    pub total_volume: f64,
    pub selected_exercise: Option<String>,
    pub next_set_number: u32,
    pub previous_set: String,
    pub live_volume: f64,
    pub rest_state: timer::RestState,
    pub rest_remaining: String,
}

pub struct SessionController<B> {
    backend: B,
    user_id: String,
    state: SessionState,
    session: Option<Session>,
    exercises: Vec<Exercise>,
    selected: Option<String>,
    inputs: SetInputs,
    previous_set: Option<PreviousSet>,
    next_set_number: u32,
    logged_sets: Vec<WorkoutSet>,
    rest: RestTimer,
    lookup_generation: u64,
    current_lookup: Option<LookupTicket>,
}

impl<B: WorkoutBackend> SessionController<B> {
    pub fn new(backend: B, user_id: impl Into<String>, rest_secs: u32) -> Self {
        Self {
            backend,
            user_id: user_id.into(),
            state: SessionState::NoSession,
            session: None,
            exercises: Vec::new(),
            selected: None,
            inputs: SetInputs::default(),
            previous_set: None,
            next_set_number: 1,
            logged_sets: Vec::new(),
            rest: RestTimer::new(rest_secs),
            lookup_generation: 0,
            current_lookup: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    pub fn exercises_by_muscle(&self) -> BTreeMap<String, Vec<Exercise>> {
        group_by_muscle(&self.exercises)
    }

    pub fn selected_exercise(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn inputs(&self) -> &SetInputs {
        &self.inputs
    }

    pub fn previous_set(&self) -> Option<&PreviousSet> {
        self.previous_set.as_ref()
    }

    pub fn next_set_number(&self) -> u32 {
        self.next_set_number
    }

    pub fn logged_sets(&self) -> &[WorkoutSet] {
        &self.logged_sets
    }

    pub fn rest(&self) -> &RestTimer {
        &self.rest
    }

    /// `"60kg × 8"`, `"60kg × 8 @ RPE 7"`, or `"No previous set"`.
    pub fn format_previous_set(&self) -> String {
        match &self.previous_set {
            Some(prev) => prev.to_string(),
            None => "No previous set".to_string(),
        }
    }

    /// weight × reps × the set number in progress. Zero while either input
    /// does not parse.
    pub fn live_volume(&self) -> f64 {
        let weight = self.inputs.weight.trim().parse::<f64>().ok();
        let reps = self.inputs.reps.trim().parse::<u32>().ok();
        match (weight, reps) {
            (Some(w), Some(r)) if w.is_finite() && w >= 0.0 => {
                set_volume(w, r) * f64::from(self.next_set_number)
            }
            _ => 0.0,
        }
    }

    /// Seconds since the session started, clamped at zero.
    pub fn session_elapsed(&self, now: DateTime<Utc>) -> Option<u64> {
        self.session
            .as_ref()
            .map(|s| timer::elapsed_secs(s.started_at, now))
    }

    /// Elapsed time as `MM:SS`, or `H:MM:SS` past an hour.
    pub fn session_duration(&self, now: DateTime<Utc>) -> Option<String> {
        self.session
            .as_ref()
            .map(|s| timer::session_duration(s.started_at, now))
    }

    /// Whether a tick source for `slot` should be running.
    pub fn wants_tick(&self, slot: TickSlot) -> bool {
        match slot {
            TickSlot::SessionClock => self.state == SessionState::Active,
            TickSlot::Rest => self.rest.is_running(),
        }
    }

    pub fn status(&self, now: DateTime<Utc>) -> SessionStatus {
        let session = self.session.as_ref();
        SessionStatus {
            state: self.state,
            session_id: session.map(|s| s.id.clone()),
            session_type: session.map(|s| s.session_type.clone()),
            started_at: session.map(|s| s.started_at),
            elapsed: self.session_duration(now),
            total_sets: session.map_or(0, |s| s.total_sets),
            total_volume: session.map_or(0.0, |s| s.total_volume),
            selected_exercise: self.selected.clone(),
            next_set_number: self.next_set_number,
            previous_set: self.format_previous_set(),
            live_volume: self.live_volume(),
            rest_state: self.rest.state(),
            rest_remaining: self.rest.display(),
        }
    }

    // ── Session lifecycle ────────────────────────────────────────────

    /// Ask the server for an in-progress session and resume it.
    ///
    /// Returns no events when the server has none.
    pub async fn check_active_on_launch(&mut self) -> Result<Vec<Event>> {
        let Some(session) = self.backend.active_session(&self.user_id).await? else {
            tracing::debug!(user_id = %self.user_id, "no active session on server");
            return Ok(Vec::new());
        };

        tracing::info!(session_id = %session.id, session_type = %session.session_type, "resuming active session");
        let mut events = vec![Event::SessionRestored {
            session_id: session.id.clone(),
            session_type: session.session_type.clone(),
            started_at: session.started_at,
            total_sets: session.total_sets,
            total_volume: session.total_volume,
        }];
        self.enter_session(session);
        self.refresh_logged_sets(None).await;
        events.extend(self.load_exercises().await);
        Ok(events)
    }

    /// Start a new session. Rejected locally while one is already active.
    pub async fn start(&mut self, session_type: &str) -> Result<Vec<Event>> {
        if self.state != SessionState::NoSession {
            return Err(ValidationError::SessionAlreadyActive.into());
        }
        let session_type = session_type.trim();
        if session_type.is_empty() {
            return Err(ValidationError::Empty("session type".into()).into());
        }

        let session = self
            .backend
            .start_session(&self.user_id, session_type)
            .await?;
        tracing::info!(session_id = %session.id, session_type = %session.session_type, "session started");

        let mut events = vec![Event::SessionStarted {
            session_id: session.id.clone(),
            session_type: session.session_type.clone(),
            started_at: session.started_at,
        }];
        self.enter_session(session);
        events.extend(self.load_exercises().await);
        Ok(events)
    }

    /// First step of ending: bind a confirmation to the current session.
    pub fn request_end(&self) -> std::result::Result<PendingEnd, ValidationError> {
        match (&self.state, &self.session) {
            (SessionState::Active, Some(session)) => Ok(PendingEnd {
                session_id: session.id.clone(),
            }),
            _ => Err(ValidationError::NoActiveSession),
        }
    }

    pub fn cancel_end(&self, pending: PendingEnd) {
        tracing::debug!(session_id = %pending.session_id, "end cancelled");
    }

    /// Second step of ending. On failure the session stays active.
    pub async fn confirm_end(&mut self, pending: PendingEnd) -> Result<Event> {
        let current = match (&self.state, &self.session) {
            (SessionState::Active, Some(session)) => session.id.clone(),
            _ => return Err(ValidationError::NoActiveSession.into()),
        };
        if pending.session_id != current {
            return Err(ValidationError::StaleConfirmation.into());
        }

        self.state = SessionState::Ending;
        let ended = match self.backend.end_session(&self.user_id).await {
            Ok(ended) => ended,
            Err(e) => {
                self.state = SessionState::Active;
                return Err(e);
            }
        };

        tracing::info!(
            session_id = %ended.id,
            total_sets = ended.total_sets,
            total_volume = ended.total_volume,
            "session ended"
        );
        let event = Event::SessionEnded {
            session_id: ended.id,
            duration_minutes: ended.duration_minutes,
            total_sets: ended.total_sets,
            total_volume: ended.total_volume,
            at: ended.ended_at.unwrap_or_else(Utc::now),
        };
        self.clear_session();
        Ok(event)
    }

    // ── Exercise selection ───────────────────────────────────────────

    /// Switch the active exercise and reset everything tied to the old one.
    ///
    /// The returned ticket must be run and applied to fill in the previous
    /// set and the next set number.
    pub fn begin_selection(
        &mut self,
        exercise_name: &str,
    ) -> std::result::Result<LookupTicket, ValidationError> {
        let session_id = match (&self.state, &self.session) {
            (SessionState::Active, Some(session)) => session.id.clone(),
            _ => return Err(ValidationError::NoActiveSession),
        };
        let name = exercise_name.trim();
        if name.is_empty() {
            return Err(ValidationError::Empty("exercise".into()));
        }
        let name = self
            .exercises
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
            .map_or_else(|| name.to_string(), |e| e.name.clone());

        self.inputs.clear();
        self.previous_set = None;
        self.next_set_number = 1;
        self.selected = Some(name.clone());

        self.lookup_generation += 1;
        let ticket = LookupTicket {
            session_id,
            exercise_name: name,
            generation: self.lookup_generation,
        };
        self.current_lookup = Some(ticket.clone());
        Ok(ticket)
    }

    /// Apply a finished lookup. Outcomes for a superseded ticket are ignored
    /// and yield `Ok(None)`.
    ///
    /// Whatever part of the lookup succeeded is applied; if either request
    /// failed, the first failure is returned after applying.
    pub fn apply_lookup(&mut self, outcome: LookupOutcome) -> Result<Option<Event>> {
        if self.current_lookup.as_ref() != Some(&outcome.ticket) {
            tracing::warn!(
                exercise = %outcome.ticket.exercise_name,
                generation = outcome.ticket.generation,
                "stale lookup discarded"
            );
            return Ok(None);
        }
        self.current_lookup = None;

        let mut failure: Option<CoreError> = None;
        match outcome.previous {
            Ok(set) => self.previous_set = set.as_ref().map(PreviousSet::from),
            Err(e) => failure = Some(e),
        }
        match outcome.count {
            Ok(count) => self.next_set_number = count.saturating_add(1),
            Err(e) => {
                failure.get_or_insert(e);
            }
        }
        if let Some(e) = failure {
            return Err(e);
        }

        Ok(Some(Event::ExerciseSelected {
            exercise_name: outcome.ticket.exercise_name,
            next_set_number: self.next_set_number,
            previous_set: self.previous_set.clone(),
        }))
    }

    /// Select an exercise and wait for its lookups.
    pub async fn select_exercise(&mut self, exercise_name: &str) -> Result<Option<Event>> {
        let ticket = self.begin_selection(exercise_name)?;
        let outcome = ticket.run(&self.backend).await;
        self.apply_lookup(outcome)
    }

    // ── Set entry ────────────────────────────────────────────────────

    pub fn set_weight_input(&mut self, weight: &str) {
        self.inputs.weight = weight.to_string();
    }

    pub fn set_reps_input(&mut self, reps: &str) {
        self.inputs.reps = reps.to_string();
    }

    pub fn set_rpe_input(&mut self, rpe: &str) {
        self.inputs.rpe = rpe.to_string();
    }

    /// Attach a note to the next logged set.
    pub fn set_note(&mut self, note: &str) {
        self.inputs.note = note.to_string();
    }

    /// Copy the previous set into the inputs.
    pub fn repeat_last_set(&mut self) -> std::result::Result<(), ValidationError> {
        let prev = self
            .previous_set
            .as_ref()
            .ok_or(ValidationError::NoPreviousSet)?;
        self.inputs.weight = prev.weight.to_string();
        self.inputs.reps = prev.reps.to_string();
        self.inputs.rpe = prev.rpe.map(|r| r.to_string()).unwrap_or_default();
        Ok(())
    }

    /// Log the current inputs as a set of the selected exercise.
    ///
    /// Validation happens before any request. On success the totals move,
    /// the inputs clear, the rest timer restarts, and the set number is
    /// refreshed from the server count.
    pub async fn log_set(&mut self) -> Result<Vec<Event>> {
        let session_id = match (&self.state, &self.session) {
            (SessionState::Active, Some(session)) => session.id.clone(),
            _ => return Err(ValidationError::NoActiveSession.into()),
        };
        let exercise_name = self
            .selected
            .clone()
            .ok_or(ValidationError::NoExerciseSelected)?;
        let parsed = self.inputs.parse()?;

        let request = LogSetRequest {
            session_id: session_id.clone(),
            exercise_name: exercise_name.clone(),
            weight: parsed.weight,
            reps: parsed.reps,
            rpe: parsed.rpe,
            notes: parsed.notes,
        };
        let logged = self.backend.log_set(&request).await?;

        let volume = logged
            .volume
            .unwrap_or_else(|| set_volume(parsed.weight, parsed.reps));
        let (total_sets, total_volume) = match self.session.as_mut() {
            Some(session) => {
                session.total_sets += 1;
                session.total_volume += volume;
                (session.total_sets, session.total_volume)
            }
            None => (0, 0.0),
        };
        tracing::info!(
            exercise = %exercise_name,
            set_number = logged.set_number,
            weight = parsed.weight,
            reps = parsed.reps,
            "set logged"
        );

        self.previous_set = Some(PreviousSet {
            weight: parsed.weight,
            reps: parsed.reps,
            rpe: parsed.rpe,
        });
        self.inputs.clear();

        let mut events = vec![Event::SetLogged {
            exercise_name: exercise_name.clone(),
            set_number: logged.set_number,
            weight: parsed.weight,
            reps: parsed.reps,
            rpe: parsed.rpe,
            total_sets,
            total_volume,
            at: logged.timestamp.unwrap_or_else(Utc::now),
        }];
        events.push(self.rest.start(RestTrigger::Auto));

        match self.backend.set_count(&session_id, &exercise_name).await {
            Ok(count) => self.next_set_number = count.saturating_add(1),
            Err(e) => {
                tracing::warn!(error = %e, "set count refresh failed; keeping previous set number");
            }
        }
        self.refresh_logged_sets(Some(logged)).await;
        Ok(events)
    }

    // ── Rest timer ───────────────────────────────────────────────────

    pub fn start_rest(&mut self) -> Event {
        self.rest.start(RestTrigger::Manual)
    }

    pub fn stop_rest(&mut self) -> Option<Event> {
        self.rest.stop()
    }

    pub fn set_rest_duration(&mut self, secs: u32) -> Event {
        self.rest.set_duration(secs)
    }

    pub fn set_rest_duration_from_input(&mut self, input: &str) -> Event {
        self.rest.set_duration_from_input(input)
    }

    /// Advance whatever `slot` drives. Only the rest countdown produces events;
    /// the session clock is derived from `started_at` on demand.
    pub fn on_tick(&mut self, slot: TickSlot) -> Option<Event> {
        match slot {
            TickSlot::Rest => self.rest.tick(),
            TickSlot::SessionClock => None,
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn enter_session(&mut self, session: Session) {
        self.reset_session_state();
        self.session = Some(session);
        self.state = SessionState::Active;
    }

    fn clear_session(&mut self) {
        self.reset_session_state();
        self.session = None;
        self.state = SessionState::NoSession;
    }

    fn reset_session_state(&mut self) {
        self.exercises.clear();
        self.selected = None;
        self.inputs.clear();
        self.previous_set = None;
        self.next_set_number = 1;
        self.logged_sets.clear();
        self.rest.stop();
        self.current_lookup = None;
    }

    /// Load the exercise list for the active session type and auto-select
    /// the first entry. Failures are reported as events, never as errors.
    async fn load_exercises(&mut self) -> Vec<Event> {
        let Some(session_type) = self.session.as_ref().map(|s| s.session_type.clone()) else {
            return Vec::new();
        };

        let exercises = match self.backend.exercises(&session_type).await {
            Ok(list) => list,
            Err(e) => {
                tracing::warn!(error = %e, %session_type, "exercise list unavailable");
                self.exercises.clear();
                return vec![Event::ExercisesUnavailable {
                    session_type,
                    message: e.alert(Operation::LoadExercises).message,
                }];
            }
        };

        self.exercises = exercises;
        let mut events = vec![Event::ExercisesLoaded {
            session_type,
            count: self.exercises.len(),
        }];

        if self.selected.is_none() {
            if let Some(first) = self.exercises.first().map(|e| e.name.clone()) {
                match self.select_exercise(&first).await {
                    Ok(Some(event)) => events.push(event),
                    Ok(None) => {}
                    Err(e) => {
                        tracing::warn!(error = %e, exercise = %first, "lookup for auto-selected exercise failed")
                    }
                }
            }
        }
        events
    }

    /// Reload the session's set list. On failure, keep the local list and
    /// append `fallback` if given.
    async fn refresh_logged_sets(&mut self, fallback: Option<WorkoutSet>) {
        let Some(session_id) = self.session.as_ref().map(|s| s.id.clone()) else {
            return;
        };
        match self.backend.session_sets(&session_id).await {
            Ok(sets) => self.logged_sets = sets,
            Err(e) => {
                tracing::warn!(error = %e, "session set list refresh failed");
                self.logged_sets.extend(fallback);
            }
        }
    }
}
