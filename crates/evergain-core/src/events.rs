use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::PreviousSet;
use crate::timer::RestTrigger;

/// Every state change in the logger produces an Event.
/// The front-end renders them; the tick scheduler reacts to the rest ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    SessionStarted {
        session_id: String,
        session_type: String,
        started_at: DateTime<Utc>,
    },
    /// An in-progress session was found on launch.
    SessionRestored {
        session_id: String,
        session_type: String,
        started_at: DateTime<Utc>,
        total_sets: u32,
        total_volume: f64,
    },
    SessionEnded {
        session_id: String,
        duration_minutes: Option<f64>,
        total_sets: u32,
        total_volume: f64,
        at: DateTime<Utc>,
    },
    ExercisesLoaded {
        session_type: String,
        count: usize,
    },
    /// Exercise list could not be fetched; the session itself is fine.
    ExercisesUnavailable {
        session_type: String,
        message: String,
    },
    ExerciseSelected {
        exercise_name: String,
        next_set_number: u32,
        previous_set: Option<PreviousSet>,
    },
    SetLogged {
        exercise_name: String,
        set_number: u32,
        weight: f64,
        reps: u32,
        rpe: Option<u8>,
        total_sets: u32,
        total_volume: f64,
        at: DateTime<Utc>,
    },
    RestStarted {
        duration_secs: u32,
        trigger: RestTrigger,
        at: DateTime<Utc>,
    },
    RestStopped {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    RestCompleted {
        duration_secs: u32,
        at: DateTime<Utc>,
    },
    RestDurationChanged {
        duration_secs: u32,
    },
}

impl Event {
    /// Whether the event (re)armed the rest countdown.
    pub fn arms_rest(&self) -> bool {
        matches!(self, Event::RestStarted { .. })
    }

    /// Whether the event ended the rest countdown.
    pub fn disarms_rest(&self) -> bool {
        matches!(
            self,
            Event::RestStopped { .. } | Event::RestCompleted { .. } | Event::SessionEnded { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_snake_case_tag() {
        let event = Event::RestDurationChanged { duration_secs: 120 };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "rest_duration_changed");
        assert_eq!(json["duration_secs"], 120);
    }

    #[test]
    fn rest_arming_classification() {
        let started = Event::RestStarted {
            duration_secs: 90,
            trigger: RestTrigger::Manual,
            at: Utc::now(),
        };
        assert!(started.arms_rest());
        assert!(!started.disarms_rest());

        let done = Event::RestCompleted {
            duration_secs: 90,
            at: Utc::now(),
        };
        assert!(done.disarms_rest());
    }
}
