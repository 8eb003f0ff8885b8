//! Rest timer between sets.
//!
//! A one-second-resolution countdown. It does not use internal threads:
//! the owner calls `tick()` once per elapsed second (see
//! [`TickScheduler`](super::TickScheduler)).
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> Idle      (tick reaches zero, or stop)
//! Running -> Running           (start again: reset and restart)
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::events::Event;

/// Preset rest durations offered to the user, in seconds.
pub const REST_PRESETS_SECS: [u32; 6] = [60, 90, 120, 180, 240, 300];

/// Rest duration used when nothing else is configured.
pub const DEFAULT_REST_SECS: u32 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestState {
    Idle,
    Running,
}

/// What started a rest period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestTrigger {
    /// Armed by a successfully logged set.
    Auto,
    Manual,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestTimer {
    state: RestState,
    duration_secs: u32,
    remaining_secs: u32,
}

impl RestTimer {
    /// Create an idle timer. A zero duration falls back to the default.
    pub fn new(duration_secs: u32) -> Self {
        let duration_secs = if duration_secs == 0 {
            DEFAULT_REST_SECS
        } else {
            duration_secs
        };
        Self {
            state: RestState::Idle,
            duration_secs,
            remaining_secs: duration_secs,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> RestState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RestState::Running
    }

    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    /// Remaining time as `MM:SS`.
    pub fn display(&self) -> String {
        format_rest(self.remaining_secs)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a rest period. Restarts from the full duration when already running.
    pub fn start(&mut self, trigger: RestTrigger) -> Event {
        self.remaining_secs = self.duration_secs;
        self.state = RestState::Running;
        Event::RestStarted {
            duration_secs: self.duration_secs,
            trigger,
            at: Utc::now(),
        }
    }

    /// Stop early. Partial progress is discarded.
    pub fn stop(&mut self) -> Option<Event> {
        match self.state {
            RestState::Running => {
                let remaining_secs = self.remaining_secs;
                self.state = RestState::Idle;
                self.remaining_secs = self.duration_secs;
                Some(Event::RestStopped {
                    remaining_secs,
                    at: Utc::now(),
                })
            }
            RestState::Idle => None,
        }
    }

    /// Advance by one second. Returns `Some(Event::RestCompleted)` when the
    /// countdown reaches zero; the timer is then idle and refilled.
    pub fn tick(&mut self) -> Option<Event> {
        if self.state != RestState::Running {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.state = RestState::Idle;
            self.remaining_secs = self.duration_secs;
            return Some(Event::RestCompleted {
                duration_secs: self.duration_secs,
                at: Utc::now(),
            });
        }
        None
    }

    /// Change the configured duration. While idle the display follows;
    /// a running countdown keeps going and refills with the new value.
    pub fn set_duration(&mut self, secs: u32) -> Event {
        self.duration_secs = if secs == 0 { DEFAULT_REST_SECS } else { secs };
        if self.state == RestState::Idle {
            self.remaining_secs = self.duration_secs;
        }
        Event::RestDurationChanged {
            duration_secs: self.duration_secs,
        }
    }

    /// Free-form entry. Anything that is not a positive integer falls back
    /// to [`DEFAULT_REST_SECS`].
    pub fn set_duration_from_input(&mut self, input: &str) -> Event {
        self.set_duration(parse_rest_input(input))
    }
}

impl Default for RestTimer {
    fn default() -> Self {
        Self::new(DEFAULT_REST_SECS)
    }
}

/// Parse a user-entered rest duration, defaulting on junk or zero.
pub fn parse_rest_input(input: &str) -> u32 {
    match input.trim().parse::<u32>() {
        Ok(secs) if secs > 0 => secs,
        _ => DEFAULT_REST_SECS,
    }
}

/// `MM:SS`, minutes zero-padded and unbounded.
pub fn format_rest(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
