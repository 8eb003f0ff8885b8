//! Workout session logic: the controller state machine and exercise views.

mod controller;
mod exercises;

pub use controller::{
    LookupOutcome, LookupTicket, PendingEnd, SessionController, SessionState, SessionStatus,
    SetInputs,
};
pub use exercises::{describe, group_by_muscle};
