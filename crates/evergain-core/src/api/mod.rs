//! Boundary to the workout-tracking HTTP service.
//!
//! Every state-changing operation is exactly one request/response pair:
//! no batching, no queueing, no offline buffer, no retry.

mod http;

pub use http::ApiClient;

use std::collections::BTreeMap;

use crate::error::Result;
use crate::models::{Exercise, LogSetRequest, Session, SessionType, WorkoutSet};

/// Operations the session controller and history views need from the backend.
///
/// [`ApiClient`] is the HTTP implementation; tests substitute in-memory fakes.
#[allow(async_fn_in_trait)]
pub trait WorkoutBackend {
    /// `GET /sessions/active` -- the user's in-progress session, if any.
    async fn active_session(&self, user_id: &str) -> Result<Option<Session>>;

    /// `POST /sessions/start`
    async fn start_session(&self, user_id: &str, session_type: &str) -> Result<Session>;

    /// `POST /sessions/end` -- returns the closed session with its final totals.
    async fn end_session(&self, user_id: &str) -> Result<Session>;

    /// `GET /sessions/history`, most recent first.
    async fn session_history(&self, user_id: &str, limit: u32) -> Result<Vec<Session>>;

    /// `GET /sessions/{id}/workout-sets` for a completed session.
    async fn completed_session_sets(&self, session_id: &str) -> Result<Vec<WorkoutSet>>;

    /// `GET /sessions/types/categorized`
    async fn session_types(&self) -> Result<BTreeMap<String, Vec<SessionType>>>;

    /// `GET /sessions/exercises?session_type=`
    async fn exercises(&self, session_type: &str) -> Result<Vec<Exercise>>;

    /// `GET /workout-sets/last-set` -- `None` when the exercise has no set yet.
    async fn last_set(&self, session_id: &str, exercise_name: &str) -> Result<Option<WorkoutSet>>;

    /// `GET /workout-sets/count`
    async fn set_count(&self, session_id: &str, exercise_name: &str) -> Result<u32>;

    /// `POST /workout-sets/log`
    async fn log_set(&self, request: &LogSetRequest) -> Result<WorkoutSet>;

    /// `GET /workout-sets/session/{id}` for the active session.
    async fn session_sets(&self, session_id: &str) -> Result<Vec<WorkoutSet>>;
}
