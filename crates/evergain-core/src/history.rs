//! Completed-session history and the dashboard summary derived from it.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::WorkoutBackend;
use crate::error::Result;
use crate::models::{Session, WorkoutSet};

/// Page size of the history list.
pub const DEFAULT_HISTORY_LIMIT: u32 = 20;

/// Page size the dashboard summary is computed over.
pub const SUMMARY_HISTORY_LIMIT: u32 = 50;

/// Split rotation used to suggest the next workout.
pub const SESSION_ROTATION: [&str; 3] = ["Push", "Pull", "Legs"];

/// Aggregates over one page of history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistorySummary {
    pub workouts: usize,
    pub total_volume: f64,
    pub total_duration_minutes: f64,
    pub next_session_type: String,
}

impl HistorySummary {
    /// `sessions` is most recent first, as the server returns it.
    pub fn from_sessions(sessions: &[Session]) -> Self {
        Self {
            workouts: sessions.len(),
            total_volume: sessions.iter().map(|s| s.total_volume).sum(),
            total_duration_minutes: sessions
                .iter()
                .filter_map(|s| s.duration_minutes)
                .sum(),
            next_session_type: suggest_next_session(
                sessions.first().map(|s| s.session_type.as_str()),
            )
            .to_string(),
        }
    }
}

/// The type after `last` in the rotation; `Push` when `last` is outside it
/// or there is no history.
pub fn suggest_next_session(last: Option<&str>) -> &'static str {
    last.and_then(|last| SESSION_ROTATION.iter().position(|t| *t == last))
        .map_or(SESSION_ROTATION[0], |i| {
            SESSION_ROTATION[(i + 1) % SESSION_ROTATION.len()]
        })
}

/// `Today`, `Yesterday`, or `N days ago`.
pub fn relative_day(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    match (now - at).num_days().max(0) {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        n => format!("{n} days ago"),
    }
}

/// One fetched page of history with its summary.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryPage {
    pub sessions: Vec<Session>,
    pub summary: HistorySummary,
}

impl HistoryPage {
    pub async fn fetch<B: WorkoutBackend>(backend: &B, user_id: &str, limit: u32) -> Result<Self> {
        let sessions = backend.session_history(user_id, limit).await?;
        tracing::debug!(count = sessions.len(), limit, "history loaded");
        let summary = HistorySummary::from_sessions(&sessions);
        Ok(Self { sessions, summary })
    }
}

/// Sets of one completed session, grouped by exercise in first-seen order.
pub async fn session_breakdown<B: WorkoutBackend>(
    backend: &B,
    session_id: &str,
) -> Result<Vec<(String, Vec<WorkoutSet>)>> {
    let sets = backend.completed_session_sets(session_id).await?;
    let mut grouped: Vec<(String, Vec<WorkoutSet>)> = Vec::new();
    for set in sets {
        match grouped.iter_mut().find(|(name, _)| *name == set.exercise_name) {
            Some((_, list)) => list.push(set),
            None => grouped.push((set.exercise_name.clone(), vec![set])),
        }
    }
    Ok(grouped)
}
