//! Wire and domain types shared by the API client and the session controller.
//!
//! Field names follow the backend's JSON. Identifiers arrive as `_id`.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A bounded workout occurrence with a category and running totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    pub session_type: String,
    #[serde(deserialize_with = "wire_time::required")]
    pub started_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "wire_time::optional")]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_sets: u32,
    /// Sum of weight x reps over all logged sets.
    #[serde(default)]
    pub total_volume: f64,
    #[serde(default)]
    pub is_active: bool,
    /// Present once the session has ended.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<f64>,
}

/// Reference data; looked up by name, never owned by a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub name: String,
    pub muscle_group: String,
    #[serde(default)]
    pub secondary: Option<String>,
    #[serde(default)]
    pub sessions: Vec<String>,
}

impl Exercise {
    /// Secondary muscle group, treating an empty string as absent.
    pub fn secondary_muscle(&self) -> Option<&str> {
        self.secondary.as_deref().filter(|s| !s.trim().is_empty())
    }
}

/// One recorded performance of an exercise within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSet {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub session_id: String,
    pub exercise_name: String,
    pub weight: f64,
    pub reps: u32,
    #[serde(default)]
    pub rpe: Option<u8>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default = "first_set")]
    pub set_number: u32,
    #[serde(default, deserialize_with = "wire_time::optional")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub volume: Option<f64>,
}

fn first_set() -> u32 {
    1
}

impl WorkoutSet {
    /// Volume echoed by the server, or weight x reps when it was omitted.
    pub fn effective_volume(&self) -> f64 {
        self.volume
            .unwrap_or_else(|| set_volume(self.weight, self.reps))
    }
}

/// weight x reps.
pub fn set_volume(weight: f64, reps: u32) -> f64 {
    weight * f64::from(reps)
}

/// The most recent set for the current (session, exercise) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviousSet {
    pub weight: f64,
    pub reps: u32,
    #[serde(default)]
    pub rpe: Option<u8>,
}

impl From<&WorkoutSet> for PreviousSet {
    fn from(set: &WorkoutSet) -> Self {
        Self {
            weight: set.weight,
            reps: set.reps,
            rpe: set.rpe,
        }
    }
}

impl std::fmt::Display for PreviousSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}kg × {}", self.weight, self.reps)?;
        if let Some(rpe) = self.rpe {
            write!(f, " @ RPE {rpe}")?;
        }
        Ok(())
    }
}

/// Session category offered by the backend (e.g. "Push" under "Split").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionType {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
}

/// Backend timestamps: RFC 3339, or naive ISO 8601 stored as UTC
/// (`2025-01-10T10:05:00.123000`).
mod wire_time {
    use super::*;

    pub fn parse(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        raw.parse::<DateTime<Utc>>()
            .or_else(|_| raw.parse::<NaiveDateTime>().map(|naive| naive.and_utc()))
    }

    pub fn required<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    pub fn optional<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateTime<Utc>>, D::Error> {
        Option::<String>::deserialize(d)?
            .map(|raw| parse(&raw).map_err(serde::de::Error::custom))
            .transpose()
    }
}

// ── Request / response envelopes ────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct StartSessionRequest<'a> {
    pub user_id: &'a str,
    pub session_type: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct EndSessionRequest<'a> {
    pub user_id: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActiveSessionResponse {
    pub active: bool,
    #[serde(default)]
    pub session: Option<Session>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetCountResponse {
    pub count: u32,
}

/// Body of `POST /workout-sets/log`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogSetRequest {
    pub session_id: String,
    pub exercise_name: String,
    pub weight: f64,
    pub reps: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpe: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

// ── Auth ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest<'a> {
    pub full_name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}
