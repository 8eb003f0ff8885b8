//! Core error types for evergain-core.
//!
//! Three families reach the user: validation failures caught before any
//! request is sent, network failures, and non-success server responses.
//! None of them is retried and none is fatal; callers turn them into an
//! [`Alert`] and return to the state that preceded the action.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for evergain-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Input or state validation failed before contacting the server
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The request could not be sent or the response could not be read
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("Server error ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Server { status: u16, message: Option<String> },

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Credential store errors
    #[error("Credential store error: {0}")]
    Credential(#[from] CredentialError),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Validation errors. Raised locally; the server is never contacted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Weight or reps left empty
    #[error("Please enter weight and reps")]
    MissingSetData,

    /// A field did not parse as the expected number
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// No exercise is selected
    #[error("Please select an exercise")]
    NoExerciseSelected,

    /// The action needs an active session
    #[error("Please start a workout session first")]
    NoActiveSession,

    /// A session is already running
    #[error("A workout session is already active")]
    SessionAlreadyActive,

    /// End confirmation does not belong to the current session
    #[error("End confirmation is stale; request it again")]
    StaleConfirmation,

    /// Repeat requested without a previous set
    #[error("No previous set to repeat")]
    NoPreviousSet,

    /// Empty required text input
    #[error("'{0}' must not be empty")]
    Empty(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Home/config directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Credential store errors.
#[derive(Error, Debug)]
pub enum CredentialError {
    /// OS keyring failure
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    /// Stored value could not be decoded
    #[error("Stored credential '{key}' is malformed: {message}")]
    Malformed { key: String, message: String },
}

/// The user-facing operation an error is reported for.
///
/// Supplies the generic message used when the server gives none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CheckActiveSession,
    LoadSessionTypes,
    LoadExercises,
    StartSession,
    EndSession,
    LogSet,
    LoadPreviousSet,
    CountSets,
    LoadHistory,
    LoadWorkoutSets,
    SignIn,
    SignUp,
}

impl Operation {
    pub fn title(self) -> &'static str {
        match self {
            Operation::LoadSessionTypes | Operation::LoadHistory => "Connection Error",
            Operation::LoadExercises => "Error Loading Exercises",
            _ => "Error",
        }
    }

    pub fn fallback_message(self) -> &'static str {
        match self {
            Operation::CheckActiveSession => "Failed to check active session",
            Operation::LoadSessionTypes => {
                "Failed to load session types. Make sure the backend server is running."
            }
            Operation::LoadExercises => "Could not load exercises for this session.",
            Operation::StartSession => "Failed to start session",
            Operation::EndSession => "Failed to end session",
            Operation::LogSet => "Failed to log set. Please try again.",
            Operation::LoadPreviousSet => "Failed to load previous set",
            Operation::CountSets => "Failed to get set count",
            Operation::LoadHistory => "Failed to load history. Check your connection.",
            Operation::LoadWorkoutSets => "Failed to load workout sets",
            Operation::SignIn => "Login failed",
            Operation::SignUp => "Registration failed",
        }
    }
}

/// A blocking acknowledgement shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl std::fmt::Display for Alert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}

impl std::error::Error for Alert {}

impl CoreError {
    /// Build a server error from a status and optional message.
    pub fn server(status: u16, message: Option<String>) -> Self {
        CoreError::Server { status, message }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, CoreError::Validation(_))
    }

    /// User-facing alert for this error in the context of `op`.
    ///
    /// Validation errors carry their own wording; server errors use the
    /// server-supplied message when present; everything else falls back to
    /// the operation's generic message.
    pub fn alert(&self, op: Operation) -> Alert {
        let (title, message) = match self {
            CoreError::Validation(v) => (validation_title(v), v.to_string()),
            CoreError::Server {
                message: Some(m), ..
            } if !m.trim().is_empty() => (op.title(), m.clone()),
            _ => (op.title(), op.fallback_message().to_string()),
        };
        Alert {
            title: title.to_string(),
            message,
        }
    }
}

fn validation_title(err: &ValidationError) -> &'static str {
    match err {
        ValidationError::MissingSetData | ValidationError::InvalidValue { .. } => "Missing Data",
        ValidationError::NoExerciseSelected => "No Exercise",
        ValidationError::NoActiveSession => "No Active Session",
        ValidationError::NoPreviousSet => "No Previous Set",
        _ => "Error",
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
