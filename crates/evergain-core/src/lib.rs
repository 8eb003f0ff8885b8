//! # Evergain Core Library
//!
//! Client-side logic for the Evergain workout tracker. All persistence lives
//! in the Evergain HTTP API; this crate holds the session state machine that
//! sits in front of it. The `evergain` CLI is a thin layer over the same
//! library.
//!
//! ## Architecture
//!
//! - **Session Controller**: start/log/end state machine that talks to the
//!   backend one request per action and arms the rest timer after each set
//! - **Rest Timer**: one-second countdown driven by an explicit tick scheduler
//! - **API**: the [`WorkoutBackend`] trait and its reqwest implementation
//! - **Storage**: TOML configuration; credentials live in the OS keyring
//!
//! ## Key Components
//!
//! - [`SessionController`]: workout session state machine
//! - [`RestTimer`]: rest countdown between sets
//! - [`TickScheduler`]: cancellable repeating ticks
//! - [`AppContext`]: explicitly constructed application context
//! - [`Config`]: application configuration management

pub mod api;
pub mod context;
pub mod credentials;
pub mod error;
pub mod events;
pub mod history;
pub mod models;
pub mod session;
pub mod storage;
pub mod timer;

pub use api::{ApiClient, WorkoutBackend};
pub use context::AppContext;
pub use credentials::{AuthVault, CredentialStore, KeyringStore, MemoryStore};
pub use error::{Alert, ConfigError, CoreError, CredentialError, Operation, ValidationError};
pub use events::Event;
pub use history::{HistoryPage, HistorySummary};
pub use models::{Exercise, PreviousSet, Session, SessionType, User, WorkoutSet};
pub use session::{PendingEnd, SessionController, SessionState, SessionStatus};
pub use storage::Config;
pub use timer::{RestState, RestTimer, RestTrigger, TickScheduler, TickSlot};
