mod clock;
mod rest;
mod scheduler;

pub use clock::{elapsed_secs, format_elapsed, session_duration};
pub use rest::{
    format_rest, parse_rest_input, RestState, RestTimer, RestTrigger, DEFAULT_REST_SECS,
    REST_PRESETS_SECS,
};
pub use scheduler::{TickScheduler, TickSlot};
