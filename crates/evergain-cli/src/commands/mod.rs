pub mod auth;
pub mod config;
pub mod exercises;
pub mod history;
pub mod logger;
pub mod rest;
pub mod session;
pub mod set;

use std::io::{BufRead, Write};

use evergain_core::api::ApiClient;
use evergain_core::{AppContext, Operation, SessionController};
use serde::Serialize;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Controller resumed from the server's active session, if there is one.
pub async fn resumed_controller(
    ctx: &AppContext,
) -> Result<SessionController<ApiClient>, Box<dyn std::error::Error>> {
    let mut ctrl = ctx.controller();
    let events = ctrl
        .check_active_on_launch()
        .await
        .map_err(|e| e.alert(Operation::CheckActiveSession))?;
    tracing::debug!(events = events.len(), "controller resumed");
    Ok(ctrl)
}

/// Ask a yes/no question on stderr; anything but `y`/`yes` is no.
pub fn confirm(question: &str) -> std::io::Result<bool> {
    eprint!("{question} [y/N] ");
    std::io::stderr().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

/// Read one line from stdin after printing `prompt` to stderr.
pub fn prompt_line(prompt: &str) -> std::io::Result<String> {
    eprint!("{prompt}");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
