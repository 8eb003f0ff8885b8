use chrono::Utc;
use clap::Subcommand;
use evergain_core::api::WorkoutBackend;
use evergain_core::{AppContext, CoreError, Operation};

use super::{confirm, print_json, resumed_controller, CmdResult};

#[derive(Subcommand)]
pub enum SessionAction {
    /// Start a session of the given type (e.g. Push, Pull, Legs)
    Start {
        session_type: String,
    },
    /// Print the active session as JSON
    Status,
    /// End the active session
    End {
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// List session types by category
    Types,
}

pub async fn run(action: SessionAction) -> CmdResult {
    let ctx = AppContext::load()?;

    match action {
        SessionAction::Start { session_type } => {
            let mut ctrl = resumed_controller(&ctx).await?;
            let events = ctrl
                .start(&session_type)
                .await
                .map_err(|e| e.alert(Operation::StartSession))?;
            print_json(&events)?;
        }
        SessionAction::Status => {
            let ctrl = resumed_controller(&ctx).await?;
            print_json(&ctrl.status(Utc::now()))?;
        }
        SessionAction::End { yes } => {
            let mut ctrl = resumed_controller(&ctx).await?;
            let pending = ctrl
                .request_end()
                .map_err(|e| CoreError::from(e).alert(Operation::EndSession))?;

            let question = format!(
                "End session {} ({})?",
                pending.session_id(),
                ctrl.session_duration(Utc::now()).unwrap_or_default()
            );
            if !yes && !confirm(&question)? {
                ctrl.cancel_end(pending);
                println!("session kept open");
                return Ok(());
            }

            let event = ctrl
                .confirm_end(pending)
                .await
                .map_err(|e| e.alert(Operation::EndSession))?;
            print_json(&event)?;
        }
        SessionAction::Types => {
            let types = ctx
                .api()
                .session_types()
                .await
                .map_err(|e| e.alert(Operation::LoadSessionTypes))?;
            print_json(&types)?;
        }
    }
    Ok(())
}
