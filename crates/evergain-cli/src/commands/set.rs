use chrono::Utc;
use clap::Subcommand;
use evergain_core::{AppContext, CoreError, Operation};
use serde_json::json;

use super::{print_json, resumed_controller, CmdResult};

#[derive(Subcommand)]
pub enum SetAction {
    /// Log a set in the active session
    Log {
        /// Exercise name (defaults to the first exercise of the session type)
        #[arg(long, short)]
        exercise: Option<String>,
        /// Weight in kg
        #[arg(long, short)]
        weight: Option<String>,
        /// Repetitions
        #[arg(long, short)]
        reps: Option<String>,
        /// Perceived effort, 1-10
        #[arg(long)]
        rpe: Option<String>,
        /// Free-text note
        #[arg(long)]
        note: Option<String>,
        /// Reuse weight, reps and RPE of the previous set
        #[arg(long, conflicts_with_all = ["weight", "reps"])]
        repeat: bool,
    },
    /// Show the previous set and next set number for an exercise
    Last {
        #[arg(long, short)]
        exercise: String,
    },
    /// List sets logged in the active session
    List,
}

pub async fn run(action: SetAction) -> CmdResult {
    let ctx = AppContext::load()?;
    let mut ctrl = resumed_controller(&ctx).await?;

    match action {
        SetAction::Log {
            exercise,
            weight,
            reps,
            rpe,
            note,
            repeat,
        } => {
            if let Some(name) = exercise {
                ctrl.select_exercise(&name)
                    .await
                    .map_err(|e| e.alert(Operation::LoadPreviousSet))?;
            }
            if repeat {
                ctrl.repeat_last_set()
                    .map_err(|e| CoreError::from(e).alert(Operation::LogSet))?;
            }
            if let Some(weight) = weight {
                ctrl.set_weight_input(&weight);
            }
            if let Some(reps) = reps {
                ctrl.set_reps_input(&reps);
            }
            if let Some(rpe) = rpe {
                ctrl.set_rpe_input(&rpe);
            }
            if let Some(note) = note {
                ctrl.set_note(&note);
            }

            let events = ctrl.log_set().await.map_err(|e| e.alert(Operation::LogSet))?;
            print_json(&events)?;
        }
        SetAction::Last { exercise } => {
            ctrl.select_exercise(&exercise)
                .await
                .map_err(|e| e.alert(Operation::LoadPreviousSet))?;
            print_json(&json!({
                "exercise": ctrl.selected_exercise(),
                "previous_set": ctrl.format_previous_set(),
                "next_set_number": ctrl.next_set_number(),
            }))?;
        }
        SetAction::List => {
            if ctrl.session().is_none() {
                return Err(CoreError::from(evergain_core::ValidationError::NoActiveSession)
                    .alert(Operation::LoadWorkoutSets)
                    .into());
            }
            print_json(ctrl.logged_sets())?;
            eprintln!(
                "{} sets, elapsed {}",
                ctrl.logged_sets().len(),
                ctrl.session_duration(Utc::now()).unwrap_or_default()
            );
        }
    }
    Ok(())
}
