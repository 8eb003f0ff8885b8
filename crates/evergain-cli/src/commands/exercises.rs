use clap::Subcommand;
use evergain_core::api::WorkoutBackend;
use evergain_core::session::{describe, group_by_muscle};
use evergain_core::{AppContext, Operation};

use super::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum ExercisesAction {
    /// Exercises tagged with a session type
    List {
        session_type: String,
        /// Group by primary muscle
        #[arg(long, short)]
        grouped: bool,
        /// One human-readable line per exercise instead of JSON
        #[arg(long)]
        plain: bool,
    },
}

pub async fn run(action: ExercisesAction) -> CmdResult {
    let ctx = AppContext::load()?;

    match action {
        ExercisesAction::List {
            session_type,
            grouped,
            plain,
        } => {
            let exercises = ctx
                .api()
                .exercises(&session_type)
                .await
                .map_err(|e| e.alert(Operation::LoadExercises))?;

            match (grouped, plain) {
                (true, true) => {
                    for (muscle, list) in group_by_muscle(&exercises) {
                        println!("{muscle}");
                        for exercise in &list {
                            println!("  {}", describe(exercise));
                        }
                    }
                }
                (true, false) => print_json(&group_by_muscle(&exercises))?,
                (false, true) => {
                    for exercise in &exercises {
                        println!("{}", describe(exercise));
                    }
                }
                (false, false) => print_json(&exercises)?,
            }
        }
    }
    Ok(())
}
