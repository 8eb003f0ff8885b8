use chrono::Utc;
use clap::Subcommand;
use evergain_core::history::{
    relative_day, session_breakdown, HistoryPage, DEFAULT_HISTORY_LIMIT, SUMMARY_HISTORY_LIMIT,
};
use evergain_core::timer::format_elapsed;
use evergain_core::{AppContext, Operation};
use serde_json::json;

use super::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum HistoryAction {
    /// Recent sessions, most recent first
    List {
        #[arg(long, default_value_t = DEFAULT_HISTORY_LIMIT)]
        limit: u32,
    },
    /// Workout count, volume, time and the suggested next session
    Summary {
        #[arg(long, default_value_t = SUMMARY_HISTORY_LIMIT)]
        limit: u32,
    },
    /// Sets of one completed session, grouped by exercise
    Show {
        session_id: String,
    },
}

pub async fn run(action: HistoryAction) -> CmdResult {
    let ctx = AppContext::load()?;

    match action {
        HistoryAction::List { limit } => {
            let page = HistoryPage::fetch(ctx.api(), ctx.user_id(), limit)
                .await
                .map_err(|e| e.alert(Operation::LoadHistory))?;
            let now = Utc::now();
            let rows: Vec<_> = page
                .sessions
                .iter()
                .map(|s| {
                    json!({
                        "id": s.id,
                        "session_type": s.session_type,
                        "when": relative_day(s.started_at, now),
                        "started_at": s.started_at,
                        "total_sets": s.total_sets,
                        "total_volume": s.total_volume,
                        "duration": s
                            .duration_minutes
                            .map(|m| format_elapsed((m * 60.0).round().max(0.0) as u64)),
                    })
                })
                .collect();
            print_json(&rows)?;
        }
        HistoryAction::Summary { limit } => {
            let page = HistoryPage::fetch(ctx.api(), ctx.user_id(), limit)
                .await
                .map_err(|e| e.alert(Operation::LoadHistory))?;
            print_json(&page.summary)?;
        }
        HistoryAction::Show { session_id } => {
            let groups = session_breakdown(ctx.api(), &session_id)
                .await
                .map_err(|e| e.alert(Operation::LoadWorkoutSets))?;
            let rows: Vec<_> = groups
                .iter()
                .map(|(exercise, sets)| {
                    json!({
                        "exercise": exercise,
                        "sets": sets,
                        "volume": sets.iter().map(|s| s.effective_volume()).sum::<f64>(),
                    })
                })
                .collect();
            print_json(&rows)?;
        }
    }
    Ok(())
}
