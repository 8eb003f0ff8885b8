use std::io::Write;

use clap::Subcommand;
use evergain_core::timer::{parse_rest_input, REST_PRESETS_SECS};
use evergain_core::{Config, Event, RestTimer, RestTrigger, TickScheduler, TickSlot};

use super::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum RestAction {
    /// Run a rest countdown in the foreground (Ctrl-C stops it)
    Run {
        /// Duration in seconds; defaults to rest.default_secs
        #[arg(long, short)]
        secs: Option<String>,
    },
    /// List the preset durations
    Presets,
}

pub async fn run(action: RestAction) -> CmdResult {
    match action {
        RestAction::Run { secs } => {
            let duration = match secs {
                Some(input) => parse_rest_input(&input),
                None => Config::load_or_default().rest.default_secs,
            };
            countdown(duration).await
        }
        RestAction::Presets => print_json(&REST_PRESETS_SECS),
    }
}

async fn countdown(duration: u32) -> CmdResult {
    let mut timer = RestTimer::new(duration);
    let mut ticks = TickScheduler::every_second();
    let started = timer.start(RestTrigger::Manual);
    tracing::debug!(?started, "rest countdown");
    ticks.arm(TickSlot::Rest);

    let mut stderr = std::io::stderr();
    loop {
        write!(stderr, "\rrest {}", timer.display())?;
        stderr.flush()?;

        tokio::select! {
            slot = ticks.next() => {
                if let Some(event @ Event::RestCompleted { .. }) = timer.tick() {
                    ticks.cancel(slot);
                    writeln!(stderr, "\rrest 00:00")?;
                    return print_json(&event);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                ticks.cancel_all();
                writeln!(stderr)?;
                if let Some(event) = timer.stop() {
                    print_json(&event)?;
                }
                return Ok(());
            }
        }
    }
}
