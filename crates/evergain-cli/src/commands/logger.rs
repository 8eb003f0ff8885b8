//! Interactive logger: one task owns the controller and the tick scheduler
//! and multiplexes stdin commands with clock and rest ticks.

use std::io::Write;

use chrono::Utc;
use evergain_core::api::ApiClient;
use evergain_core::session::describe;
use evergain_core::{
    AppContext, CoreError, Event, Operation, PendingEnd, SessionController, TickScheduler,
    TickSlot,
};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::CmdResult;

const HELP: &str = "\
commands:
  start <type>          start a session (Push, Pull, Legs, ...)
  exercises             list exercises of the session type
  select <exercise>     switch exercise
  w <kg> | r <reps> | rpe <1-10> | note <text>
  log [kg reps [rpe]]   log the current inputs as a set
  repeat                copy the previous set into the inputs
  rest [secs|stop]      start, restart or stop the rest timer
  duration <secs>       change the rest duration
  status                session summary
  watch                 toggle the live clock line
  end                   end the session (asks for confirmation)
  help | quit";

enum Flow {
    Continue,
    Quit,
}

/// One read from stdin, classified.
#[derive(Debug, PartialEq)]
enum Input {
    Line(String),
    Eof,
    /// The line was unreadable and has been reported; prompt again.
    Skipped,
}

/// Undecodable lines are reported and skipped; any other read error ends the loop.
fn classify(read: std::io::Result<Option<String>>) -> std::io::Result<Input> {
    match read {
        Ok(Some(line)) => Ok(Input::Line(line)),
        Ok(None) => Ok(Input::Eof),
        Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
            eprintln!("ignored input: {e}");
            Ok(Input::Skipped)
        }
        Err(e) => Err(e),
    }
}

struct Logger {
    ctrl: SessionController<ApiClient>,
    ticks: TickScheduler,
    pending_end: Option<PendingEnd>,
    watch: bool,
}

pub async fn run() -> CmdResult {
    let ctx = AppContext::load()?;
    let mut logger = Logger {
        ctrl: ctx.controller(),
        ticks: TickScheduler::every_second(),
        pending_end: None,
        watch: false,
    };

    match logger.ctrl.check_active_on_launch().await {
        Ok(events) => logger.show_events(&events),
        Err(e) => alert(&e, Operation::CheckActiveSession),
    }
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        logger.sync_ticks();
        prompt()?;

        tokio::select! {
            read = lines.next_line() => match classify(read)? {
                Input::Line(line) => {
                    if let Flow::Quit = logger.handle(line.trim()).await {
                        break;
                    }
                }
                Input::Eof => break,
                Input::Skipped => {}
            },
            slot = logger.ticks.next() => logger.on_tick(slot),
        }
    }

    logger.ticks.cancel_all();
    Ok(())
}

fn prompt() -> std::io::Result<()> {
    let mut out = std::io::stdout();
    write!(out, "> ")?;
    out.flush()
}

fn alert(err: &CoreError, op: Operation) {
    eprintln!("{}", err.alert(op));
}

impl Logger {
    fn sync_ticks(&mut self) {
        for slot in [TickSlot::SessionClock, TickSlot::Rest] {
            self.ticks.sync(slot, self.ctrl.wants_tick(slot));
        }
    }

    fn on_tick(&mut self, slot: TickSlot) {
        if let Some(event) = self.ctrl.on_tick(slot) {
            println!();
            self.show_event(&event);
            return;
        }
        if self.watch && slot == TickSlot::SessionClock {
            let elapsed = self.ctrl.session_duration(Utc::now()).unwrap_or_default();
            let rest = if self.ctrl.rest().is_running() {
                format!(" | rest {}", self.ctrl.rest().display())
            } else {
                String::new()
            };
            print!("\r{elapsed}{rest}  ");
            let _ = std::io::stdout().flush();
        }
    }

    fn show_events(&self, events: &[Event]) {
        for event in events {
            self.show_event(event);
        }
    }

    fn show_event(&self, event: &Event) {
        match event {
            Event::SessionStarted { session_id, session_type, .. } => {
                println!("started {session_type} session {session_id}");
            }
            Event::SessionRestored { session_type, total_sets, total_volume, .. } => {
                println!("resumed {session_type} session: {total_sets} sets, {total_volume} volume");
            }
            Event::SessionEnded { duration_minutes, total_sets, total_volume, .. } => {
                let minutes = duration_minutes.map_or_else(|| "?".to_string(), |m| format!("{m:.0}"));
                println!("session ended: {minutes} min, {total_sets} sets, {total_volume} volume");
            }
            Event::ExercisesLoaded { session_type, count } => {
                println!("{count} exercises for {session_type}");
            }
            Event::ExercisesUnavailable { message, .. } => eprintln!("{message}"),
            Event::ExerciseSelected { exercise_name, next_set_number, .. } => {
                println!(
                    "{exercise_name}: set {next_set_number}, last {}",
                    self.ctrl.format_previous_set()
                );
            }
            Event::SetLogged { exercise_name, set_number, weight, reps, total_sets, total_volume, .. } => {
                println!(
                    "logged {exercise_name} #{set_number}: {weight}kg × {reps} (session {total_sets} sets, {total_volume} volume)"
                );
            }
            Event::RestStarted { duration_secs, .. } => println!("rest {duration_secs}s"),
            Event::RestStopped { .. } => println!("rest stopped"),
            Event::RestCompleted { .. } => println!("rest over, next set!"),
            Event::RestDurationChanged { duration_secs } => {
                println!("rest duration {duration_secs}s");
            }
        }
    }

    async fn handle(&mut self, line: &str) -> Flow {
        let (cmd, arg) = line.split_once(' ').unwrap_or((line, ""));
        let arg = arg.trim();

        if let Some(pending) = self.pending_end.take() {
            match cmd {
                "y" | "yes" => match self.ctrl.confirm_end(pending).await {
                    Ok(event) => self.show_event(&event),
                    Err(e) => alert(&e, Operation::EndSession),
                },
                _ => {
                    self.ctrl.cancel_end(pending);
                    println!("session kept open");
                }
            }
            return Flow::Continue;
        }

        match cmd {
            "" => {}
            "help" | "?" => println!("{HELP}"),
            "quit" | "exit" | "q" => return Flow::Quit,
            "start" => match self.ctrl.start(arg).await {
                Ok(events) => self.show_events(&events),
                Err(e) => alert(&e, Operation::StartSession),
            },
            "exercises" => {
                for (muscle, list) in self.ctrl.exercises_by_muscle() {
                    println!("{muscle}");
                    for exercise in &list {
                        println!("  {}", describe(exercise));
                    }
                }
            }
            "select" => match self.ctrl.select_exercise(arg).await {
                Ok(Some(event)) => self.show_event(&event),
                Ok(None) => {}
                Err(e) => alert(&e, Operation::LoadPreviousSet),
            },
            "w" => {
                self.ctrl.set_weight_input(arg);
                self.show_live_volume();
            }
            "r" => {
                self.ctrl.set_reps_input(arg);
                self.show_live_volume();
            }
            "rpe" => self.ctrl.set_rpe_input(arg),
            "note" => self.ctrl.set_note(arg),
            "repeat" => match self.ctrl.repeat_last_set() {
                Ok(()) => self.show_live_volume(),
                Err(e) => alert(&CoreError::from(e), Operation::LogSet),
            },
            "log" => {
                let mut parts = arg.split_whitespace();
                if let (Some(weight), Some(reps)) = (parts.next(), parts.next()) {
                    self.ctrl.set_weight_input(weight);
                    self.ctrl.set_reps_input(reps);
                    if let Some(rpe) = parts.next() {
                        self.ctrl.set_rpe_input(rpe);
                    }
                }
                match self.ctrl.log_set().await {
                    Ok(events) => self.show_events(&events),
                    Err(e) => alert(&e, Operation::LogSet),
                }
            }
            "rest" => match arg {
                "stop" => match self.ctrl.stop_rest() {
                    Some(event) => self.show_event(&event),
                    None => println!("rest timer is idle"),
                },
                "" => {
                    let event = self.ctrl.start_rest();
                    self.show_event(&event);
                }
                secs => {
                    self.ctrl.set_rest_duration_from_input(secs);
                    let event = self.ctrl.start_rest();
                    self.show_event(&event);
                }
            },
            "duration" => {
                let event = self.ctrl.set_rest_duration_from_input(arg);
                self.show_event(&event);
            }
            "status" => match serde_json::to_string_pretty(&self.ctrl.status(Utc::now())) {
                Ok(json) => println!("{json}"),
                Err(e) => eprintln!("error: {e}"),
            },
            "watch" => {
                self.watch = !self.watch;
                println!("live clock {}", if self.watch { "on" } else { "off" });
            }
            "end" => match self.ctrl.request_end() {
                Ok(pending) => {
                    println!(
                        "end session after {}? [y/N]",
                        self.ctrl.session_duration(Utc::now()).unwrap_or_default()
                    );
                    self.pending_end = Some(pending);
                }
                Err(e) => alert(&CoreError::from(e), Operation::EndSession),
            },
            other => eprintln!("unknown command '{other}', try 'help'"),
        }
        Flow::Continue
    }

    fn show_live_volume(&self) {
        let inputs = self.ctrl.inputs();
        println!(
            "set {}: {} × {} = {} volume",
            self.ctrl.next_set_number(),
            inputs.weight,
            inputs.reps,
            self.ctrl.live_volume()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn invalid_utf8_line_is_skipped() {
        let bytes: &[u8] = b"\xff\xfe log\n";
        let mut lines = BufReader::new(bytes).lines();
        let read = lines.next_line().await;
        assert!(read.is_err());
        assert_eq!(classify(read).unwrap(), Input::Skipped);
    }

    #[tokio::test]
    async fn lines_and_eof_pass_through() {
        let bytes: &[u8] = b"status\n";
        let mut lines = BufReader::new(bytes).lines();
        assert_eq!(
            classify(lines.next_line().await).unwrap(),
            Input::Line("status".into())
        );
        assert_eq!(classify(lines.next_line().await).unwrap(), Input::Eof);
    }

    #[test]
    fn other_read_errors_end_the_session() {
        let broken = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed");
        assert!(classify(Err(broken)).is_err());
    }
}
