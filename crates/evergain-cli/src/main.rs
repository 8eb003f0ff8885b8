use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "evergain", version, about = "Evergain workout logger")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start, inspect and end workout sessions
    Session {
        #[command(subcommand)]
        action: commands::session::SessionAction,
    },
    /// Log and inspect sets in the active session
    Set {
        #[command(subcommand)]
        action: commands::set::SetAction,
    },
    /// Rest timer
    Rest {
        #[command(subcommand)]
        action: commands::rest::RestAction,
    },
    /// Exercise catalogue
    Exercises {
        #[command(subcommand)]
        action: commands::exercises::ExercisesAction,
    },
    /// Completed sessions
    History {
        #[command(subcommand)]
        action: commands::history::HistoryAction,
    },
    /// Account sign-in
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Interactive logger with live session clock and rest countdown
    Logger,
    /// Print shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("EVERGAIN_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Session { action } => commands::session::run(action).await,
        Commands::Set { action } => commands::set::run(action).await,
        Commands::Rest { action } => commands::rest::run(action).await,
        Commands::Exercises { action } => commands::exercises::run(action).await,
        Commands::History { action } => commands::history::run(action).await,
        Commands::Auth { action } => commands::auth::run(action).await,
        Commands::Config { action } => commands::config::run(action),
        Commands::Logger => commands::logger::run().await,
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "evergain", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
