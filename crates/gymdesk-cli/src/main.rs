use chrono::NaiveDateTime;
use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod context;

#[derive(Parser)]
#[command(name = "gymdesk", version, about = "gymdesk trainer CLI")]
struct Cli {
    /// Override the current local time (e.g. 2024-06-15T09:30:00)
    #[arg(long, global = true)]
    now: Option<NaiveDateTime>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Weekly circuit class: countdown, bookings, attendance
    Class {
        #[command(subcommand)]
        action: commands::class::ClassAction,
    },
    /// Trainer-side member and attendance management
    Admin {
        #[command(subcommand)]
        action: commands::admin::AdminAction,
    },
    /// Interval workout generator and player
    Workout {
        #[command(subcommand)]
        action: commands::workout::WorkoutAction,
    },
    /// Exercise pool
    Exercise {
        #[command(subcommand)]
        action: commands::exercise::ExerciseAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("GYMDESK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let now = cli.now;
    let result = match cli.command {
        Commands::Class { action } => commands::class::run(action, now),
        Commands::Admin { action } => commands::admin::run(action, now),
        Commands::Workout { action } => commands::workout::run(action),
        Commands::Exercise { action } => commands::exercise::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "gymdesk", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
