use clap::Subcommand;
use gymdesk_core::{Config, CoreError};

use super::workout::{load_pool, runtime};

#[derive(Subcommand)]
pub enum ExerciseAction {
    /// List the exercise pool
    List {
        #[arg(long)]
        json: bool,
    },
    /// Show where the pool is loaded from
    Source,
}

pub fn run(action: ExerciseAction) -> Result<(), CoreError> {
    let config = Config::load()?;
    match action {
        ExerciseAction::List { json } => {
            let pool = runtime()?.block_on(load_pool(&config))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&pool)?);
            } else if pool.is_empty() {
                println!("No exercises.");
            } else {
                for exercise in &pool {
                    println!("{:<24} {}", exercise.name, exercise.video);
                }
            }
        }
        ExerciseAction::Source => {
            println!("{}", config.workout.pool_source()?.describe());
        }
    }
    Ok(())
}
