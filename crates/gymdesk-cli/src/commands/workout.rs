use std::time::Duration;

use chrono::Utc;
use clap::Subcommand;
use gymdesk_core::{
    AudioCue, Config, CoreError, Event, Exercise, GeneratedWorkout, IntervalTimer, Level, Phase,
    VideoCue, WorkoutError,
};
use rand::SeedableRng;
use rand_pcg::Pcg64;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{Interval, MissedTickBehavior};

use crate::context::AppContext;

const LAST_WORKOUT_KEY: &str = "last_workout";

#[derive(Subcommand)]
pub enum WorkoutAction {
    /// Compose a workout from the exercise pool
    Generate {
        #[arg(long, default_value = "beginner")]
        level: Level,
        /// Length in minutes (10, 15, 20, 30 or 45)
        #[arg(long, default_value_t = 10)]
        minutes: u32,
        /// Seed for a reproducible selection
        #[arg(long)]
        seed: Option<u64>,
        /// Pick new exercises for the last workout, keeping its level and length
        #[arg(long, conflicts_with_all = ["level", "minutes"])]
        reshuffle: bool,
        #[arg(long)]
        json: bool,
    },
    /// Play a workout. Type "p" + Enter to pause/resume, "q" to quit.
    Run {
        #[arg(long, default_value = "beginner")]
        level: Level,
        #[arg(long, default_value_t = 10)]
        minutes: u32,
        #[arg(long)]
        seed: Option<u64>,
        /// Replay the last generated workout
        #[arg(long)]
        last: bool,
        /// Tick every 10ms instead of every second
        #[arg(long)]
        fast: bool,
        /// Emit one JSON event per line
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: WorkoutAction) -> Result<(), CoreError> {
    let ctx = AppContext::open(None)?;
    let rt = runtime()?;
    match action {
        WorkoutAction::Generate {
            level,
            minutes,
            seed,
            reshuffle,
            json,
        } => {
            let workout = if reshuffle {
                let previous = last_workout(&ctx)?;
                rt.block_on(reshuffle_workout(&ctx.config, &previous, seed))?
            } else {
                rt.block_on(generate(&ctx.config, level, minutes, seed))?
            };
            ctx.db
                .kv_set(LAST_WORKOUT_KEY, &serde_json::to_string(&workout)?)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&workout)?);
            } else {
                print_workout(&workout);
            }
        }
        WorkoutAction::Run {
            level,
            minutes,
            seed,
            last,
            fast,
            json,
        } => {
            let workout = if last {
                last_workout(&ctx)?
            } else {
                let workout = rt.block_on(generate(&ctx.config, level, minutes, seed))?;
                ctx.db
                    .kv_set(LAST_WORKOUT_KEY, &serde_json::to_string(&workout)?)?;
                workout
            };

            render(&generated_event(&workout), json)?;
            let timer = IntervalTimer::with_countdown(workout, ctx.config.workout.countdown_secs);
            let period = if fast {
                Duration::from_millis(10)
            } else {
                Duration::from_secs(1)
            };
            rt.block_on(play(timer, period, json))?;
        }
    }
    Ok(())
}

pub(crate) fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}

pub(crate) async fn load_pool(config: &Config) -> Result<Vec<Exercise>, CoreError> {
    let source = config.workout.pool_source()?;
    tracing::debug!(source = %source.describe(), "loading exercise pool");
    Ok(source.fetch().await.map_err(WorkoutError::from)?)
}

fn last_workout(ctx: &AppContext) -> Result<GeneratedWorkout, CoreError> {
    let stored = ctx
        .db
        .kv_get(LAST_WORKOUT_KEY)?
        .ok_or(WorkoutError::NothingToReplay)?;
    Ok(serde_json::from_str(&stored)?)
}

fn rng(seed: Option<u64>) -> Pcg64 {
    match seed {
        Some(seed) => Pcg64::seed_from_u64(seed),
        None => Pcg64::from_entropy(),
    }
}

async fn generate(
    config: &Config,
    level: Level,
    minutes: u32,
    seed: Option<u64>,
) -> Result<GeneratedWorkout, CoreError> {
    let pool = load_pool(config).await?;
    Ok(config
        .workout
        .generator()
        .generate(level, minutes, &pool, &mut rng(seed))?)
}

async fn reshuffle_workout(
    config: &Config,
    previous: &GeneratedWorkout,
    seed: Option<u64>,
) -> Result<GeneratedWorkout, CoreError> {
    let pool = load_pool(config).await?;
    Ok(config
        .workout
        .generator()
        .reshuffle(previous, &pool, &mut rng(seed))?)
}

fn generated_event(workout: &GeneratedWorkout) -> Event {
    Event::WorkoutGenerated {
        level: workout.level,
        duration_min: workout.duration_min,
        exercises: workout.exercises.iter().map(|e| e.name.clone()).collect(),
        round_count: workout.round_count,
        at: Utc::now(),
    }
}

/// Drive the timer until it completes or is stopped.
async fn play(
    mut timer: IntervalTimer,
    period: Duration,
    json: bool,
) -> Result<Phase, CoreError> {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick resolves immediately.
    ticker.tick().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    while !timer.phase().is_terminal() {
        tokio::select! {
            _ = ticker.tick() => {
                for event in timer.tick() {
                    render(&event, json)?;
                }
            }
            line = lines.next_line(), if stdin_open => match line? {
                Some(command) => {
                    if let Some(event) = apply_command(&mut timer, &mut ticker, &command) {
                        render(&event, json)?;
                    }
                }
                None => stdin_open = false,
            },
            _ = tokio::signal::ctrl_c() => {
                if let Some(event) = timer.stop() {
                    render(&event, json)?;
                }
            }
        }
    }
    Ok(timer.phase())
}

/// Handle one line typed during playback. Resuming restarts the tick
/// period, so the first second after a pause is a whole second.
fn apply_command(timer: &mut IntervalTimer, ticker: &mut Interval, command: &str) -> Option<Event> {
    match command.trim() {
        "p" => {
            let event = timer.toggle_pause();
            if matches!(event, Some(Event::TimerResumed { .. })) {
                ticker.reset();
            }
            event
        }
        "q" => timer.stop(),
        "s" => Some(timer.snapshot()),
        _ => None,
    }
}

fn print_workout(workout: &GeneratedWorkout) {
    println!(
        "{} {} min: {} rounds x {} exercises ({}s work / {}s rest)",
        workout.level,
        workout.duration_min,
        workout.round_count,
        workout.exercises_per_round(),
        workout.level_config.work_secs,
        workout.level_config.rest_secs
    );
    for (i, exercise) in workout.exercises.iter().enumerate() {
        println!("  {:>2}. {}", i + 1, exercise.name);
    }
}

fn render(event: &Event, json: bool) -> Result<(), serde_json::Error> {
    if json {
        println!("{}", serde_json::to_string(event)?);
        return Ok(());
    }
    match event {
        Event::WorkoutGenerated {
            level,
            duration_min,
            round_count,
            ..
        } => println!("{level} workout, {duration_min} min, {round_count} rounds. Get ready!"),
        Event::Cue { cue: AudioCue::Tick } => println!("  beep"),
        Event::Cue { cue: AudioCue::Go } => println!("  GO!"),
        Event::RoundStarted { round, round_count } => println!("== Round {round}/{round_count} =="),
        Event::PhaseStarted {
            phase: Phase::Work,
            duration_secs,
            video: VideoCue::Play { exercise, video },
            ..
        } => println!("Work {duration_secs}s: {exercise} [{video}]"),
        Event::PhaseStarted {
            phase: Phase::Rest,
            duration_secs,
            video,
            ..
        } => match video {
            VideoCue::UpNext {
                exercise: Some(next),
            } => println!("Rest {duration_secs}s, up next: {next}"),
            _ => println!("Rest {duration_secs}s"),
        },
        Event::PhaseStarted { .. } => {}
        Event::TimerPaused { time_left, .. } => println!("Paused ({time_left}s left)"),
        Event::TimerResumed { time_left, .. } => println!("Resumed ({time_left}s left)"),
        Event::WorkoutCompleted { rounds, .. } => println!("Workout complete: {rounds} rounds"),
        Event::WorkoutStopped { round, .. } => println!("Workout stopped in round {round}"),
        Event::TimerSnapshot {
            phase,
            round,
            round_count,
            exercise,
            time_left,
            progress_pct,
            ..
        } => println!(
            "{phase:?} round {round}/{round_count} {} {time_left}s ({progress_pct:.0}%)",
            exercise.as_deref().unwrap_or("-")
        ),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gymdesk_core::LevelConfig;

    fn workout() -> GeneratedWorkout {
        GeneratedWorkout {
            level: Level::Beginner,
            duration_min: 10,
            level_config: LevelConfig::new(30, 30),
            exercises: vec![Exercise::new("Squat", "squat.mp4")],
            round_count: 10,
            total_intervals: 10,
        }
    }

    #[test]
    fn resume_waits_a_full_period_before_the_next_tick() {
        let rt = runtime().unwrap();
        rt.block_on(async {
            let mut timer = IntervalTimer::with_countdown(workout(), 3);
            let mut ticker = tokio::time::interval(Duration::from_millis(100));
            ticker.tick().await;

            let paused = apply_command(&mut timer, &mut ticker, "p");
            assert!(matches!(paused, Some(Event::TimerPaused { time_left: 3, .. })));
            // A tick is overdue by the time playback resumes.
            tokio::time::sleep(Duration::from_millis(150)).await;

            let resumed = apply_command(&mut timer, &mut ticker, "p\n");
            assert!(matches!(resumed, Some(Event::TimerResumed { time_left: 3, .. })));
            let early = tokio::time::timeout(Duration::from_millis(40), ticker.tick()).await;
            assert!(early.is_err());
            ticker.tick().await;
        });
    }

    #[test]
    fn unknown_commands_are_ignored() {
        let rt = runtime().unwrap();
        rt.block_on(async {
            let mut timer = IntervalTimer::with_countdown(workout(), 3);
            let mut ticker = tokio::time::interval(Duration::from_secs(1));
            assert!(apply_command(&mut timer, &mut ticker, "x").is_none());
            assert!(matches!(
                apply_command(&mut timer, &mut ticker, " s "),
                Some(Event::TimerSnapshot { .. })
            ));
            assert!(matches!(
                apply_command(&mut timer, &mut ticker, "q"),
                Some(Event::WorkoutStopped { .. })
            ));
            assert_eq!(timer.phase(), Phase::Stopped);
        });
    }
}
