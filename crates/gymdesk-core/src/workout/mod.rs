mod exercise;
mod generator;
mod level;
mod timer;

pub use exercise::{name_from_file, Exercise};
pub use generator::{exercises_per_round, GeneratedWorkout, RoundPlan, WorkoutGenerator, MIN_ROUNDS};
pub use level::{Level, LevelConfig, LevelTable, ALLOWED_DURATIONS};
pub use timer::{AudioCue, IntervalTimer, Phase, VideoCue, DEFAULT_COUNTDOWN_SECS};
