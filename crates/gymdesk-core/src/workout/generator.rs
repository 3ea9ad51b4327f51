//! Interval workout generator.
//!
//! Turns a level, a duration and an exercise pool into a workout: a random
//! non-repeating subset of exercises repeated for a number of rounds. The
//! random source is injected so callers (and tests) control determinism.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::exercise::Exercise;
use super::level::{Level, LevelConfig, LevelTable, ALLOWED_DURATIONS};
use crate::error::WorkoutError;

/// Minimum rounds in a workout; round progress needs at least two.
pub const MIN_ROUNDS: u32 = 2;

/// How a duration breaks down into intervals and rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundPlan {
    pub interval_secs: u32,
    pub total_intervals: u32,
    pub exercises_per_round: u32,
    pub round_count: u32,
}

impl RoundPlan {
    /// Plan a workout of `duration_min` minutes for a pool of `pool_size`
    /// distinct exercises.
    pub fn compute(
        level: LevelConfig,
        duration_min: u32,
        pool_size: usize,
    ) -> Result<Self, WorkoutError> {
        if level.work_secs == 0 {
            return Err(WorkoutError::InvalidConfiguration(
                "work phase must be at least one second".into(),
            ));
        }
        let too_large = || {
            WorkoutError::InvalidConfiguration(format!(
                "{duration_min} minutes at {}s/{}s is out of range",
                level.work_secs, level.rest_secs
            ))
        };
        let interval_secs = u32::try_from(level.interval_secs()).map_err(|_| too_large())?;
        let total_intervals = u32::try_from(u64::from(duration_min) * 60 / u64::from(interval_secs))
            .map_err(|_| too_large())?;
        if total_intervals == 0 {
            return Err(WorkoutError::InvalidConfiguration(format!(
                "{duration_min} minutes is shorter than one {interval_secs}s interval"
            )));
        }

        let pool_size = u32::try_from(pool_size).unwrap_or(u32::MAX);
        let exercises_per_round = exercises_per_round(total_intervals).min(pool_size).max(1);
        let round_count = (total_intervals / exercises_per_round).max(MIN_ROUNDS);

        Ok(Self {
            interval_secs,
            total_intervals,
            exercises_per_round,
            round_count,
        })
    }
}

/// Tiered exercises-per-round rule.
///
/// Short workouts use few exercises so rounds repeat; longer ones are capped
/// to keep a round manageable.
pub fn exercises_per_round(total_intervals: u32) -> u32 {
    let half = total_intervals / 2;
    match total_intervals {
        0..=6 => half.max(3),
        7..=12 => half.min(6),
        _ => half.min(10),
    }
}

/// An ephemeral workout composition. The CLI keeps only the last one, for replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedWorkout {
    pub level: Level,
    pub duration_min: u32,
    pub level_config: LevelConfig,
    /// Exercises of one round, in order. The same list repeats every round.
    pub exercises: Vec<Exercise>,
    pub round_count: u32,
    pub total_intervals: u32,
}

impl GeneratedWorkout {
    pub fn exercises_per_round(&self) -> usize {
        self.exercises.len()
    }

    /// Seconds from the first work phase to completion.
    pub fn active_secs(&self) -> u64 {
        u64::from(self.round_count)
            .saturating_mul(self.exercises.len() as u64)
            .saturating_mul(self.level_config.interval_secs())
    }
}

/// Generator bound to a level table and the allowed durations.
#[derive(Debug, Clone)]
pub struct WorkoutGenerator {
    levels: LevelTable,
    durations: Vec<u32>,
}

impl Default for WorkoutGenerator {
    fn default() -> Self {
        Self::new(LevelTable::default(), ALLOWED_DURATIONS.to_vec())
    }
}

impl WorkoutGenerator {
    pub fn new(levels: LevelTable, durations: Vec<u32>) -> Self {
        Self { levels, durations }
    }

    pub fn levels(&self) -> &LevelTable {
        &self.levels
    }

    /// Compose a workout.
    ///
    /// # Errors
    /// `EmptyPool` when `pool` has no exercises, `InvalidConfiguration` when
    /// the duration is not offered or is shorter than one interval.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        level: Level,
        duration_min: u32,
        pool: &[Exercise],
        rng: &mut R,
    ) -> Result<GeneratedWorkout, WorkoutError> {
        if !self.durations.contains(&duration_min) {
            return Err(WorkoutError::InvalidConfiguration(format!(
                "{duration_min} minutes is not one of {:?}",
                self.durations
            )));
        }

        let mut candidates = distinct_by_name(pool);
        if candidates.is_empty() {
            return Err(WorkoutError::EmptyPool);
        }

        let level_config = self.levels.get(level);
        let plan = RoundPlan::compute(level_config, duration_min, candidates.len())?;

        candidates.shuffle(rng);
        candidates.truncate(plan.exercises_per_round as usize);

        tracing::debug!(
            %level,
            duration_min,
            total_intervals = plan.total_intervals,
            per_round = plan.exercises_per_round,
            rounds = plan.round_count,
            "workout generated"
        );

        Ok(GeneratedWorkout {
            level,
            duration_min,
            level_config,
            exercises: candidates,
            round_count: plan.round_count,
            total_intervals: plan.total_intervals,
        })
    }

    /// Regenerate with the same level and duration.
    pub fn reshuffle<R: Rng + ?Sized>(
        &self,
        previous: &GeneratedWorkout,
        pool: &[Exercise],
        rng: &mut R,
    ) -> Result<GeneratedWorkout, WorkoutError> {
        self.generate(previous.level, previous.duration_min, pool, rng)
    }
}

/// Pool entries with duplicate names removed, first occurrence wins.
fn distinct_by_name(pool: &[Exercise]) -> Vec<Exercise> {
    let mut seen = HashSet::new();
    pool.iter()
        .filter(|e| seen.insert(e.name.as_str()))
        .cloned()
        .collect()
}
