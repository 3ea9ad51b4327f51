use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workout::{AudioCue, Level, Phase, VideoCue};

/// Every state change of the workout player produces an Event.
/// The UI layer renders them; audio and video cues ride along.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    WorkoutGenerated {
        level: Level,
        duration_min: u32,
        exercises: Vec<String>,
        round_count: u32,
        at: DateTime<Utc>,
    },
    /// Sound to play now. No acknowledgment expected.
    Cue {
        cue: AudioCue,
    },
    PhaseStarted {
        phase: Phase,
        round: u32,
        exercise_index: usize,
        duration_secs: u32,
        video: VideoCue,
    },
    RoundStarted {
        round: u32,
        round_count: u32,
    },
    TimerPaused {
        time_left: u32,
        at: DateTime<Utc>,
    },
    TimerResumed {
        time_left: u32,
        at: DateTime<Utc>,
    },
    WorkoutCompleted {
        rounds: u32,
        ticks: u64,
        at: DateTime<Utc>,
    },
    /// Explicit stop before completion; remaining state is discarded.
    WorkoutStopped {
        phase: Phase,
        round: u32,
        exercise_index: usize,
        at: DateTime<Utc>,
    },
    TimerSnapshot {
        phase: Phase,
        paused: bool,
        round: u32,
        round_count: u32,
        exercise_index: usize,
        exercise: Option<String>,
        time_left: u32,
        phase_secs: u32,
        progress_pct: f64,
        video: VideoCue,
    },
}
