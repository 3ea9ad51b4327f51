//! Interval timer for a generated workout.
//!
//! The timer is a discrete-event state machine. It has no clock and no
//! thread: every call to `tick()` is one elapsed second. The caller drives it
//! (a one-second interval in the CLI, manual ticks in tests).
//!
//! ## State Transitions
//!
//! ```text
//! Countdown -> Work -> Rest -> Work -> ... -> Rest -> Complete
//!      \________________________________________/
//!                        stop() -> Stopped
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut timer = IntervalTimer::new(workout);
//! // once per second:
//! for event in timer.tick() { render(event); }
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::generator::GeneratedWorkout;
use crate::events::Event;

/// Seconds of "get ready" before the first work phase.
pub const DEFAULT_COUNTDOWN_SECS: u32 = 3;

/// Work phases announce their last seconds with a tick cue.
const WARNING_SECS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Countdown,
    Work,
    Rest,
    Complete,
    /// Exited early via `stop()`.
    Stopped,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Complete | Phase::Stopped)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioCue {
    Tick,
    Go,
}

/// What the video pane should show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VideoCue {
    /// Demonstration of the exercise being worked.
    Play { exercise: String, video: String },
    /// Name of the upcoming exercise, `None` after the final interval.
    UpNext { exercise: Option<String> },
    Idle,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntervalTimer {
    workout: GeneratedWorkout,
    phase: Phase,
    /// Seconds left in the current phase.
    time_left: u32,
    /// 1-based round number.
    round: u32,
    exercise_index: usize,
    paused: bool,
    countdown_secs: u32,
    /// Ticks applied while not paused.
    ticks: u64,
}

impl IntervalTimer {
    pub fn new(workout: GeneratedWorkout) -> Self {
        Self::with_countdown(workout, DEFAULT_COUNTDOWN_SECS)
    }

    pub fn with_countdown(workout: GeneratedWorkout, countdown_secs: u32) -> Self {
        let countdown_secs = countdown_secs.max(1);
        Self {
            workout,
            phase: Phase::Countdown,
            time_left: countdown_secs,
            round: 1,
            exercise_index: 0,
            paused: false,
            countdown_secs,
            ticks: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn exercise_index(&self) -> usize {
        self.exercise_index
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn ticks_elapsed(&self) -> u64 {
        self.ticks
    }

    /// Full length of the current phase.
    pub fn phase_secs(&self) -> u32 {
        match self.phase {
            Phase::Countdown => self.countdown_secs,
            Phase::Work => self.workout.level_config.work_secs,
            Phase::Rest => self.workout.level_config.rest_secs,
            Phase::Complete | Phase::Stopped => 0,
        }
    }

    pub fn total_ticks(&self) -> u64 {
        u64::from(self.countdown_secs) + self.workout.active_secs()
    }

    /// 0.0 .. 100.0 progress across the whole workout.
    pub fn progress_pct(&self) -> f64 {
        if self.phase == Phase::Complete {
            return 100.0;
        }
        let total = self.total_ticks();
        if total == 0 {
            return 0.0;
        }
        (self.ticks as f64 / total as f64 * 100.0).min(100.0)
    }

    fn exercise_name(&self, index: usize) -> Option<String> {
        self.workout.exercises.get(index).map(|e| e.name.clone())
    }

    /// Exercise that follows the current one, across round boundaries.
    fn upcoming_index(&self) -> Option<usize> {
        if self.exercise_index + 1 < self.workout.exercises.len() {
            Some(self.exercise_index + 1)
        } else if self.round < self.workout.round_count {
            Some(0)
        } else {
            None
        }
    }

    pub fn video_cue(&self) -> VideoCue {
        match self.phase {
            Phase::Countdown => VideoCue::UpNext {
                exercise: self.exercise_name(0),
            },
            Phase::Work => match self.workout.exercises.get(self.exercise_index) {
                Some(e) => VideoCue::Play {
                    exercise: e.name.clone(),
                    video: e.video.clone(),
                },
                None => VideoCue::Idle,
            },
            Phase::Rest => VideoCue::UpNext {
                exercise: self.upcoming_index().and_then(|i| self.exercise_name(i)),
            },
            Phase::Complete | Phase::Stopped => VideoCue::Idle,
        }
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        let exercise = if self.phase.is_terminal() {
            None
        } else {
            self.exercise_name(self.exercise_index)
        };
        Event::TimerSnapshot {
            phase: self.phase,
            paused: self.paused,
            round: self.round,
            round_count: self.workout.round_count,
            exercise_index: self.exercise_index,
            exercise,
            time_left: self.time_left,
            phase_secs: self.phase_secs(),
            progress_pct: self.progress_pct(),
            video: self.video_cue(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Freeze progression. Phase, counters and `time_left` are untouched.
    pub fn pause(&mut self) -> Option<Event> {
        if self.paused || self.phase.is_terminal() {
            return None;
        }
        self.paused = true;
        Some(Event::TimerPaused {
            time_left: self.time_left,
            at: Utc::now(),
        })
    }

    pub fn resume(&mut self) -> Option<Event> {
        if !self.paused || self.phase.is_terminal() {
            return None;
        }
        self.paused = false;
        Some(Event::TimerResumed {
            time_left: self.time_left,
            at: Utc::now(),
        })
    }

    pub fn toggle_pause(&mut self) -> Option<Event> {
        if self.paused {
            self.resume()
        } else {
            self.pause()
        }
    }

    /// Exit immediately from any non-terminal phase.
    pub fn stop(&mut self) -> Option<Event> {
        if self.phase.is_terminal() {
            return None;
        }
        let event = Event::WorkoutStopped {
            phase: self.phase,
            round: self.round,
            exercise_index: self.exercise_index,
            at: Utc::now(),
        };
        self.phase = Phase::Stopped;
        self.time_left = 0;
        self.paused = false;
        tracing::debug!(ticks = self.ticks, "workout stopped");
        Some(event)
    }

    /// Advance one second. Paused and finished timers ignore ticks.
    pub fn tick(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        if self.paused || self.phase.is_terminal() {
            return events;
        }

        self.ticks += 1;
        self.time_left = self.time_left.saturating_sub(1);

        match self.phase {
            Phase::Countdown => {
                if self.time_left == 0 {
                    events.push(Event::RoundStarted {
                        round: self.round,
                        round_count: self.workout.round_count,
                    });
                    self.enter_work(&mut events);
                } else {
                    events.push(Event::Cue { cue: AudioCue::Tick });
                }
            }
            Phase::Work => {
                if self.time_left == 0 {
                    self.enter_rest(&mut events);
                } else if self.time_left <= WARNING_SECS {
                    events.push(Event::Cue { cue: AudioCue::Tick });
                }
            }
            Phase::Rest => {
                if self.time_left == 0 {
                    self.after_rest(&mut events);
                }
            }
            Phase::Complete | Phase::Stopped => {}
        }
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn enter_work(&mut self, events: &mut Vec<Event>) {
        self.phase = Phase::Work;
        self.time_left = self.workout.level_config.work_secs;
        events.push(Event::Cue { cue: AudioCue::Go });
        self.push_phase_started(events);
    }

    fn enter_rest(&mut self, events: &mut Vec<Event>) {
        if self.workout.level_config.rest_secs == 0 {
            self.after_rest(events);
            return;
        }
        self.phase = Phase::Rest;
        self.time_left = self.workout.level_config.rest_secs;
        self.push_phase_started(events);
    }

    fn after_rest(&mut self, events: &mut Vec<Event>) {
        if self.exercise_index + 1 < self.workout.exercises.len() {
            self.exercise_index += 1;
            self.enter_work(events);
        } else if self.round < self.workout.round_count {
            self.round += 1;
            self.exercise_index = 0;
            events.push(Event::RoundStarted {
                round: self.round,
                round_count: self.workout.round_count,
            });
            self.enter_work(events);
        } else {
            self.phase = Phase::Complete;
            self.time_left = 0;
            tracing::debug!(ticks = self.ticks, "workout complete");
            events.push(Event::WorkoutCompleted {
                rounds: self.round,
                ticks: self.ticks,
                at: Utc::now(),
            });
        }
    }

    fn push_phase_started(&self, events: &mut Vec<Event>) {
        events.push(Event::PhaseStarted {
            phase: self.phase,
            round: self.round,
            exercise_index: self.exercise_index,
            duration_secs: self.time_left,
            video: self.video_cue(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workout::{Exercise, Level, LevelConfig};

    fn workout(work: u32, rest: u32, exercises: usize, rounds: u32) -> GeneratedWorkout {
        GeneratedWorkout {
            level: Level::Intermediate,
            duration_min: 15,
            level_config: LevelConfig::new(work, rest),
            exercises: (0..exercises)
                .map(|i| Exercise::new(format!("Ex {i}"), format!("ex_{i}.mp4")))
                .collect(),
            round_count: rounds,
            total_intervals: exercises as u32 * rounds,
        }
    }

    fn run(timer: &mut IntervalTimer, ticks: u32) -> Vec<Event> {
        (0..ticks).flat_map(|_| timer.tick()).collect()
    }

    fn cues(events: &[Event]) -> Vec<AudioCue> {
        events
            .iter()
            .filter_map(|e| match e {
                Event::Cue { cue } => Some(*cue),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn countdown_ends_in_first_work_phase_with_go() {
        let mut timer = IntervalTimer::new(workout(40, 20, 3, 2));
        assert_eq!(timer.phase(), Phase::Countdown);
        assert_eq!(timer.time_left(), 3);

        let events = run(&mut timer, 3);
        assert_eq!(cues(&events), vec![AudioCue::Tick, AudioCue::Tick, AudioCue::Go]);
        assert_eq!(timer.phase(), Phase::Work);
        assert_eq!(timer.time_left(), 40);
        assert_eq!(timer.round(), 1);
        assert_eq!(timer.exercise_index(), 0);
    }

    #[test]
    fn work_becomes_rest_after_work_seconds() {
        let mut timer = IntervalTimer::new(workout(40, 20, 3, 2));
        run(&mut timer, 3);
        let events = run(&mut timer, 39);
        assert_eq!(timer.phase(), Phase::Work);
        assert_eq!(timer.time_left(), 1);
        // 3, 2, 1 remaining
        assert_eq!(cues(&events), vec![AudioCue::Tick; 3]);

        timer.tick();
        assert_eq!(timer.phase(), Phase::Rest);
        assert_eq!(timer.time_left(), 20);
    }

    #[test]
    fn rest_advances_exercise_then_round() {
        let mut timer = IntervalTimer::new(workout(10, 5, 2, 2));
        run(&mut timer, 3 + 10 + 5);
        assert_eq!(timer.phase(), Phase::Work);
        assert_eq!(timer.exercise_index(), 1);
        assert_eq!(timer.round(), 1);

        let events = run(&mut timer, 15);
        assert_eq!(timer.phase(), Phase::Work);
        assert_eq!(timer.exercise_index(), 0);
        assert_eq!(timer.round(), 2);
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::RoundStarted { round: 2, round_count: 2 })));
    }

    #[test]
    fn completes_after_last_rest() {
        let w = workout(10, 5, 3, 2);
        let mut timer = IntervalTimer::new(w);
        let total = timer.total_ticks();
        assert_eq!(total, 3 + 2 * 3 * 15);

        let events = run(&mut timer, total as u32 - 1);
        assert_eq!(timer.phase(), Phase::Rest);
        assert!(!events.iter().any(|e| matches!(e, Event::WorkoutCompleted { .. })));

        let last = timer.tick();
        assert_eq!(timer.phase(), Phase::Complete);
        assert!(matches!(
            last.as_slice(),
            [Event::WorkoutCompleted { rounds: 2, .. }]
        ));
        assert_eq!(timer.progress_pct(), 100.0);

        // terminal
        assert!(timer.tick().is_empty());
        assert_eq!(timer.ticks_elapsed(), total);
    }

    #[test]
    fn pause_freezes_everything() {
        let mut timer = IntervalTimer::new(workout(40, 20, 3, 2));
        run(&mut timer, 3 + 17);
        let before = (timer.phase(), timer.time_left(), timer.round(), timer.exercise_index());

        assert!(timer.pause().is_some());
        assert!(timer.pause().is_none());
        assert!(run(&mut timer, 500).is_empty());
        let during = (timer.phase(), timer.time_left(), timer.round(), timer.exercise_index());
        assert_eq!(before, during);

        assert!(timer.resume().is_some());
        timer.tick();
        assert_eq!(timer.time_left(), before.1 - 1);
        assert_eq!(timer.ticks_elapsed(), 21);
    }

    #[test]
    fn stop_exits_from_any_phase() {
        let mut timer = IntervalTimer::new(workout(40, 20, 3, 2));
        run(&mut timer, 50);
        assert_eq!(timer.phase(), Phase::Rest);

        let event = timer.stop().unwrap();
        assert!(matches!(event, Event::WorkoutStopped { phase: Phase::Rest, .. }));
        assert_eq!(timer.phase(), Phase::Stopped);
        assert!(timer.tick().is_empty());
        assert!(timer.stop().is_none());
        assert!(timer.pause().is_none());
    }

    #[test]
    fn stop_while_paused() {
        let mut timer = IntervalTimer::new(workout(40, 20, 3, 2));
        timer.pause();
        assert!(timer.stop().is_some());
        assert!(!timer.is_paused());
    }

    #[test]
    fn video_cues_follow_phase() {
        let mut timer = IntervalTimer::new(workout(10, 5, 2, 2));
        assert_eq!(
            timer.video_cue(),
            VideoCue::UpNext { exercise: Some("Ex 0".into()) }
        );

        run(&mut timer, 3);
        assert_eq!(
            timer.video_cue(),
            VideoCue::Play { exercise: "Ex 0".into(), video: "ex_0.mp4".into() }
        );

        run(&mut timer, 10);
        assert_eq!(
            timer.video_cue(),
            VideoCue::UpNext { exercise: Some("Ex 1".into()) }
        );

        // rest after last exercise of round 1 wraps to the first exercise
        run(&mut timer, 5 + 10);
        assert_eq!(timer.exercise_index(), 1);
        assert_eq!(
            timer.video_cue(),
            VideoCue::UpNext { exercise: Some("Ex 0".into()) }
        );

        // final rest has nothing up next
        run(&mut timer, 5 + 10 + 5 + 10);
        assert_eq!(timer.round(), 2);
        assert_eq!(timer.phase(), Phase::Rest);
        assert_eq!(timer.video_cue(), VideoCue::UpNext { exercise: None });
    }

    #[test]
    fn zero_rest_skips_rest_phase() {
        let mut timer = IntervalTimer::new(workout(5, 0, 2, 2));
        run(&mut timer, 3 + 5);
        assert_eq!(timer.phase(), Phase::Work);
        assert_eq!(timer.exercise_index(), 1);
    }

    #[test]
    fn time_left_stays_within_phase_bounds() {
        let mut timer = IntervalTimer::new(workout(7, 4, 3, 3));
        while !timer.phase().is_terminal() {
            assert!(timer.time_left() <= timer.phase_secs());
            timer.tick();
        }
        assert_eq!(timer.time_left(), 0);
    }

    #[test]
    fn snapshot_reports_state() {
        let mut timer = IntervalTimer::new(workout(40, 20, 3, 2));
        run(&mut timer, 5);
        match timer.snapshot() {
            Event::TimerSnapshot {
                phase,
                round,
                exercise,
                time_left,
                phase_secs,
                ..
            } => {
                assert_eq!(phase, Phase::Work);
                assert_eq!(round, 1);
                assert_eq!(exercise.as_deref(), Some("Ex 0"));
                assert_eq!(time_left, 38);
                assert_eq!(phase_secs, 40);
            }
            _ => panic!("Expected TimerSnapshot"),
        }
    }
}
