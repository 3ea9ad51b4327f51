//! # gymdesk Core Library
//!
//! This library provides the core logic behind the gymdesk trainer panel and
//! client portal. All operations are available through the standalone CLI
//! binary, which is a thin layer over the same core library.
//!
//! ## Architecture
//!
//! - **Booking**: weekly class cadence, slot bookings, attendance counts,
//!   consecutive-week streaks and strike/ban display
//! - **Workout**: random interval workout generation and a tick-driven
//!   interval timer that requires the caller to invoke `tick()` every second
//! - **Storage**: document store traits, a SQLite document store, the
//!   exercise pool loader and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`AttendanceCalculator`]: Attendance and streak computation
//! - [`CadenceRule`]: Next-class resolution and countdown
//! - [`WorkoutGenerator`]: Exercise selection and round planning
//! - [`IntervalTimer`]: Workout phase state machine
//! - [`Database`]: Local session and member documents
//! - [`Config`]: Application configuration management

pub mod booking;
pub mod error;
pub mod events;
pub mod storage;
pub mod workout;

pub use booking::{
    AttendanceCalculator, AttendanceSummary, BanStatus, BookingStatus, CadenceRule, Countdown,
    Member, SessionRecord, Slot, SlotStatus, StrikeOutcome, StrikePolicy,
};
pub use error::{BookingError, ConfigError, CoreError, StoreError, WorkoutError};
pub use events::Event;
pub use storage::{Config, Database, MemberStore, MemoryStore, PoolSource, SessionStore};
pub use workout::{
    AudioCue, Exercise, GeneratedWorkout, IntervalTimer, Level, LevelConfig, Phase, VideoCue,
    WorkoutGenerator,
};
