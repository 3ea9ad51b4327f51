//! Core error types for gymdesk-core.
//!
//! This module defines the error hierarchy using thiserror. A missing
//! document (session, member) is never an error here: lookups return
//! `Option` and callers treat `None` as a displayable empty state.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for gymdesk-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Document store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Booking rule violations
    #[error("Booking error: {0}")]
    Booking(#[from] BookingError),

    /// Workout generation errors
    #[error("Workout error: {0}")]
    Workout(#[from] WorkoutError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while reading or writing documents.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the local store
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    Query(String),

    /// A stored document could not be decoded
    #[error("Corrupt document '{key}': {message}")]
    Decode { key: String, message: String },

    /// Remote or blob fetch failed
    #[error("Failed to fetch {source_name}: {message}")]
    Fetch { source_name: String, message: String },

    /// Database is locked
    #[error("Store is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Booking rule violations raised by slot mutations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    #[error("Member '{member_id}' already holds slot {slot_number}")]
    AlreadyBooked { member_id: String, slot_number: u32 },

    #[error("Session is full ({capacity} slots)")]
    SessionFull { capacity: u32 },

    #[error("Member '{0}' has no booking for this session")]
    NotBooked(String),

    #[error("Member '{member_id}' is banned from booking until {until}")]
    Banned {
        member_id: String,
        until: chrono::NaiveDateTime,
    },

    #[error("Unknown member '{0}'")]
    UnknownMember(String),

    #[error("No class is scheduled on {0}")]
    NotScheduled(chrono::NaiveDate),
}

/// Errors that send the workout player back to its configuration screen.
#[derive(Error, Debug)]
pub enum WorkoutError {
    /// Exercise pool is empty
    #[error("Exercise pool is empty")]
    EmptyPool,

    /// Level/duration combination cannot produce a workout
    #[error("Invalid workout configuration: {0}")]
    InvalidConfiguration(String),

    /// Pool could not be fetched
    #[error("Could not load exercises: {0}")]
    Fetch(#[from] StoreError),

    /// Nothing stored to replay or reshuffle
    #[error("No previous workout; run `gymdesk workout generate` first")]
    NothingToReplay,
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _msg)
                if code.code == rusqlite::ErrorCode::DatabaseLocked =>
            {
                StoreError::Locked
            }
            _ => StoreError::Query(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Fetch {
            source_name: err
                .url()
                .map(|u| u.to_string())
                .unwrap_or_else(|| "remote pool".to_string()),
            message: err.to_string(),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booking_error_converts_into_core_error() {
        let err: CoreError = BookingError::NotBooked("m1".into()).into();
        assert!(matches!(err, CoreError::Booking(BookingError::NotBooked(_))));
        assert!(err.to_string().contains("m1"));
    }

    #[test]
    fn workout_error_keeps_its_category() {
        let err: CoreError = WorkoutError::NothingToReplay.into();
        assert_eq!(
            err.to_string(),
            "Workout error: No previous workout; run `gymdesk workout generate` first"
        );
    }

    #[test]
    fn fetch_error_message_names_source() {
        let err = WorkoutError::Fetch(StoreError::Fetch {
            source_name: "exercises.json".into(),
            message: "not found".into(),
        });
        assert_eq!(
            err.to_string(),
            "Could not load exercises: Failed to fetch exercises.json: not found"
        );
    }
}
