mod config;
pub mod database;
pub mod memory;
pub mod pool;

pub use config::{BookingConfig, Config, WorkoutConfig};
pub use database::Database;
pub use memory::MemoryStore;
pub use pool::PoolSource;

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::booking::{Member, SessionRecord};
use crate::error::StoreError;

/// Read/write access to class session documents, keyed by date.
///
/// `Ok(None)` means the document does not exist, which is a valid state.
pub trait SessionStore {
    fn session(&self, date: NaiveDate) -> Result<Option<SessionRecord>, StoreError>;

    /// Every session document. No pagination or filtering at this boundary.
    fn sessions(&self) -> Result<Vec<SessionRecord>, StoreError>;

    fn put_session(&self, session: &SessionRecord) -> Result<(), StoreError>;
}

/// Read/write access to member documents, keyed by member id.
pub trait MemberStore {
    fn member(&self, id: &str) -> Result<Option<Member>, StoreError>;

    fn members(&self) -> Result<Vec<Member>, StoreError>;

    fn put_member(&self, member: &Member) -> Result<(), StoreError>;
}

/// Returns `~/.config/gymdesk[-dev]/` based on GYMDESK_ENV.
///
/// Set GYMDESK_ENV=dev to use the development data directory, or
/// GYMDESK_DATA_DIR to point at an explicit directory.
///
/// # Errors
/// Returns an error if creating the data directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = match std::env::var_os("GYMDESK_DATA_DIR") {
        Some(explicit) => PathBuf::from(explicit),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("GYMDESK_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("gymdesk-dev")
            } else {
                base_dir.join("gymdesk")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
