//! Composition root shared by the commands.

use chrono::{Local, NaiveDate, NaiveDateTime};
use gymdesk_core::{Config, CoreError, Database, Member, MemberStore, SessionStore};

/// Explicit application context: loaded once, passed by reference.
pub struct AppContext {
    pub config: Config,
    pub db: Database,
    now: NaiveDateTime,
}

impl AppContext {
    pub fn open(now: Option<NaiveDateTime>) -> Result<Self, CoreError> {
        let config = Config::load()?;
        let db = Database::open()?;
        Ok(Self {
            config,
            db,
            now: now.unwrap_or_else(|| Local::now().naive_local()),
        })
    }

    pub fn now(&self) -> NaiveDateTime {
        self.now
    }

    /// Date of the upcoming (or running) class.
    pub fn next_class_date(&self) -> NaiveDate {
        self.config.cadence.next_cadence_point(self.now).date()
    }

    /// Date of the class that is running now or most recently finished.
    pub fn current_class_date(&self) -> NaiveDate {
        let next = self.config.cadence.next_cadence_point(self.now);
        if next <= self.now {
            next.date()
        } else {
            self.config.cadence.last_elapsed_cadence_point(self.now)
        }
    }

    pub fn require_member(&self, id: &str) -> Result<Member, CoreError> {
        self.db
            .member(id)?
            .ok_or_else(|| gymdesk_core::BookingError::UnknownMember(id.to_string()).into())
    }

    pub fn require_session(&self, date: NaiveDate) -> Result<gymdesk_core::SessionRecord, CoreError> {
        self.db
            .session(date)?
            .ok_or_else(|| gymdesk_core::BookingError::NotScheduled(date).into())
    }
}
