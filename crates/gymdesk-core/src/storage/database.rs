//! SQLite-backed document store.
//!
//! Stands in locally for the hosted document database:
//! - Session documents keyed by class date
//! - Member documents keyed by member id
//! - Key-value store for application state
//!
//! Documents are stored as JSON text so the record shapes stay identical to
//! what the hosted store returns.

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;

use super::{data_dir, MemberStore, SessionStore};
use crate::booking::{Member, SessionRecord};
use crate::error::StoreError;

/// SQLite database holding session and member documents.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data_dir>/gymdesk.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StoreError> {
        let dir = data_dir().map_err(|e| StoreError::Query(e.to_string()))?;
        Self::open_at(&dir.join("gymdesk.db"))
    }

    /// Open a database file at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS sessions (
                date TEXT PRIMARY KEY,
                doc  TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS members (
                id  TEXT PRIMARY KEY,
                doc TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Run `f` in one transaction. Nothing is committed if `f` fails.
    pub fn atomically<T>(
        &self,
        f: impl FnOnce(&Self) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        let value = f(self)?;
        tx.commit()?;
        Ok(value)
    }

    fn load_docs<T: DeserializeOwned>(&self, sql: &str) -> Result<Vec<T>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut docs = Vec::new();
        for row in rows {
            let (key, doc) = row?;
            docs.push(decode(&key, &doc)?);
        }
        Ok(docs)
    }
}

fn decode<T: DeserializeOwned>(key: &str, doc: &str) -> Result<T, StoreError> {
    serde_json::from_str(doc).map_err(|e| StoreError::Decode {
        key: key.to_string(),
        message: e.to_string(),
    })
}

fn encode<T: serde::Serialize>(key: &str, value: &T) -> Result<String, StoreError> {
    serde_json::to_string(value).map_err(|e| StoreError::Decode {
        key: key.to_string(),
        message: e.to_string(),
    })
}

impl SessionStore for Database {
    fn session(&self, date: NaiveDate) -> Result<Option<SessionRecord>, StoreError> {
        let key = date.format("%Y-%m-%d").to_string();
        let doc = self
            .conn
            .query_row("SELECT doc FROM sessions WHERE date = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        doc.map(|d| decode(&key, &d)).transpose()
    }

    fn sessions(&self) -> Result<Vec<SessionRecord>, StoreError> {
        self.load_docs("SELECT date, doc FROM sessions ORDER BY date")
    }

    fn put_session(&self, session: &SessionRecord) -> Result<(), StoreError> {
        let key = session.key();
        let doc = encode(&key, session)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO sessions (date, doc) VALUES (?1, ?2)",
            params![key, doc],
        )?;
        Ok(())
    }
}

impl MemberStore for Database {
    fn member(&self, id: &str) -> Result<Option<Member>, StoreError> {
        let doc = self
            .conn
            .query_row("SELECT doc FROM members WHERE id = ?1", params![id], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        doc.map(|d| decode(id, &d)).transpose()
    }

    fn members(&self) -> Result<Vec<Member>, StoreError> {
        self.load_docs("SELECT id, doc FROM members ORDER BY id")
    }

    fn put_member(&self, member: &Member) -> Result<(), StoreError> {
        let doc = encode(&member.id, member)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO members (id, doc) VALUES (?1, ?2)",
            params![member.id, doc],
        )?;
        Ok(())
    }
}
