//! In-process document store.

use std::cell::RefCell;
use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::{MemberStore, SessionStore};
use crate::booking::{Member, SessionRecord};
use crate::error::StoreError;

#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: RefCell<BTreeMap<NaiveDate, SessionRecord>>,
    members: RefCell<BTreeMap<String, Member>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sessions(sessions: impl IntoIterator<Item = SessionRecord>) -> Self {
        let store = Self::new();
        store
            .sessions
            .borrow_mut()
            .extend(sessions.into_iter().map(|s| (s.date, s)));
        store
    }
}

impl SessionStore for MemoryStore {
    fn session(&self, date: NaiveDate) -> Result<Option<SessionRecord>, StoreError> {
        Ok(self.sessions.borrow().get(&date).cloned())
    }

    fn sessions(&self) -> Result<Vec<SessionRecord>, StoreError> {
        Ok(self.sessions.borrow().values().cloned().collect())
    }

    fn put_session(&self, session: &SessionRecord) -> Result<(), StoreError> {
        self.sessions
            .borrow_mut()
            .insert(session.date, session.clone());
        Ok(())
    }
}

impl MemberStore for MemoryStore {
    fn member(&self, id: &str) -> Result<Option<Member>, StoreError> {
        Ok(self.members.borrow().get(id).cloned())
    }

    fn members(&self) -> Result<Vec<Member>, StoreError> {
        Ok(self.members.borrow().values().cloned().collect())
    }

    fn put_member(&self, member: &Member) -> Result<(), StoreError> {
        self.members
            .borrow_mut()
            .insert(member.id.clone(), member.clone());
        Ok(())
    }
}
