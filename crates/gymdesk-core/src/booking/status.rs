//! Store-backed queries for the member portal.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::attendance::{AttendanceCalculator, AttendanceSummary};
use super::cadence::CadenceRule;
use super::member::BanStatus;
use super::session::SlotStatus;
use crate::error::StoreError;
use crate::storage::{MemberStore, SessionStore};

/// A member's standing for the upcoming class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BookingStatus {
    Banned { until: NaiveDateTime },
    /// No session document exists for the upcoming class yet.
    NotScheduled { date: NaiveDate },
    NotBooked { date: NaiveDate, open_slots: u32 },
    Booked {
        date: NaiveDate,
        slot_number: u32,
        status: SlotStatus,
    },
}

/// Resolve the member's booking for `rule.next_cadence_point(now)`.
///
/// A missing session or member document is a normal state, not an error.
pub fn resolve_booking_status<S>(
    store: &S,
    rule: &CadenceRule,
    capacity: u32,
    member_id: &str,
    now: NaiveDateTime,
) -> Result<BookingStatus, StoreError>
where
    S: SessionStore + MemberStore + ?Sized,
{
    if let Some(member) = store.member(member_id)? {
        if let BanStatus::Active { until } = member.ban_status(now) {
            return Ok(BookingStatus::Banned { until });
        }
    }

    let date = rule.next_cadence_point(now).date();
    let Some(session) = store.session(date)? else {
        return Ok(BookingStatus::NotScheduled { date });
    };

    let status = match session.find_my_slot(member_id) {
        Some(slot) if slot.status.holds_place() => BookingStatus::Booked {
            date,
            slot_number: slot.slot_number,
            status: slot.status,
        },
        _ => BookingStatus::NotBooked {
            date,
            open_slots: session.open_slots(capacity),
        },
    };
    Ok(status)
}

/// Fetch every session plus the member document and summarize.
pub fn load_summary<S>(
    store: &S,
    calculator: &AttendanceCalculator,
    member_id: &str,
    now: NaiveDateTime,
) -> Result<AttendanceSummary, StoreError>
where
    S: SessionStore + MemberStore + ?Sized,
{
    let sessions = store.sessions()?;
    let member = store.member(member_id)?;
    Ok(calculator.summarize(&sessions, member_id, member.as_ref(), now))
}
