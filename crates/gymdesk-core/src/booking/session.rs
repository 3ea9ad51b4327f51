//! Session records and slots.
//!
//! A `SessionRecord` is one scheduled class instance, keyed by its date.
//! Slots keep booking order and are never removed; cancelling a slot only
//! transitions its status and frees the slot number for the next booking.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::BookingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Booked,
    Confirmed,
    Attended,
    NoShow,
    Cancelled,
}

impl SlotStatus {
    /// Statuses that count toward attendance and streaks.
    pub fn counts_as_attended(self) -> bool {
        matches!(self, SlotStatus::Confirmed | SlotStatus::Attended)
    }

    /// Whether the slot still occupies a place in the class.
    pub fn holds_place(self) -> bool {
        self != SlotStatus::Cancelled
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SlotStatus::Booked => "booked",
            SlotStatus::Confirmed => "confirmed",
            SlotStatus::Attended => "attended",
            SlotStatus::NoShow => "no_show",
            SlotStatus::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for SlotStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "booked" => Ok(SlotStatus::Booked),
            "confirmed" => Ok(SlotStatus::Confirmed),
            "attended" => Ok(SlotStatus::Attended),
            "no_show" | "noshow" => Ok(SlotStatus::NoShow),
            "cancelled" | "canceled" => Ok(SlotStatus::Cancelled),
            other => Err(format!("unknown slot status: {other}")),
        }
    }
}

impl std::fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A member's reservation within one class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub member_id: String,
    pub slot_number: u32,
    pub status: SlotStatus,
}

/// One scheduled weekly class instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub date: NaiveDate,
    #[serde(default)]
    pub slots: Vec<Slot>,
}

impl SessionRecord {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            slots: Vec::new(),
        }
    }

    /// Document key used by the stores.
    pub fn key(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// First slot held by `member_id`, if any.
    pub fn find_my_slot(&self, member_id: &str) -> Option<&Slot> {
        self.slots.iter().find(|s| s.member_id == member_id)
    }

    /// Whether `member_id` attended (confirmed or attended) this class.
    pub fn attended_by(&self, member_id: &str) -> bool {
        self.find_my_slot(member_id)
            .is_some_and(|s| s.status.counts_as_attended())
    }

    /// Number of slots that still hold a place.
    pub fn taken(&self) -> u32 {
        self.slots.iter().filter(|s| s.status.holds_place()).count() as u32
    }

    pub fn open_slots(&self, capacity: u32) -> u32 {
        capacity.saturating_sub(self.taken())
    }

    /// Lowest positive slot number not held by a non-cancelled slot.
    pub fn next_free_slot_number(&self) -> u32 {
        let held: BTreeSet<u32> = self
            .slots
            .iter()
            .filter(|s| s.status.holds_place())
            .map(|s| s.slot_number)
            .collect();
        (1..).find(|n| !held.contains(n)).unwrap_or(1)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Book `member_id` into the lowest free slot.
    ///
    /// A member who cancelled earlier gets their slot entry back with a
    /// freshly assigned number, so the member never appears twice.
    pub fn book(&mut self, member_id: &str, capacity: u32) -> Result<&Slot, BookingError> {
        if let Some(existing) = self.find_my_slot(member_id) {
            if existing.status.holds_place() {
                return Err(BookingError::AlreadyBooked {
                    member_id: member_id.to_string(),
                    slot_number: existing.slot_number,
                });
            }
        }
        if self.taken() >= capacity {
            return Err(BookingError::SessionFull { capacity });
        }

        let number = self.next_free_slot_number();
        let index = match self.slots.iter().position(|s| s.member_id == member_id) {
            Some(i) => {
                self.slots[i].slot_number = number;
                self.slots[i].status = SlotStatus::Booked;
                i
            }
            None => {
                self.slots.push(Slot {
                    member_id: member_id.to_string(),
                    slot_number: number,
                    status: SlotStatus::Booked,
                });
                self.slots.len() - 1
            }
        };
        tracing::info!(date = %self.date, member_id, slot = number, "slot booked");
        Ok(&self.slots[index])
    }

    /// Cancel the member's booking. Returns the freed slot number.
    pub fn cancel(&mut self, member_id: &str) -> Result<u32, BookingError> {
        let slot = self
            .slots
            .iter_mut()
            .find(|s| s.member_id == member_id && s.status.holds_place())
            .ok_or_else(|| BookingError::NotBooked(member_id.to_string()))?;
        slot.status = SlotStatus::Cancelled;
        tracing::info!(date = %self.date, member_id, slot = slot.slot_number, "slot cancelled");
        Ok(slot.slot_number)
    }

    /// Set the status of the member's slot. Returns the previous status.
    ///
    /// A cancelled slot moving back to a held status goes through `book`,
    /// so it gets the lowest free number and respects `capacity`.
    pub fn mark(
        &mut self,
        member_id: &str,
        status: SlotStatus,
        capacity: u32,
    ) -> Result<SlotStatus, BookingError> {
        let index = self
            .slots
            .iter()
            .position(|s| s.member_id == member_id)
            .ok_or_else(|| BookingError::NotBooked(member_id.to_string()))?;
        let previous = self.slots[index].status;
        if !previous.holds_place() && status.holds_place() {
            self.book(member_id, capacity)?;
        }
        self.slots[index].status = status;
        tracing::info!(date = %self.date, member_id, from = %previous, to = %status, "slot marked");
        Ok(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> SessionRecord {
        SessionRecord::new(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
    }

    #[test]
    fn find_my_slot_matches_member() {
        let mut s = session();
        s.slots.push(Slot {
            member_id: "A".into(),
            slot_number: 1,
            status: SlotStatus::Booked,
        });
        assert!(s.find_my_slot("B").is_none());
        let slot = s.find_my_slot("A").unwrap();
        assert_eq!(slot.slot_number, 1);
    }

    #[test]
    fn booking_assigns_sequential_numbers() {
        let mut s = session();
        assert_eq!(s.book("a", 4).unwrap().slot_number, 1);
        assert_eq!(s.book("b", 4).unwrap().slot_number, 2);
        assert_eq!(s.book("c", 4).unwrap().slot_number, 3);
        assert_eq!(s.taken(), 3);
        assert_eq!(s.open_slots(4), 1);
    }

    #[test]
    fn double_booking_is_rejected() {
        let mut s = session();
        s.book("a", 4).unwrap();
        assert_eq!(
            s.book("a", 4).unwrap_err(),
            BookingError::AlreadyBooked {
                member_id: "a".into(),
                slot_number: 1
            }
        );
    }

    #[test]
    fn full_session_is_rejected() {
        let mut s = session();
        s.book("a", 2).unwrap();
        s.book("b", 2).unwrap();
        assert_eq!(
            s.book("c", 2).unwrap_err(),
            BookingError::SessionFull { capacity: 2 }
        );
    }

    #[test]
    fn cancellation_frees_number_for_reassignment() {
        let mut s = session();
        s.book("a", 3).unwrap();
        s.book("b", 3).unwrap();
        s.book("c", 3).unwrap();
        assert_eq!(s.cancel("b").unwrap(), 2);
        assert_eq!(s.next_free_slot_number(), 2);
        assert_eq!(s.book("d", 3).unwrap().slot_number, 2);
        // slots are never removed
        assert_eq!(s.slots.len(), 4);
    }

    #[test]
    fn rebooking_after_cancel_reuses_entry() {
        let mut s = session();
        s.book("a", 3).unwrap();
        s.book("b", 3).unwrap();
        s.cancel("a").unwrap();
        let slot = s.book("a", 3).unwrap();
        assert_eq!(slot.slot_number, 1);
        assert_eq!(slot.status, SlotStatus::Booked);
        assert_eq!(s.slots.iter().filter(|x| x.member_id == "a").count(), 1);
    }

    #[test]
    fn cancel_without_booking_fails() {
        let mut s = session();
        assert_eq!(
            s.cancel("ghost").unwrap_err(),
            BookingError::NotBooked("ghost".into())
        );
    }

    #[test]
    fn mark_transitions_status() {
        let mut s = session();
        s.book("a", 3).unwrap();
        assert_eq!(s.mark("a", SlotStatus::Attended, 3).unwrap(), SlotStatus::Booked);
        assert!(s.attended_by("a"));
        s.mark("a", SlotStatus::NoShow, 3).unwrap();
        assert!(!s.attended_by("a"));
    }

    #[test]
    fn marking_cancelled_slot_rebooks_it() {
        let mut s = session();
        s.book("a", 1).unwrap();
        s.cancel("a").unwrap();
        s.book("b", 1).unwrap();

        // The class is full again, so "a" cannot come back.
        assert_eq!(
            s.mark("a", SlotStatus::Attended, 1).unwrap_err(),
            BookingError::SessionFull { capacity: 1 }
        );
        assert_eq!(s.find_my_slot("a").unwrap().status, SlotStatus::Cancelled);
        assert_eq!(s.taken(), 1);

        // With room, "a" gets a fresh number instead of the one "b" holds.
        assert_eq!(
            s.mark("a", SlotStatus::Attended, 2).unwrap(),
            SlotStatus::Cancelled
        );
        let held: Vec<(&str, u32)> = s
            .slots
            .iter()
            .filter(|slot| slot.status.holds_place())
            .map(|slot| (slot.member_id.as_str(), slot.slot_number))
            .collect();
        assert_eq!(held, vec![("a", 2), ("b", 1)]);
        assert_eq!(s.find_my_slot("a").unwrap().status, SlotStatus::Attended);
    }

    #[test]
    fn marking_unknown_member_fails() {
        let mut s = session();
        assert_eq!(
            s.mark("ghost", SlotStatus::Attended, 3).unwrap_err(),
            BookingError::NotBooked("ghost".into())
        );
    }

    #[test]
    fn status_parses_loose_spellings() {
        assert_eq!("no-show".parse::<SlotStatus>().unwrap(), SlotStatus::NoShow);
        assert_eq!("Canceled".parse::<SlotStatus>().unwrap(), SlotStatus::Cancelled);
        assert!("late".parse::<SlotStatus>().is_err());
    }

    #[test]
    fn serializes_with_snake_case_status() {
        let mut s = session();
        s.book("a", 3).unwrap();
        s.mark("a", SlotStatus::NoShow, 3).unwrap();
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("\"no_show\""));
        assert!(json.contains("\"2024-06-15\""));
    }
}
