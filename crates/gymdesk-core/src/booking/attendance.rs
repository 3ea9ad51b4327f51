//! Attendance counting and weekly streaks.
//!
//! Everything here is a pure function over session records that were
//! fetched wholesale from the store. The summary is recomputed on every
//! query and never persisted.

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::cadence::CadenceRule;
use super::member::{BanStatus, Member};
use super::policy::StrikePolicy;
use super::session::SessionRecord;

/// Derived per-member attendance view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceSummary {
    pub member_id: String,
    /// Past classes (before today) the member confirmed or attended.
    pub attended_count: u32,
    /// Consecutive most-recent elapsed weeks with attendance.
    pub streak: u32,
    /// Longest weekly run in the member's history.
    pub best_streak: u32,
    pub last_attended: Option<NaiveDate>,
    /// Strikes as displayed, capped at the policy threshold.
    pub strikes: u32,
    pub ban: BanStatus,
}

/// Computes attendance summaries for one cadence rule and strike policy.
#[derive(Debug, Clone, Default)]
pub struct AttendanceCalculator {
    rule: CadenceRule,
    policy: StrikePolicy,
}

impl AttendanceCalculator {
    pub fn new(rule: CadenceRule, policy: StrikePolicy) -> Self {
        Self { rule, policy }
    }

    /// Classes dated strictly before `today` that the member attended.
    pub fn attended_count(
        &self,
        sessions: &[SessionRecord],
        member_id: &str,
        today: NaiveDate,
    ) -> u32 {
        sessions
            .iter()
            .filter(|s| s.date < today && s.attended_by(member_id))
            .count() as u32
    }

    /// Attended class dates that have fully elapsed at `now`.
    pub fn attended_dates(
        &self,
        sessions: &[SessionRecord],
        member_id: &str,
        now: NaiveDateTime,
    ) -> BTreeSet<NaiveDate> {
        let last = self.rule.last_elapsed_cadence_point(now);
        sessions
            .iter()
            .filter(|s| s.date <= last && s.attended_by(member_id))
            .map(|s| s.date)
            .collect()
    }

    /// Walks back week by week from the last elapsed class, stopping at
    /// the first week without attendance.
    pub fn current_streak(
        &self,
        sessions: &[SessionRecord],
        member_id: &str,
        now: NaiveDateTime,
    ) -> u32 {
        let dates = self.attended_dates(sessions, member_id, now);
        if dates.is_empty() {
            return 0;
        }

        let mut cursor = self.rule.last_elapsed_cadence_point(now);
        let mut streak = 0;
        while dates.contains(&cursor) {
            streak += 1;
            cursor -= Duration::days(7);
        }
        streak
    }

    /// Longest run of attended dates spaced exactly one week apart.
    pub fn best_streak(&self, dates: &BTreeSet<NaiveDate>) -> u32 {
        let mut best = 0;
        let mut run = 0;
        let mut prev: Option<NaiveDate> = None;
        for &date in dates {
            run = match prev {
                Some(p) if date - p == Duration::days(7) => run + 1,
                _ => 1,
            };
            best = best.max(run);
            prev = Some(date);
        }
        best
    }

    /// Full summary. A missing member document reads as no strikes and no ban.
    pub fn summarize(
        &self,
        sessions: &[SessionRecord],
        member_id: &str,
        member: Option<&Member>,
        now: NaiveDateTime,
    ) -> AttendanceSummary {
        let dates = self.attended_dates(sessions, member_id, now);
        let summary = AttendanceSummary {
            member_id: member_id.to_string(),
            attended_count: self.attended_count(sessions, member_id, now.date()),
            streak: self.current_streak(sessions, member_id, now),
            best_streak: self.best_streak(&dates),
            last_attended: dates.iter().next_back().copied(),
            strikes: member.map_or(0, |m| self.policy.displayed_strikes(m)),
            ban: member.map_or(BanStatus::Clear, |m| m.ban_status(now)),
        };
        tracing::debug!(
            member_id,
            attended = summary.attended_count,
            streak = summary.streak,
            "attendance summarized"
        );
        summary
    }
}
