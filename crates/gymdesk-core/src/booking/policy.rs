//! No-show strike policy.
//!
//! The attendance engine only reads strikes and bans. This policy is the
//! admin side that writes them: each no-show adds a strike, and reaching the
//! threshold converts the strikes into a timed booking ban.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::member::Member;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrikePolicy {
    #[serde(default = "default_threshold")]
    pub threshold: u32,
    #[serde(default = "default_ban_days")]
    pub ban_days: u32,
}

fn default_threshold() -> u32 {
    3
}
fn default_ban_days() -> u32 {
    28
}

impl Default for StrikePolicy {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            ban_days: default_ban_days(),
        }
    }
}

/// Result of recording a no-show against a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StrikeOutcome {
    Strike { strikes: u32, remaining: u32 },
    Banned { until: NaiveDateTime },
}

impl StrikePolicy {
    /// Strikes as shown to the member, never above the threshold.
    pub fn displayed_strikes(&self, member: &Member) -> u32 {
        member.strikes.min(self.threshold)
    }

    /// No-shows left before a ban is imposed.
    pub fn strikes_remaining(&self, member: &Member) -> u32 {
        self.threshold.saturating_sub(member.strikes)
    }

    pub fn record_no_show(&self, member: &mut Member, now: NaiveDateTime) -> StrikeOutcome {
        member.strikes = member.strikes.saturating_add(1);
        if member.strikes >= self.threshold {
            let until = now
                .checked_add_signed(Duration::days(i64::from(self.ban_days)))
                .unwrap_or(NaiveDateTime::MAX);
            member.strikes = 0;
            member.ban_until = Some(until);
            tracing::info!(member_id = %member.id, %until, "strike threshold reached, member banned");
            return StrikeOutcome::Banned { until };
        }
        tracing::info!(member_id = %member.id, strikes = member.strikes, "strike recorded");
        StrikeOutcome::Strike {
            strikes: member.strikes,
            remaining: self.strikes_remaining(member),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    #[test]
    fn third_no_show_bans() {
        let policy = StrikePolicy::default();
        let mut m = Member::new("m1", "Sam");

        assert_eq!(
            policy.record_no_show(&mut m, now()),
            StrikeOutcome::Strike { strikes: 1, remaining: 2 }
        );
        assert_eq!(
            policy.record_no_show(&mut m, now()),
            StrikeOutcome::Strike { strikes: 2, remaining: 1 }
        );

        let until = now() + Duration::days(28);
        assert_eq!(policy.record_no_show(&mut m, now()), StrikeOutcome::Banned { until });
        assert_eq!(m.strikes, 0);
        assert_eq!(m.ban_until, Some(until));
        assert!(m.ban_status(now()).is_active());
    }

    #[test]
    fn displayed_strikes_are_capped() {
        let policy = StrikePolicy::default();
        let mut m = Member::new("m1", "Sam");
        m.strikes = 7;
        assert_eq!(policy.displayed_strikes(&m), 3);
        assert_eq!(policy.strikes_remaining(&m), 0);
    }

    #[test]
    fn oversized_ban_saturates() {
        let policy = StrikePolicy {
            threshold: 1,
            ban_days: u32::MAX,
        };
        let mut m = Member::new("m1", "Sam");
        assert_eq!(
            policy.record_no_show(&mut m, now()),
            StrikeOutcome::Banned {
                until: NaiveDateTime::MAX
            }
        );
    }
}
