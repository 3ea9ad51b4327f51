//! Weekly class cadence.
//!
//! A circuit class runs once a week on a fixed weekday at a fixed start time.
//! All times are the gym's local wall-clock time (`NaiveDateTime`); the
//! caller decides which timezone "now" is taken in.
//!
//! The cutoff is asymmetric: on the anchor day the class stays "next" until
//! its nominal end time has passed, so a countdown never rolls over to next
//! week while a class is still running.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// Fixed weekly anchor for a recurring class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CadenceRule {
    #[serde(default = "default_weekday")]
    pub weekday: Weekday,
    #[serde(default = "default_start")]
    pub start: NaiveTime,
    /// Nominal class length in minutes.
    #[serde(default = "default_length_min")]
    pub length_min: u32,
}

fn default_weekday() -> Weekday {
    Weekday::Sat
}
fn default_start() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN)
}
fn default_length_min() -> u32 {
    60
}

impl Default for CadenceRule {
    fn default() -> Self {
        Self {
            weekday: default_weekday(),
            start: default_start(),
            length_min: default_length_min(),
        }
    }
}

/// Time remaining until the next class starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    pub target: NaiveDateTime,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    /// The class has started and has not reached its end time yet.
    pub in_progress: bool,
}

impl Countdown {
    pub fn total_seconds(&self) -> i64 {
        ((self.days * 24 + self.hours) * 60 + self.minutes) * 60 + self.seconds
    }
}

impl CadenceRule {
    pub fn new(weekday: Weekday, start: NaiveTime, length_min: u32) -> Self {
        Self {
            weekday,
            start,
            length_min,
        }
    }

    /// Start of the class held on `date`.
    pub fn starts_on(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.start)
    }

    /// Nominal end of the class held on `date`.
    pub fn ends_on(&self, date: NaiveDate) -> NaiveDateTime {
        self.starts_on(date)
            .checked_add_signed(Duration::minutes(i64::from(self.length_min)))
            .unwrap_or(NaiveDateTime::MAX)
    }

    /// Next class start. On the anchor day this is today's class until its
    /// end time, then the following week's.
    pub fn next_cadence_point(&self, now: NaiveDateTime) -> NaiveDateTime {
        let today = now.date();
        let ahead = days_between(today.weekday(), self.weekday);
        let mut date = today + Duration::days(ahead);
        if ahead == 0 && now >= self.ends_on(today) {
            date += Duration::days(7);
        }
        self.starts_on(date)
    }

    /// Most recent anchor date whose class has fully elapsed at `now`.
    pub fn last_elapsed_cadence_point(&self, now: NaiveDateTime) -> NaiveDate {
        let today = now.date();
        let back = days_between(self.weekday, today.weekday());
        let date = today - Duration::days(back);
        if back == 0 && now < self.ends_on(today) {
            date - Duration::days(7)
        } else {
            date
        }
    }

    /// Countdown to `next_cadence_point(now)`; zero while a class is running.
    pub fn countdown(&self, now: NaiveDateTime) -> Countdown {
        let target = self.next_cadence_point(now);
        let remaining = target - now;
        if remaining <= Duration::zero() {
            return Countdown {
                target,
                days: 0,
                hours: 0,
                minutes: 0,
                seconds: 0,
                in_progress: true,
            };
        }

        let total = remaining.num_seconds();
        Countdown {
            target,
            days: total / 86_400,
            hours: (total % 86_400) / 3_600,
            minutes: (total % 3_600) / 60,
            seconds: total % 60,
            in_progress: false,
        }
    }
}

/// Days to walk forward from `from` to reach `to` (0..=6).
fn days_between(from: Weekday, to: Weekday) -> i64 {
    let from = i64::from(from.num_days_from_monday());
    let to = i64::from(to.num_days_from_monday());
    (to - from).rem_euclid(7)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    // 2024-06-15 is a Saturday.
    const SAT: (i32, u32, u32) = (2024, 6, 15);

    #[test]
    fn anchor_day_before_cutoff_returns_today() {
        let rule = CadenceRule::default();
        let now = at(SAT.0, SAT.1, SAT.2, 9, 59);
        assert_eq!(rule.next_cadence_point(now), at(2024, 6, 15, 9, 0));
    }

    #[test]
    fn anchor_day_after_cutoff_rolls_a_week() {
        let rule = CadenceRule::default();
        let now = at(SAT.0, SAT.1, SAT.2, 10, 1);
        assert_eq!(rule.next_cadence_point(now), at(2024, 6, 22, 9, 0));
    }

    #[test]
    fn cutoff_is_exclusive() {
        let rule = CadenceRule::default();
        let now = at(SAT.0, SAT.1, SAT.2, 10, 0);
        assert_eq!(rule.next_cadence_point(now).date(), NaiveDate::from_ymd_opt(2024, 6, 22).unwrap());
    }

    #[test]
    fn midweek_points_to_coming_saturday() {
        let rule = CadenceRule::default();
        // Wednesday
        let now = at(2024, 6, 12, 18, 30);
        assert_eq!(rule.next_cadence_point(now), at(2024, 6, 15, 9, 0));
        // Sunday right after
        let now = at(2024, 6, 16, 8, 0);
        assert_eq!(rule.next_cadence_point(now), at(2024, 6, 22, 9, 0));
    }

    #[test]
    fn last_elapsed_point_respects_cutoff() {
        let rule = CadenceRule::default();
        let before = at(SAT.0, SAT.1, SAT.2, 9, 30);
        let after = at(SAT.0, SAT.1, SAT.2, 10, 30);
        assert_eq!(
            rule.last_elapsed_cadence_point(before),
            NaiveDate::from_ymd_opt(2024, 6, 8).unwrap()
        );
        assert_eq!(
            rule.last_elapsed_cadence_point(after),
            NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
        );
        assert_eq!(
            rule.last_elapsed_cadence_point(at(2024, 6, 19, 12, 0)),
            NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
        );
    }

    #[test]
    fn countdown_breaks_down_remaining_time() {
        let rule = CadenceRule::default();
        // Thursday 07:30 -> Saturday 09:00 is 2d 1h 30m
        let cd = rule.countdown(at(2024, 6, 13, 7, 30));
        assert!(!cd.in_progress);
        assert_eq!((cd.days, cd.hours, cd.minutes, cd.seconds), (2, 1, 30, 0));
        assert_eq!(cd.total_seconds(), 2 * 86_400 + 3_600 + 1_800);
    }

    #[test]
    fn countdown_is_zero_during_class() {
        let rule = CadenceRule::default();
        let cd = rule.countdown(at(SAT.0, SAT.1, SAT.2, 9, 20));
        assert!(cd.in_progress);
        assert_eq!(cd.total_seconds(), 0);
        assert_eq!(cd.target, at(2024, 6, 15, 9, 0));
    }

    #[test]
    fn other_weekdays_are_supported() {
        let rule = CadenceRule::new(
            Weekday::Tue,
            NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            45,
        );
        assert_eq!(rule.next_cadence_point(at(2024, 6, 15, 12, 0)), at(2024, 6, 18, 18, 0));
        assert_eq!(rule.next_cadence_point(at(2024, 6, 18, 18, 44)), at(2024, 6, 18, 18, 0));
        assert_eq!(rule.next_cadence_point(at(2024, 6, 18, 18, 45)), at(2024, 6, 25, 18, 0));
    }
}
