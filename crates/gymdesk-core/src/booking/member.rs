use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A client of the gym. Strike and ban counters are denormalized onto the
/// member document by the admin workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub strikes: u32,
    #[serde(default)]
    pub ban_until: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BanStatus {
    Clear,
    Active { until: NaiveDateTime },
}

impl BanStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, BanStatus::Active { .. })
    }
}

impl Member {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            strikes: 0,
            ban_until: None,
        }
    }

    /// An expired `ban_until` reads as clear.
    pub fn ban_status(&self, now: NaiveDateTime) -> BanStatus {
        match self.ban_until {
            Some(until) if until > now => BanStatus::Active { until },
            _ => BanStatus::Clear,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn ban_is_active_until_expiry() {
        let mut m = Member::new("m1", "Alex");
        assert_eq!(m.ban_status(at(10, 9)), BanStatus::Clear);

        m.ban_until = Some(at(20, 0));
        assert_eq!(m.ban_status(at(10, 9)), BanStatus::Active { until: at(20, 0) });
        assert_eq!(m.ban_status(at(20, 0)), BanStatus::Clear);
        assert!(!m.ban_status(at(21, 0)).is_active());
    }

    #[test]
    fn missing_counters_default_to_zero() {
        let m: Member = serde_json::from_str(r#"{"id":"m2"}"#).unwrap();
        assert_eq!(m.strikes, 0);
        assert!(m.ban_until.is_none());
        assert!(m.name.is_empty());
    }
}
