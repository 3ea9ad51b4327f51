use serde::{Deserialize, Serialize};

/// Workout lengths (minutes) offered by the player.
pub const ALLOWED_DURATIONS: [u32; 5] = [10, 15, 20, 30, 45];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Beginner, Level::Intermediate, Level::Advanced];

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Beginner => "beginner",
            Level::Intermediate => "intermediate",
            Level::Advanced => "advanced",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "beginner" | "easy" => Ok(Level::Beginner),
            "intermediate" | "medium" => Ok(Level::Intermediate),
            "advanced" | "hard" => Ok(Level::Advanced),
            other => Err(format!("unknown level: {other}")),
        }
    }
}

/// Work/rest seconds of one difficulty tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub work_secs: u32,
    pub rest_secs: u32,
}

impl LevelConfig {
    pub const fn new(work_secs: u32, rest_secs: u32) -> Self {
        Self {
            work_secs,
            rest_secs,
        }
    }

    /// Work plus rest. Widened so user-configured tiers cannot overflow.
    pub fn interval_secs(&self) -> u64 {
        u64::from(self.work_secs) + u64::from(self.rest_secs)
    }
}

/// Level configs for all tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelTable {
    #[serde(default = "default_beginner")]
    pub beginner: LevelConfig,
    #[serde(default = "default_intermediate")]
    pub intermediate: LevelConfig,
    #[serde(default = "default_advanced")]
    pub advanced: LevelConfig,
}

fn default_beginner() -> LevelConfig {
    LevelConfig::new(30, 30)
}
fn default_intermediate() -> LevelConfig {
    LevelConfig::new(40, 20)
}
fn default_advanced() -> LevelConfig {
    LevelConfig::new(45, 15)
}

impl Default for LevelTable {
    fn default() -> Self {
        Self {
            beginner: default_beginner(),
            intermediate: default_intermediate(),
            advanced: default_advanced(),
        }
    }
}

impl LevelTable {
    pub fn get(&self, level: Level) -> LevelConfig {
        match level {
            Level::Beginner => self.beginner,
            Level::Intermediate => self.intermediate,
            Level::Advanced => self.advanced,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tiers() {
        let table = LevelTable::default();
        assert_eq!(table.get(Level::Beginner).interval_secs(), 60);
        assert_eq!(table.get(Level::Intermediate), LevelConfig::new(40, 20));
        assert_eq!(table.get(Level::Advanced).rest_secs, 15);
    }

    #[test]
    fn level_parses_aliases() {
        assert_eq!("Hard".parse::<Level>().unwrap(), Level::Advanced);
        assert_eq!("intermediate".parse::<Level>().unwrap(), Level::Intermediate);
        assert!("elite".parse::<Level>().is_err());
    }
}
