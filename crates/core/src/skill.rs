//! Skill proficiency levels and the storage-independent skill view.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// SkillLevel
// ---------------------------------------------------------------------------

/// Ordered proficiency level. Declaration order defines `Ord`:
/// `Beginner < Intermediate < Expert`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SkillLevel {
    #[serde(alias = "beginner")]
    Beginner,
    #[serde(alias = "intermediate")]
    Intermediate,
    #[serde(alias = "expert")]
    Expert,
}

impl SkillLevel {
    /// All levels in ascending order.
    pub const ALL: [SkillLevel; 3] = [Self::Beginner, Self::Intermediate, Self::Expert];

    /// The `SMALLINT` value stored in `skills.level`.
    pub fn as_i16(self) -> i16 {
        match self {
            Self::Beginner => 1,
            Self::Intermediate => 2,
            Self::Expert => 3,
        }
    }

    /// Human-readable label, also used in emails.
    pub fn name(self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Expert => "Expert",
        }
    }
}

impl TryFrom<i16> for SkillLevel {
    type Error = CoreError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Beginner),
            2 => Ok(Self::Intermediate),
            3 => Ok(Self::Expert),
            other => Err(CoreError::UnknownSkillLevel(other.to_string())),
        }
    }
}

/// Accepts a level name (case-insensitive) or its numeric value, so
/// `/skills/level/expert` and `/skills/level/3` resolve the same way.
impl FromStr for SkillLevel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(n) = trimmed.parse::<i16>() {
            return Self::try_from(n);
        }
        Self::ALL
            .into_iter()
            .find(|level| level.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| CoreError::UnknownSkillLevel(trimmed.to_string()))
    }
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// SkillInfo
// ---------------------------------------------------------------------------

/// A skill as seen by the aggregator, the scheduler, and API responses.
///
/// Decoupled from the database row so that pure logic can be tested without
/// a connection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillInfo {
    pub id: DbId,
    pub user_id: DbId,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub level: SkillLevel,
    pub created_at: Timestamp,
    pub last_updated: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_ordered() {
        assert!(SkillLevel::Beginner < SkillLevel::Intermediate);
        assert!(SkillLevel::Intermediate < SkillLevel::Expert);
    }

    #[test]
    fn stored_value_round_trips() {
        for level in SkillLevel::ALL {
            assert_eq!(SkillLevel::try_from(level.as_i16()).unwrap(), level);
        }
        assert!(SkillLevel::try_from(0).is_err());
        assert!(SkillLevel::try_from(4).is_err());
    }

    #[test]
    fn parses_names_case_insensitively_and_numbers() {
        assert_eq!("expert".parse::<SkillLevel>().unwrap(), SkillLevel::Expert);
        assert_eq!(
            "Intermediate".parse::<SkillLevel>().unwrap(),
            SkillLevel::Intermediate
        );
        assert_eq!("1".parse::<SkillLevel>().unwrap(), SkillLevel::Beginner);
        assert!("guru".parse::<SkillLevel>().is_err());
    }

    #[test]
    fn serializes_as_variant_name() {
        let json = serde_json::to_string(&SkillLevel::Expert).unwrap();
        assert_eq!(json, "\"Expert\"");
    }
}
