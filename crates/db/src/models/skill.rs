//! Skill entity model and DTOs.

use serde::Deserialize;
use skilltrack_core::error::CoreError;
use skilltrack_core::skill::{SkillInfo, SkillLevel};
use skilltrack_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `skills` table. `level` is the stored `SMALLINT` (1..=3).
#[derive(Debug, Clone, FromRow)]
pub struct Skill {
    pub id: DbId,
    pub user_id: DbId,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub level: i16,
    pub created_at: Timestamp,
    pub last_updated: Timestamp,
}

impl TryFrom<Skill> for SkillInfo {
    type Error = CoreError;

    fn try_from(row: Skill) -> Result<Self, Self::Error> {
        Ok(SkillInfo {
            level: SkillLevel::try_from(row.level)?,
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            category: row.category,
            description: row.description,
            created_at: row.created_at,
            last_updated: row.last_updated,
        })
    }
}

/// Convert a batch of rows, failing on the first unknown level.
pub fn into_infos(rows: Vec<Skill>) -> Result<Vec<SkillInfo>, CoreError> {
    rows.into_iter().map(SkillInfo::try_from).collect()
}

/// DTO for creating a skill.
#[derive(Debug, Deserialize)]
pub struct CreateSkill {
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub level: SkillLevel,
}

/// DTO for patching a skill. `None` leaves the column unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateSkill {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub level: Option<SkillLevel>,
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn row(level: i16) -> Skill {
        let now = Utc::now();
        Skill {
            id: 1,
            user_id: 2,
            name: "Tokio".into(),
            category: "Rust".into(),
            description: Some("async runtime".into()),
            level,
            created_at: now,
            last_updated: now,
        }
    }

    #[test]
    fn converts_known_level() {
        let info = SkillInfo::try_from(row(3)).unwrap();
        assert_eq!(info.level, SkillLevel::Expert);
        assert_eq!(info.user_id, 2);
        assert_eq!(info.description.as_deref(), Some("async runtime"));
    }

    #[test]
    fn rejects_unknown_level() {
        assert!(SkillInfo::try_from(row(9)).is_err());
        assert!(into_infos(vec![row(1), row(0)]).is_err());
    }
}
