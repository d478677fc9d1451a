//! Repository for the `skills` table.
//!
//! Every user-facing query is scoped by `user_id` so a caller can never read
//! or mutate another user's skills by guessing an id.

use skilltrack_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::skill::{CreateSkill, Skill, UpdateSkill};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, user_id, name, category, description, level, created_at, last_updated";

/// Provides CRUD and aggregate queries for skills.
pub struct SkillRepo;

impl SkillRepo {
    /// Insert a new skill owned by `user_id`. Both timestamps default to now.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateSkill,
    ) -> Result<Skill, sqlx::Error> {
        let query = format!(
            "INSERT INTO skills (user_id, name, category, description, level)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Skill>(&query)
            .bind(user_id)
            .bind(&input.name)
            .bind(&input.category)
            .bind(&input.description)
            .bind(input.level.as_i16())
            .fetch_one(pool)
            .await
    }

    /// Find one skill, scoped to its owner.
    pub async fn find_for_user(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Skill>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM skills WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Skill>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// List a user's skills, most recently updated first.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Skill>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM skills \
             WHERE user_id = $1 \
             ORDER BY last_updated DESC, id"
        );
        sqlx::query_as::<_, Skill>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// List a user's skills in one category (exact, case-sensitive match).
    pub async fn list_for_user_by_category(
        pool: &PgPool,
        user_id: DbId,
        category: &str,
    ) -> Result<Vec<Skill>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM skills \
             WHERE user_id = $1 AND category = $2 \
             ORDER BY last_updated DESC, id"
        );
        sqlx::query_as::<_, Skill>(&query)
            .bind(user_id)
            .bind(category)
            .fetch_all(pool)
            .await
    }

    /// List a user's skills at one stored level value.
    pub async fn list_for_user_by_level(
        pool: &PgPool,
        user_id: DbId,
        level: i16,
    ) -> Result<Vec<Skill>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM skills \
             WHERE user_id = $1 AND level = $2 \
             ORDER BY last_updated DESC, id"
        );
        sqlx::query_as::<_, Skill>(&query)
            .bind(user_id)
            .bind(level)
            .fetch_all(pool)
            .await
    }

    /// Patch a skill. `None` fields are left unchanged; `last_updated` is
    /// always bumped to now.
    ///
    /// Returns `None` if the skill does not exist or belongs to someone else.
    pub async fn update_for_user(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
        input: &UpdateSkill,
    ) -> Result<Option<Skill>, sqlx::Error> {
        let query = format!(
            "UPDATE skills SET
                name = COALESCE($3, name),
                category = COALESCE($4, category),
                description = COALESCE($5, description),
                level = COALESCE($6, level),
                last_updated = GREATEST(NOW(), created_at)
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Skill>(&query)
            .bind(id)
            .bind(user_id)
            .bind(&input.name)
            .bind(&input.category)
            .bind(&input.description)
            .bind(input.level.map(|l| l.as_i16()))
            .fetch_optional(pool)
            .await
    }

    /// Delete a skill. Returns `true` if a row was removed.
    pub async fn delete_for_user(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM skills WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Newest `last_updated` across a user's skills, or `None` when the user
    /// has no skills.
    pub async fn max_last_updated_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<Timestamp>, sqlx::Error> {
        let (max,): (Option<Timestamp>,) =
            sqlx::query_as("SELECT MAX(last_updated) FROM skills WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(pool)
                .await?;
        Ok(max)
    }
}
