//! Read-only data access used by the scheduler.

use async_trait::async_trait;
use skilltrack_core::skill::SkillInfo;
use skilltrack_core::types::{DbId, Timestamp};
use skilltrack_db::models::skill::into_infos;
use skilltrack_db::models::user::User;
use skilltrack_db::repositories::{SkillRepo, UserRepo};
use sqlx::PgPool;

use crate::error::NotificationError;

/// Users and skills as the notification rules need them.
#[async_trait]
pub trait SkillStore: Send + Sync {
    /// Every user with `email_notifications_enabled = true`.
    async fn list_users_with_notifications_enabled(&self) -> Result<Vec<User>, NotificationError>;

    /// All skills belonging to `user_id`.
    async fn list_skills_for_user(
        &self,
        user_id: DbId,
    ) -> Result<Vec<SkillInfo>, NotificationError>;

    /// Latest `last_updated` across the user's skills; `None` when the user
    /// has no skills.
    async fn max_last_updated_for_user(
        &self,
        user_id: DbId,
    ) -> Result<Option<Timestamp>, NotificationError>;
}

/// Postgres-backed store delegating to the repositories.
#[derive(Clone)]
pub struct PgSkillStore {
    pool: PgPool,
}

impl PgSkillStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SkillStore for PgSkillStore {
    async fn list_users_with_notifications_enabled(&self) -> Result<Vec<User>, NotificationError> {
        Ok(UserRepo::list_with_notifications_enabled(&self.pool).await?)
    }

    async fn list_skills_for_user(
        &self,
        user_id: DbId,
    ) -> Result<Vec<SkillInfo>, NotificationError> {
        let rows = SkillRepo::list_for_user(&self.pool, user_id).await?;
        Ok(into_infos(rows)?)
    }

    async fn max_last_updated_for_user(
        &self,
        user_id: DbId,
    ) -> Result<Option<Timestamp>, NotificationError> {
        Ok(SkillRepo::max_last_updated_for_user(&self.pool, user_id).await?)
    }
}
