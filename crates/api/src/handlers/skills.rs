//! Handlers for the `/skills` resource.
//!
//! Every query is scoped to the authenticated user; another user's skill id
//! behaves exactly like a missing one (404).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;
use skilltrack_core::error::CoreError;
use skilltrack_core::skill::{SkillInfo, SkillLevel};
use skilltrack_core::summary::summarize;
use skilltrack_core::types::DbId;
use skilltrack_db::models::skill::{into_infos, CreateSkill, UpdateSkill};
use skilltrack_db::repositories::SkillRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::response::{created, ok};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request DTOs
// ---------------------------------------------------------------------------

/// Request body for `POST /skills`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSkillRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub level: SkillLevel,
}

/// Request body for `PUT /skills/{id}`.
///
/// Blank `name`/`category` are ignored rather than rejected.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSkillRequest {
    #[validate(length(max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 100))]
    pub category: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub level: Option<SkillLevel>,
}

impl CreateSkillRequest {
    fn into_create(self) -> AppResult<CreateSkill> {
        let name = self.name.trim();
        let category = self.category.trim();
        if name.is_empty() || category.is_empty() {
            return Err(AppError::Core(CoreError::Validation(
                "Skill name and category must not be blank".into(),
            )));
        }
        Ok(CreateSkill {
            name: name.to_string(),
            category: category.to_string(),
            description: self.description,
            level: self.level,
        })
    }
}

impl From<UpdateSkillRequest> for UpdateSkill {
    fn from(input: UpdateSkillRequest) -> Self {
        let non_blank = |s: Option<String>| {
            s.map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        UpdateSkill {
            name: non_blank(input.name),
            category: non_blank(input.category),
            description: input.description,
            level: input.level,
        }
    }
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// GET /api/v1/skills
///
/// Most recently updated first.
pub async fn list_skills(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let rows = SkillRepo::list_for_user(&state.pool, auth.user_id).await?;
    Ok(ok(into_infos(rows)?))
}

/// POST /api/v1/skills
pub async fn create_skill(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateSkillRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let create = input.into_create()?;

    let row = SkillRepo::create(&state.pool, auth.user_id, &create).await?;

    tracing::info!(
        user_id = auth.user_id,
        skill_id = row.id,
        category = %row.category,
        "Skill created"
    );

    Ok(created(SkillInfo::try_from(row)?))
}

/// GET /api/v1/skills/{id}
pub async fn get_skill(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let row = SkillRepo::find_for_user(&state.pool, id, auth.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Skill", id))?;
    Ok(ok(SkillInfo::try_from(row)?))
}

/// PUT /api/v1/skills/{id}
///
/// Partial update; `last_updated` moves to now even if nothing else changed.
pub async fn update_skill(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<UpdateSkillRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let row = SkillRepo::update_for_user(&state.pool, id, auth.user_id, &input.into())
        .await?
        .ok_or_else(|| AppError::not_found("Skill", id))?;

    tracing::info!(user_id = auth.user_id, skill_id = id, "Skill updated");

    Ok(ok(SkillInfo::try_from(row)?))
}

/// DELETE /api/v1/skills/{id}
pub async fn delete_skill(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !SkillRepo::delete_for_user(&state.pool, id, auth.user_id).await? {
        return Err(AppError::not_found("Skill", id));
    }
    tracing::info!(user_id = auth.user_id, skill_id = id, "Skill deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// GET /api/v1/skills/summary
///
/// Computed fresh on every call.
pub async fn get_summary(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let rows = SkillRepo::list_for_user(&state.pool, auth.user_id).await?;
    Ok(ok(summarize(&into_infos(rows)?)))
}

/// GET /api/v1/skills/category/{category}
///
/// Exact, case-sensitive match.
pub async fn list_by_category(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> AppResult<impl IntoResponse> {
    let rows = SkillRepo::list_for_user_by_category(&state.pool, auth.user_id, &category).await?;
    Ok(ok(into_infos(rows)?))
}

/// GET /api/v1/skills/level/{level}
///
/// `level` is a name (`expert`) or its number (`3`).
pub async fn list_by_level(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(level): Path<String>,
) -> AppResult<impl IntoResponse> {
    let level: SkillLevel = level.parse()?;
    let rows =
        SkillRepo::list_for_user_by_level(&state.pool, auth.user_id, level.as_i16()).await?;
    Ok(ok(into_infos(rows)?))
}
