pub mod auth;
pub mod health;
pub mod notifications;
pub mod skills;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth/register                       register (public)
/// /auth/login                          login (public)
/// /auth/me                             current user
/// /auth/profile                        update profile (PUT)
///
/// /skills                              list, create
/// /skills/summary                      aggregated summary
/// /skills/category/{category}          filter by category
/// /skills/level/{level}                filter by level
/// /skills/{id}                         get, update, delete
///
/// /notifications/test-email            send diagnostic email (POST)
/// /notifications/email-status          SMTP status
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/skills", skills::router())
        .nest("/notifications", notifications::router())
}
