//! Route definitions for the `/skills` resource. All require auth.

use axum::routing::get;
use axum::Router;

use crate::handlers::skills;
use crate::state::AppState;

/// Routes mounted at `/skills`.
///
/// ```text
/// GET    /                      -> list_skills
/// POST   /                      -> create_skill
/// GET    /summary               -> get_summary
/// GET    /category/{category}   -> list_by_category
/// GET    /level/{level}         -> list_by_level
/// GET    /{id}                  -> get_skill
/// PUT    /{id}                  -> update_skill
/// DELETE /{id}                  -> delete_skill
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(skills::list_skills).post(skills::create_skill))
        .route("/summary", get(skills::get_summary))
        .route("/category/{category}", get(skills::list_by_category))
        .route("/level/{level}", get(skills::list_by_level))
        .route(
            "/{id}",
            get(skills::get_skill)
                .put(skills::update_skill)
                .delete(skills::delete_skill),
        )
}
