//! Route definitions for `/notifications`. All require auth.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::notifications;
use crate::state::AppState;

/// ```text
/// POST /test-email    -> send_test_email
/// GET  /email-status  -> email_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/test-email", post(notifications::send_test_email))
        .route("/email-status", get(notifications::email_status))
}
