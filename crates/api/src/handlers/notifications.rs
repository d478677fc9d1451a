//! Handlers for the `/notifications` diagnostics endpoints.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::ok;
use crate::state::AppState;

/// Query for `POST /notifications/test-email`. Defaults to the caller's
/// own address.
#[derive(Debug, Deserialize, Validate)]
pub struct TestEmailQuery {
    #[validate(email(message = "Invalid email address"))]
    pub to: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TestEmailResult {
    pub sent: bool,
    pub to: String,
}

#[derive(Debug, Serialize)]
pub struct EmailStatus {
    pub configured: bool,
    pub message: &'static str,
}

/// POST /api/v1/notifications/test-email
///
/// Send a diagnostic email. An unconfigured or failing SMTP relay is a 400
/// so the caller sees the problem directly.
pub async fn send_test_email(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<TestEmailQuery>,
) -> AppResult<impl IntoResponse> {
    query.validate()?;

    if !state.email.is_configured() {
        return Err(AppError::BadRequest(
            "Email delivery is not configured".into(),
        ));
    }

    let to = query.to.unwrap_or(auth.email);
    tracing::info!(user_id = auth.user_id, to = %to, "Sending test email");

    if !state.email.send_test_email(&to).await {
        return Err(AppError::BadRequest(
            "Failed to send email. Check the SMTP configuration".into(),
        ));
    }

    Ok(ok(TestEmailResult { sent: true, to }))
}

/// GET /api/v1/notifications/email-status
///
/// Reports whether SMTP is configured without exposing any settings.
pub async fn email_status(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let configured = state.email.is_configured();
    Ok(ok(EmailStatus {
        configured,
        message: if configured {
            "Email service is configured and ready"
        } else {
            "Email service is not configured"
        },
    }))
}
