//! Request extractors whose rejections render through [`AppError`].

use axum::extract::FromRequest;

use crate::error::AppError;

/// JSON body extractor; malformed or mistyped bodies become
/// `{ "error", "code": "INVALID_JSON" }` with axum's status.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
