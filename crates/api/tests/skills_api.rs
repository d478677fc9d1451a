//! Skill and notification endpoints that must fail before reaching the
//! database, plus the error envelope when the database is down.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_offline_app, delete, delete_auth, get, get_auth, post_auth, post_json_auth,
    post_raw_json_auth, token_for,
};
use serde_json::json;

#[tokio::test]
async fn skill_routes_require_a_token() {
    for uri in [
        "/api/v1/skills",
        "/api/v1/skills/summary",
        "/api/v1/skills/1",
        "/api/v1/skills/category/Web",
        "/api/v1/skills/level/expert",
    ] {
        let response = get(build_offline_app(), uri).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }
}

#[tokio::test]
async fn create_rejects_overlong_name() {
    let token = token_for(1, "ada@example.com");
    let body = json!({
        "name": "x".repeat(201),
        "category": "Web",
        "level": "Expert"
    });

    let response = post_json_auth(build_offline_app(), "/api/v1/skills", body, &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn create_rejects_blank_category() {
    let token = token_for(1, "ada@example.com");
    let body = json!({ "name": "Rust", "category": "   ", "level": "Beginner" });

    let response = post_json_auth(build_offline_app(), "/api/v1/skills", body, &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_rejects_unknown_level() {
    let token = token_for(1, "ada@example.com");
    let body = json!({ "name": "Rust", "category": "Languages", "level": "Guru" });

    let response = post_json_auth(build_offline_app(), "/api/v1/skills", body, &token).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "INVALID_JSON");
    assert!(json["error"].as_str().unwrap().contains("Guru"));
}

#[tokio::test]
async fn malformed_body_uses_the_error_envelope() {
    let token = token_for(1, "ada@example.com");

    let response = post_raw_json_auth(
        build_offline_app(),
        "/api/v1/skills",
        "{ name: \"Rust\" ",
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "INVALID_JSON");
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn level_filter_rejects_unknown_level() {
    let token = token_for(1, "ada@example.com");

    let response = get_auth(build_offline_app(), "/api/v1/skills/level/guru", &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("guru"));
}

#[tokio::test]
async fn delete_requires_a_token() {
    let response = delete(build_offline_app(), "/api/v1/skills/1").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn delete_rejects_an_invalid_token() {
    let response = delete_auth(build_offline_app(), "/api/v1/skills/1", "bogus").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn database_outage_is_a_sanitized_500() {
    let token = token_for(1, "ada@example.com");

    let response = get_auth(build_offline_app(), "/api/v1/skills", &token).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}

#[tokio::test]
async fn email_status_reports_unconfigured_smtp() {
    let token = token_for(1, "ada@example.com");

    let response = get_auth(
        build_offline_app(),
        "/api/v1/notifications/email-status",
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["configured"], false);
}

#[tokio::test]
async fn test_email_without_smtp_is_a_bad_request() {
    let token = token_for(1, "ada@example.com");

    let response = post_auth(
        build_offline_app(),
        "/api/v1/notifications/test-email",
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}
