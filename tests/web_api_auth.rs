//! Web API Authentication Tests
//!
//! Integration tests for login, password reset, first-run admin setup and
//! token handling.

mod common;

use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use serde_json::{json, Value};

use common::*;

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app().await;

    let response = app.server.get("/health").await;
    response.assert_status_ok();
    response.assert_text("OK");
}

#[tokio::test]
async fn test_admin_can_login_with_generated_password() {
    let app = create_test_app().await;

    let body = login(&app.server, "admin", &app.initial_admin_password).await;

    assert!(body["data"]["token"].as_str().is_some());
    assert!(body["data"]["expires_at"].as_i64().unwrap() > 0);
    assert_eq!(body["data"]["user"]["username"], "admin");
    assert_eq!(body["data"]["user"]["is_admin"], true);
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/api/login")
        .json(&json!({
            "username": "admin",
            "password": "definitely-wrong"
        }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_login_unknown_user_matches_wrong_password() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/api/login")
        .json(&json!({
            "username": "ghost",
            "password": "whatever-password"
        }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_login_missing_fields() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/api/login")
        .json(&json!({ "username": "admin" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_username_is_case_insensitive() {
    let app = create_test_app().await;

    let body = login(&app.server, "ADMIN", &app.initial_admin_password).await;
    assert_eq!(body["data"]["user"]["username"], "admin");
}

#[tokio::test]
async fn test_regular_user_blocked_until_admin_resets_password() {
    let app = create_test_app().await;
    let admin_token = login_token(&app.server, "admin", &app.initial_admin_password).await;

    create_user(&app.server, &admin_token, "alice", "alice-password", false).await;

    let response = app
        .server
        .post("/api/login")
        .json(&json!({
            "username": "alice",
            "password": "alice-password"
        }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "SETUP_INCOMPLETE");

    app.server
        .post("/api/reset-password")
        .add_header(AUTHORIZATION, bearer(&admin_token))
        .json(&json!({
            "current_password": app.initial_admin_password,
            "new_password": ADMIN_PASSWORD
        }))
        .await
        .assert_status_ok();

    let body = login(&app.server, "alice", "alice-password").await;
    assert_eq!(body["data"]["user"]["username"], "alice");
}

#[tokio::test]
async fn test_second_admin_can_login_before_setup() {
    let app = create_test_app().await;
    let admin_token = login_token(&app.server, "admin", &app.initial_admin_password).await;

    create_user(&app.server, &admin_token, "root2", "root2-password", true).await;

    let body = login(&app.server, "root2", "root2-password").await;
    assert_eq!(body["data"]["user"]["is_admin"], true);
}

#[tokio::test]
async fn test_second_admin_reset_does_not_complete_setup() {
    let app = create_test_app().await;
    let admin_token = login_token(&app.server, "admin", &app.initial_admin_password).await;

    create_user(&app.server, &admin_token, "root2", "root2-password", true).await;
    create_user(&app.server, &admin_token, "alice", "alice-password", false).await;
    let root2_token = login_token(&app.server, "root2", "root2-password").await;

    app.server
        .post("/api/reset-password")
        .add_header(AUTHORIZATION, bearer(&root2_token))
        .json(&json!({
            "current_password": "root2-password",
            "new_password": "root2-new-password"
        }))
        .await
        .assert_status_ok();

    assert!(app.credentials_file().exists());
    let response = app
        .server
        .post("/api/login")
        .json(&json!({
            "username": "alice",
            "password": "alice-password"
        }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "SETUP_INCOMPLETE");
}

#[tokio::test]
async fn test_admin_reset_removes_credentials_file() {
    let app = create_test_app().await;
    assert!(app.credentials_file().exists());

    let token = login_token(&app.server, "admin", &app.initial_admin_password).await;
    app.server
        .post("/api/reset-password")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({
            "current_password": app.initial_admin_password,
            "new_password": ADMIN_PASSWORD
        }))
        .await
        .assert_status_ok();

    assert!(!app.credentials_file().exists());

    // Old password no longer works, new one does
    let response = app
        .server
        .post("/api/login")
        .json(&json!({
            "username": "admin",
            "password": app.initial_admin_password
        }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    login_token(&app.server, "admin", ADMIN_PASSWORD).await;
}

#[tokio::test]
async fn test_reset_password_wrong_current() {
    let (app, token) = create_ready_app().await;

    let response = app
        .server
        .post("/api/reset-password")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({
            "current_password": "not-the-password",
            "new_password": "brand-new-password"
        }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_reset_password_too_short() {
    let (app, token) = create_ready_app().await;

    let response = app
        .server
        .post("/api/reset-password")
        .add_header(AUTHORIZATION, bearer(&token))
        .json(&json!({
            "current_password": ADMIN_PASSWORD,
            "new_password": "short"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "WEAK_PASSWORD");
}

#[tokio::test]
async fn test_reset_password_requires_token() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/api/reset-password")
        .json(&json!({
            "current_password": "x",
            "new_password": "brand-new-password"
        }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_user_info() {
    let (app, token) = create_ready_app().await;

    let response = app
        .server
        .get("/api/user-info")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["username"], "admin");
    assert_eq!(body["data"]["is_admin"], true);
    assert!(body["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_invalid_token_rejected() {
    let app = create_test_app().await;

    let response = app
        .server
        .get("/api/user-info")
        .add_header(AUTHORIZATION, bearer("not.a.token"))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_token_from_other_secret_rejected() {
    let app = create_test_app().await;

    let foreign = cloudbox::TokenIssuer::new("some-other-secret", 1)
        .issue("user-1", true)
        .unwrap()
        .token;

    app.server
        .get("/api/user-info")
        .add_header(AUTHORIZATION, bearer(&foreign))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_query_token_rejected_outside_downloads() {
    let (app, token) = create_ready_app().await;

    app.server
        .get("/api/user-info")
        .add_query_param("token", &token)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    app.server
        .get("/api/files")
        .add_query_param("token", &token)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    app.server
        .delete("/api/file/some-id")
        .add_query_param("token", &token)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_missing_token() {
    let app = create_test_app().await;

    let response = app.server.get("/api/files").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert!(body["error"]["message"].is_string());
}
