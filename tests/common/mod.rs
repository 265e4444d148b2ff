//! Test helpers for API integration tests.
//!
//! Builds a full router over an in-memory database and a temporary
//! storage directory, with the bootstrap admin already created.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::http::header::AUTHORIZATION;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use serde_json::{json, Value};
use tempfile::TempDir;

use cloudbox::auth::bootstrap::parse_credentials_password;
use cloudbox::{create_router, ensure_admin, AppContext, Config, Database, HashCost};

/// Password the admin switches to in [`create_ready_app`].
pub const ADMIN_PASSWORD: &str = "admin-password-1";

/// Signing secret used by every test server.
pub const TEST_SECRET: &str = "test-secret-key-for-testing-only";

/// A running test application.
pub struct TestApp {
    pub server: TestServer,
    pub db: Database,
    pub config: Config,
    /// Password generated for the bootstrap admin.
    pub initial_admin_password: String,
    // Keeps the storage directory alive for the duration of the test.
    pub temp: TempDir,
}

impl TestApp {
    /// Path of the one-time admin credentials file.
    pub fn credentials_file(&self) -> PathBuf {
        PathBuf::from(&self.config.auth.credentials_file)
    }

    /// Root directory for personal files.
    pub fn files_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.files.files_dir)
    }

    /// Directory for shared files.
    pub fn shared_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.files.shared_dir)
    }
}

/// Create a test configuration rooted at `temp`.
pub fn create_test_config(temp: &TempDir) -> Config {
    let path = |name: &str| temp.path().join(name).to_string_lossy().into_owned();

    let mut config = Config::default();
    config.server.host = "127.0.0.1".to_string();
    config.server.port = 0;
    config.files.files_dir = path("uploads");
    config.files.shared_dir = path("shared");
    config.files.max_upload_size_mb = 1;
    config.auth.jwt_secret = TEST_SECRET.to_string();
    config.auth.secret_file = path("jwt_secret");
    config.auth.credentials_file = path("temp_admin_credentials.txt");
    config.auth.hash_memory_kib = HashCost::minimal().memory_kib;
    config.auth.hash_iterations = HashCost::minimal().iterations;
    config.auth.hash_parallelism = HashCost::minimal().parallelism;
    config.logging.file = path("logs/server.log");
    config
}

/// Create a test app whose admin still has the generated password.
pub async fn create_test_app() -> TestApp {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&temp);

    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");

    let credentials_file = PathBuf::from(&config.auth.credentials_file);
    ensure_admin(&db, HashCost::minimal(), &credentials_file)
        .await
        .expect("Failed to bootstrap admin");

    let text = std::fs::read_to_string(&credentials_file).expect("credentials file missing");
    let initial_admin_password = parse_credentials_password(&text)
        .expect("password missing from credentials file")
        .to_string();

    let ctx = AppContext::new(config.clone(), db.clone(), TEST_SECRET)
        .expect("Failed to create app context");
    let router = create_router(Arc::new(ctx));
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        db,
        config,
        initial_admin_password,
        temp,
    }
}

/// Create a test app where admin setup is complete.
///
/// Returns the app and an admin token.
pub async fn create_ready_app() -> (TestApp, String) {
    let app = create_test_app().await;

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

    let token = login_token(&app.server, "admin", ADMIN_PASSWORD).await;
    (app, token)
}

/// Authorization header value for a token.
pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

/// Log in and return the full response body.
pub async fn login(server: &TestServer, username: &str, password: &str) -> Value {
    server
        .post("/api/login")
        .json(&json!({
            "username": username,
            "password": password
        }))
        .await
        .json::<Value>()
}

/// Log in and return the token; panics if login fails.
pub async fn login_token(server: &TestServer, username: &str, password: &str) -> String {
    let body = login(server, username, password).await;
    body["data"]["token"]
        .as_str()
        .unwrap_or_else(|| panic!("login failed: {body}"))
        .to_string()
}

/// Create an account through the API and return its id.
pub async fn create_user(
    server: &TestServer,
    admin_token: &str,
    username: &str,
    password: &str,
    is_admin: bool,
) -> String {
    let response = server
        .post("/api/signup")
        .add_header(AUTHORIZATION, bearer(admin_token))
        .json(&json!({
            "username": username,
            "password": password,
            "is_admin": is_admin
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);

    response.json::<Value>()["data"]["id"]
        .as_str()
        .expect("user id missing")
        .to_string()
}

/// Create a regular account and return its token.
pub async fn create_user_with_token(
    server: &TestServer,
    admin_token: &str,
    username: &str,
) -> String {
    let password = format!("{username}-password");
    create_user(server, admin_token, username, &password, false).await;
    login_token(server, username, &password).await
}

/// Multipart form with a single `file` part.
pub fn file_form(filename: &str, content: &[u8]) -> MultipartForm {
    MultipartForm::new().add_part(
        "file",
        Part::bytes(content.to_vec())
            .file_name(filename.to_string())
            .mime_type("application/octet-stream"),
    )
}

/// Upload one file and return the stored entry.
pub async fn upload_file(
    server: &TestServer,
    token: &str,
    shared: bool,
    filename: &str,
    content: &[u8],
) -> Value {
    let response = server
        .post("/api/upload")
        .add_query_param("shared", shared)
        .add_header(AUTHORIZATION, bearer(token))
        .multipart(file_form(filename, content))
        .await;
    response.assert_status_ok();

    response.json::<Value>()["data"][0].clone()
}

/// List files in one namespace.
pub async fn list_files(server: &TestServer, token: &str, shared: bool) -> Vec<Value> {
    let response = server
        .get("/api/files")
        .add_query_param("shared", shared)
        .add_header(AUTHORIZATION, bearer(token))
        .await;
    response.assert_status_ok();

    response.json::<Value>()["data"]
        .as_array()
        .cloned()
        .unwrap_or_default()
}
