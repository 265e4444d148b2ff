//! Router configuration for the web API.

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::Request,
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{
    delete_file, delete_user, download_file, list_files, list_users, login, reset_password,
    signup, upload, user_info,
};
use super::middleware::{create_cors_layer, token_auth};
use crate::app::AppContext;

/// Room left for multipart boundaries and part headers on top of the upload limit.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Request span without the query string, which may carry a download token.
fn request_span(request: &Request<Body>) -> tracing::Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
    )
}

/// Create the main API router.
pub fn create_router(ctx: Arc<AppContext>) -> Router {
    let body_limit = usize::try_from(ctx.files.max_upload_bytes())
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    let account_routes = Router::new()
        .route("/login", post(login))
        .route("/signup", post(signup))
        .route("/reset-password", post(reset_password))
        .route("/user-info", get(user_info))
        .route("/users", get(list_users))
        .route("/users/:id", delete(delete_user));

    let file_routes = Router::new()
        .route("/upload", post(upload))
        .route("/files", get(list_files))
        .route("/file/:id", get(download_file).delete(delete_file));

    let api_routes = Router::new().merge(account_routes).merge(file_routes);

    let issuer = ctx.tokens.clone();

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http().make_span_with(request_span))
                .layer(create_cors_layer(&ctx.config.web.cors_origins))
                .layer(DefaultBodyLimit::max(body_limit))
                .layer(middleware::from_fn(move |req, next| {
                    let issuer = issuer.clone();
                    token_auth(issuer, req, next)
                })),
        )
        .with_state(ctx)
        .merge(create_health_router())
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
