//! Middleware for Web API.

pub mod auth;
pub mod cors;

pub use auth::{token_auth, AuthUser, DownloadUser};
pub use cors::create_cors_layer;
