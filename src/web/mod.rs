//! Web API module for CloudBox.
//!
//! JSON API over axum: account management, file upload, listing, download
//! and deletion.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::{ApiError, ErrorCode};
pub use router::create_router;
pub use server::WebServer;
