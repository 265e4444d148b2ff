//! CloudBox - self-hosted multi-user file storage and sharing.
//!
//! Users upload files into a personal or shared space and manage them
//! through a token-authenticated JSON API.

pub mod app;
pub mod auth;
pub mod config;
pub mod datetime;
pub mod db;
pub mod error;
pub mod file;
pub mod logging;
pub mod web;

pub use app::AppContext;
pub use auth::{
    ensure_admin, hash_password, load_or_generate_secret, validate_password, verify_password,
    AccountService, BootstrapOutcome, HashCost, Identity, LoginOutcome, PasswordError,
    TokenIssuer, ValidationError,
};
pub use config::Config;
pub use db::{Database, NewUser, User, UserInfo, UserRepository};
pub use error::{CloudboxError, ErrorKind, Result};
pub use file::{FileService, FileStorage};
pub use web::{create_router, WebServer};
