//! API handlers.

pub mod auth;
pub mod file;
pub mod user;

pub use auth::*;
pub use file::*;
pub use user::*;
