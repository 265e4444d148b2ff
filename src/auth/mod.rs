//! Authentication module for CloudBox.
//!
//! This module provides password hashing, token issuing, first-run admin
//! bootstrap and the account service that enforces role checks.

pub mod bootstrap;
mod password;
pub mod secret;
mod service;
mod token;
pub mod validation;

pub use bootstrap::{ensure_admin, generate_password, BootstrapOutcome, PASSWORD_ALPHABET};
pub use password::{
    hash_password, hash_password_blocking, validate_password, verify_password,
    verify_password_blocking, HashCost, PasswordError, MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH,
};
pub use secret::load_or_generate_secret;
pub use service::{AccountService, LoginOutcome};
pub use token::{Identity, IssuedToken, TokenClaims, TokenIssuer};
pub use validation::{validate_username, ValidationError};
