//! Bearer token authentication.

use axum::{
    async_trait,
    body::Body,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, Request},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::auth::{Identity, TokenIssuer};
use crate::web::error::ApiError;

/// Extractor for authenticated users.
///
/// The token is taken from the `Authorization: Bearer` header only.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

/// Extractor for file downloads.
///
/// Like [`AuthUser`], but falls back to a `token` query parameter so that
/// download links work in a browser.
#[derive(Debug, Clone)]
pub struct DownloadUser(pub Identity);

/// Pull the bearer token out of the `Authorization` header.
fn extract_bearer(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())?
        .strip_prefix("Bearer ")
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Pull the `token` query parameter out of the request URI.
fn extract_query_token(parts: &Parts) -> Option<String> {
    parts.uri.query()?.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        if key == "token" {
            urlencoding::decode(value).ok().map(|s| s.into_owned())
        } else {
            None
        }
    })
}

fn verify(parts: &Parts, token: Option<String>) -> Result<Identity, ApiError> {
    let token = token.ok_or_else(|| ApiError::unauthorized("Missing authorization"))?;

    // Set by the token_auth middleware
    let issuer = parts
        .extensions
        .get::<Arc<TokenIssuer>>()
        .ok_or_else(|| ApiError::internal("Token verifier not configured"))?;

    Ok(issuer.verify(&token)?)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = extract_bearer(parts);
        verify(parts, token).map(AuthUser)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for DownloadUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // A non-bearer Authorization header is not replaced by the query token
        let token = if parts.headers.contains_key(AUTHORIZATION) {
            extract_bearer(parts)
        } else {
            extract_query_token(parts)
        };
        verify(parts, token).map(DownloadUser)
    }
}

/// Middleware function to inject the token verifier into request extensions.
pub async fn token_auth(
    issuer: Arc<TokenIssuer>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    request.extensions_mut().insert(issuer);
    next.run(request).await
}
