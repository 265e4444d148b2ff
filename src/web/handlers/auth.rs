//! Authentication handlers.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::app::AppContext;
use crate::web::dto::{
    ApiResponse, LoginRequest, LoginResponse, MessageResponse, ResetPasswordRequest,
    UserResponse, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;

/// POST /api/login - Log in and receive a token.
pub async fn login(
    State(ctx): State<Arc<AppContext>>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let outcome = ctx.accounts.login(&req.username, &req.password).await?;

    Ok(Json(ApiResponse::new(LoginResponse {
        token: outcome.token,
        expires_at: outcome.expires_at,
        user: outcome.user.into(),
    })))
}

/// POST /api/reset-password - Change the caller's password.
pub async fn reset_password(
    State(ctx): State<Arc<AppContext>>,
    AuthUser(identity): AuthUser,
    ValidatedJson(req): ValidatedJson<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    ctx.accounts
        .reset_password(&identity.user_id, &req.current_password, &req.new_password)
        .await?;

    Ok(Json(ApiResponse::new(MessageResponse::new(
        "Password reset successful",
    ))))
}

/// GET /api/user-info - The caller's own account.
pub async fn user_info(
    State(ctx): State<Arc<AppContext>>,
    AuthUser(identity): AuthUser,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = ctx.accounts.current_user(&identity.user_id).await?;
    Ok(Json(ApiResponse::new(user.into())))
}
