//! Admin user management handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::app::AppContext;
use crate::web::dto::{ApiResponse, MessageResponse, SignupRequest, UserResponse, ValidatedJson};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;

/// POST /api/signup - Create an account (admin only).
pub async fn signup(
    State(ctx): State<Arc<AppContext>>,
    AuthUser(identity): AuthUser,
    ValidatedJson(req): ValidatedJson<SignupRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), ApiError> {
    let user = ctx
        .accounts
        .create_user(&identity, &req.username, &req.password, req.is_admin)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::new(user.into()))))
}

/// GET /api/users - List accounts (admin only).
pub async fn list_users(
    State(ctx): State<Arc<AppContext>>,
    AuthUser(identity): AuthUser,
) -> Result<Json<ApiResponse<Vec<UserResponse>>>, ApiError> {
    let users = ctx.accounts.list_users(&identity).await?;
    Ok(Json(ApiResponse::new(
        users.into_iter().map(UserResponse::from).collect(),
    )))
}

/// DELETE /api/users/:id - Delete an account (admin only).
pub async fn delete_user(
    State(ctx): State<Arc<AppContext>>,
    AuthUser(identity): AuthUser,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    ctx.accounts.delete_user(&identity, &user_id).await?;
    Ok(Json(ApiResponse::new(MessageResponse::new("User deleted"))))
}
