//! File handlers.

use axum::{
    body::Body,
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use std::sync::Arc;

use crate::app::AppContext;
use crate::web::dto::{
    ApiResponse, FileResponse, ListFilesQuery, MessageResponse, UploadQuery, UploadResponse,
};
use crate::web::error::{ApiError, ErrorCode};
use crate::web::middleware::{AuthUser, DownloadUser};

/// Multipart field names accepted as file content.
const FILE_FIELDS: [&str; 2] = ["file", "files"];

/// Build a Content-Disposition header value for a download.
///
/// Non-ASCII names get an RFC 5987 `filename*` parameter next to a
/// sanitized ASCII fallback.
fn content_disposition_header(filename: &str) -> String {
    let needs_encoding = !filename.is_ascii()
        || filename
            .chars()
            .any(|c| c.is_control() || c == '"' || c == '\\');

    if !needs_encoding {
        return format!("attachment; filename=\"{}\"", filename);
    }

    let fallback: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' | '\\' => '_',
            c if !c.is_ascii() => '_',
            c => c,
        })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(filename)
    )
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::new(ErrorCode::PayloadTooLarge, "File too large")
    } else {
        tracing::debug!("Failed to read multipart data: {}", e);
        ApiError::bad_request("Invalid multipart data")
    }
}

/// POST /api/upload?shared= - Upload one or more files.
///
/// Every multipart field named `file` or `files` is stored as its own file.
pub async fn upload(
    State(ctx): State<Arc<AppContext>>,
    AuthUser(identity): AuthUser,
    Query(query): Query<UploadQuery>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<Vec<UploadResponse>>>, ApiError> {
    let mut uploaded = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let is_file_field = field
            .name()
            .map(|name| FILE_FIELDS.contains(&name))
            .unwrap_or(false);
        if !is_file_field {
            continue;
        }

        let filename = field
            .file_name()
            .map(|s| s.to_string())
            .ok_or_else(|| ApiError::bad_request("File field without filename"))?;
        let content = field.bytes().await.map_err(multipart_error)?;

        let file = ctx
            .files
            .upload(&identity.user_id, query.shared, &content, &filename)
            .await?;
        uploaded.push(UploadResponse::from(file));
    }

    if uploaded.is_empty() {
        return Err(ApiError::bad_request("File is required"));
    }

    Ok(Json(ApiResponse::new(uploaded)))
}

/// GET /api/files?shared=&keyword= - List personal or shared files.
pub async fn list_files(
    State(ctx): State<Arc<AppContext>>,
    AuthUser(identity): AuthUser,
    Query(query): Query<ListFilesQuery>,
) -> Result<Json<ApiResponse<Vec<FileResponse>>>, ApiError> {
    let files = ctx
        .files
        .list(&identity.user_id, query.shared, query.keyword.as_deref())
        .await?;

    Ok(Json(ApiResponse::new(
        files.into_iter().map(FileResponse::from).collect(),
    )))
}

/// GET /api/file/:id - Download a file.
pub async fn download_file(
    State(ctx): State<Arc<AppContext>>,
    DownloadUser(identity): DownloadUser,
    Path(file_id): Path<String>,
) -> Result<Response, ApiError> {
    let download = ctx.files.download(&file_id, &identity.user_id).await?;

    let content_type = mime_guess::from_path(&download.filename)
        .first_or_octet_stream()
        .to_string();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, download.content.len())
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(&download.filename),
        )
        .body(Body::from(download.content))
        .map_err(|e| {
            tracing::error!("Failed to build download response: {}", e);
            ApiError::internal("Failed to build response")
        })
}

/// DELETE /api/file/:id - Delete a file.
pub async fn delete_file(
    State(ctx): State<Arc<AppContext>>,
    AuthUser(identity): AuthUser,
    Path(file_id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    ctx.files.delete(&file_id, &identity.user_id).await?;
    Ok(Json(ApiResponse::new(MessageResponse::new("File deleted"))))
}
