//! Serves stored lab report files back to authenticated staff.

use axum::{
    extract::{Path as AxumPath, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use hcms_files::HASH_FOLDER_NAME;

use crate::auth;
use crate::error::ApiResult;
use crate::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/uploads/sha256/:shard/:hash", get(download))
}

#[utoipa::path(
    get,
    path = "/uploads/sha256/{shard}/{hash}",
    params(
        ("shard" = String, Path, description = "First two hex digits of the digest"),
        ("hash" = String, Path, description = "Full SHA-256 digest of the file")
    ),
    responses(
        (status = 200, description = "Attachment bytes", content_type = "application/octet-stream"),
        (status = 400, description = "Malformed path"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "No such attachment")
    )
)]
/// Download a lab report file
///
/// The path segments are exactly what a LabTest's `fileUrl` points at.
/// They are validated against the content-addressed layout before any
/// filesystem access.
#[axum::debug_handler]
pub(crate) async fn download(
    State(state): State<AppState>,
    headers: HeaderMap,
    AxumPath((shard, hash)): AxumPath<(String, String)>,
) -> ApiResult<Response> {
    auth::authorize(&state, &headers).await?;

    let relative = format!("{HASH_FOLDER_NAME}/{shard}/{hash}");
    let (bytes, metadata) = state.attachments.read(&relative)?;
    let content_type = metadata
        .media_type
        .map(|media| media.into_inner())
        .unwrap_or_else(|| "application/octet-stream".to_string());

    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}
