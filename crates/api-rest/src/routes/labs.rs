//! Lab workbench endpoints: the pending queue, per-visit listings and
//! result submission with an optional report file.

use axum::{
    extract::{Multipart, Path as AxumPath, State},
    http::HeaderMap,
    response::Json,
    routing::{get, put},
    Router,
};

use hcms_core::domain::Role;
use hcms_core::lifecycle::LabCompletion;

use crate::auth;
use crate::dto::{LabTestListRes, LabTestRes};
use crate::error::{ApiError, ApiResult};
use crate::routes::parse_uuid;
use crate::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/labs/pending", get(pending_tests))
        .route("/labs/visit/:visit_id", get(tests_for_visit))
        .route("/labs/:id/result", put(submit_result))
}

#[utoipa::path(
    get,
    path = "/labs/pending",
    responses(
        (status = 200, description = "Incomplete lab tests, oldest first", body = LabTestListRes),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Role not allowed")
    )
)]
/// The lab tech's work queue
#[axum::debug_handler]
pub(crate) async fn pending_tests(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<LabTestListRes>> {
    let user = auth::authorize(&state, &headers).await?;
    auth::require_role(&user, &[Role::LabTech])?;

    let queue = state.store.pending_lab_tests().await;

    Ok(Json(LabTestListRes {
        success: true,
        data: queue,
    }))
}

#[utoipa::path(
    get,
    path = "/labs/visit/{visit_id}",
    params(("visit_id" = String, Path, description = "Visit UUID")),
    responses(
        (status = 200, description = "Lab tests ordered for the visit", body = LabTestListRes),
        (status = 400, description = "Malformed UUID"),
        (status = 401, description = "Missing or invalid token")
    )
)]
/// List the lab tests ordered for one visit
#[axum::debug_handler]
pub(crate) async fn tests_for_visit(
    State(state): State<AppState>,
    headers: HeaderMap,
    AxumPath(visit_id): AxumPath<String>,
) -> ApiResult<Json<LabTestListRes>> {
    auth::authorize(&state, &headers).await?;
    let visit_id = parse_uuid(&visit_id, "visit")?;

    let tests = state.store.tests_for_visit(visit_id).await;

    Ok(Json(LabTestListRes {
        success: true,
        data: tests,
    }))
}

#[utoipa::path(
    put,
    path = "/labs/{id}/result",
    params(("id" = String, Path, description = "Lab test UUID")),
    request_body(content = String, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Result recorded", body = LabTestRes),
        (status = 400, description = "Missing result text or the test is already completed"),
        (status = 403, description = "Role not allowed"),
        (status = 404, description = "Unknown lab test")
    )
)]
/// Submit a lab result
///
/// Multipart form with a `result` text field, an optional `notes`
/// field and an optional `resultFile` report. The file is stored
/// content-addressed and referenced from the test by relative URL.
/// Completing the last outstanding test moves the visit to `lab_done`.
#[axum::debug_handler]
pub(crate) async fn submit_result(
    State(state): State<AppState>,
    headers: HeaderMap,
    AxumPath(id): AxumPath<String>,
    mut multipart: Multipart,
) -> ApiResult<Json<LabTestRes>> {
    let user = auth::authorize(&state, &headers).await?;
    let id = parse_uuid(&id, "lab test")?;

    let mut result: Option<String> = None;
    let mut notes: Option<String> = None;
    let mut file_url: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("Malformed multipart request: {e:?}");
        ApiError::bad_request("Malformed multipart request")
    })? {
        match field.name() {
            Some("result") => {
                result = Some(field.text().await.map_err(|e| {
                    tracing::error!("Failed to read result field: {e:?}");
                    ApiError::bad_request("Malformed result field")
                })?);
            }
            Some("notes") => {
                notes = Some(field.text().await.map_err(|e| {
                    tracing::error!("Failed to read notes field: {e:?}");
                    ApiError::bad_request("Malformed notes field")
                })?);
            }
            Some("resultFile") => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| "report".to_string());
                let bytes = field.bytes().await.map_err(|e| {
                    tracing::error!("Failed to read uploaded report: {e:?}");
                    ApiError::bad_request("Malformed report upload")
                })?;
                let stored = state.attachments.store(&bytes, &filename)?;
                file_url = Some(format!("/uploads/{}", stored.relative_path.as_str()));
            }
            _ => {}
        }
    }

    let result = result.ok_or_else(|| ApiError::bad_request("Result is required"))?;
    let test = state
        .lifecycle
        .complete_lab_test(
            auth::actor(&user),
            id,
            LabCompletion {
                result,
                file_url,
                notes,
            },
        )
        .await?;

    Ok(Json(LabTestRes {
        success: true,
        data: test,
    }))
}
