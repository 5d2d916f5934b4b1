//! Visit lifecycle endpoints: registration, the checker queue, the
//! doctor assessments and manual status overrides.

use axum::{
    extract::{Path as AxumPath, Query, State},
    http::HeaderMap,
    response::Json,
    routing::{get, post, put},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use hcms_core::domain::{LabTestType, Role, VisitStatus};
use hcms_core::lifecycle::{CheckerAssessment, DirectAssessment, LabTestOrder, NewVisit};
use hcms_core::store::{Page, VisitFilter};

use crate::auth;
use crate::dto::{
    AssessmentData, AssessmentRes, PaginationMeta, VisitDetail, VisitDetailRes, VisitListRes,
    VisitQueueRes, VisitRes,
};
use crate::error::{ApiError, ApiResult};
use crate::routes::parse_uuid;
use crate::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/visits", post(create_visit))
        .route("/visits", get(list_visits))
        .route("/visits/pending", get(pending_visits))
        .route("/visits/:id", get(get_visit))
        .route("/visits/:id/status", put(update_status))
        .route("/checker/visits/:id/checker", put(checker_assessment))
        .route("/checker/visits/:id/direct", put(checker_direct))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateVisitReq {
    pub patient: Uuid,
    pub complaint: String,
    pub visit_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct VisitListQuery {
    /// Wire name of a visit status, e.g. `lab_pending`.
    pub status: Option<String>,
    pub paid: Option<bool>,
    pub patient: Option<Uuid>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LabOrderReq {
    pub test_name: String,
    pub test_type: LabTestType,
    #[serde(default)]
    pub cost: f64,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentReq {
    pub symptoms: Option<String>,
    #[serde(default)]
    pub lab_tests: Vec<LabOrderReq>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DirectAssessmentReq {
    pub symptoms: Option<String>,
    pub diagnosis: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusReq {
    /// Wire name of the target status.
    pub status: String,
    pub notes: Option<String>,
}

fn parse_status(value: &str) -> Result<VisitStatus, ApiError> {
    VisitStatus::parse(value)
        .ok_or_else(|| ApiError::bad_request(format!("Unknown visit status: {value}")))
}

#[utoipa::path(
    post,
    path = "/visits",
    request_body = CreateVisitReq,
    responses(
        (status = 200, description = "Visit registered", body = VisitRes),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Role not allowed"),
        (status = 404, description = "Unknown patient")
    )
)]
/// Register a visit for an existing patient
///
/// Reception opens the visit with the presenting complaint. Checker
/// doctors are notified over the WebSocket channel once the record is
/// committed.
#[axum::debug_handler]
pub(crate) async fn create_visit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateVisitReq>,
) -> ApiResult<Json<VisitRes>> {
    let user = auth::authorize(&state, &headers).await?;

    let visit = state
        .lifecycle
        .create_visit(
            auth::actor(&user),
            NewVisit {
                patient: req.patient,
                complaint: req.complaint,
                visit_date: req.visit_date,
            },
        )
        .await?;

    Ok(Json(VisitRes {
        success: true,
        data: visit,
    }))
}

#[utoipa::path(
    get,
    path = "/visits",
    params(VisitListQuery),
    responses(
        (status = 200, description = "Paged visit list", body = VisitListRes),
        (status = 400, description = "Unknown status filter"),
        (status = 401, description = "Missing or invalid token")
    )
)]
/// List visits, newest first, with optional filters
#[axum::debug_handler]
pub(crate) async fn list_visits(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<VisitListQuery>,
) -> ApiResult<Json<VisitListRes>> {
    auth::authorize(&state, &headers).await?;

    let status = match query.status.as_deref() {
        Some(value) => Some(parse_status(value)?),
        None => None,
    };
    let filter = VisitFilter {
        status,
        paid: query.paid,
        patient: query.patient,
    };
    let page = Page::new(query.page, query.limit);
    let paged = state.store.list_visits(filter, page).await;

    Ok(Json(VisitListRes {
        success: true,
        pagination: PaginationMeta::from_paged(&paged),
        data: paged.items,
    }))
}

#[utoipa::path(
    get,
    path = "/visits/pending",
    responses(
        (status = 200, description = "Paid registered visits, oldest first", body = VisitQueueRes),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Role not allowed")
    )
)]
/// The checker doctor's queue
///
/// Returns visits that are registered and paid, oldest first, so the
/// queue is worked in arrival order.
#[axum::debug_handler]
pub(crate) async fn pending_visits(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<VisitQueueRes>> {
    let user = auth::authorize(&state, &headers).await?;
    auth::require_role(&user, &[Role::CheckerDoctor])?;

    let queue = state.store.pending_visits().await;

    Ok(Json(VisitQueueRes {
        success: true,
        data: queue,
    }))
}

#[utoipa::path(
    get,
    path = "/visits/{id}",
    params(("id" = String, Path, description = "Visit UUID")),
    responses(
        (status = 200, description = "Visit with related documents", body = VisitDetailRes),
        (status = 400, description = "Malformed UUID"),
        (status = 404, description = "Unknown visit")
    )
)]
/// Fetch a visit with its patient, doctors, lab tests, prescription
/// and payments resolved
#[axum::debug_handler]
pub(crate) async fn get_visit(
    State(state): State<AppState>,
    headers: HeaderMap,
    AxumPath(id): AxumPath<String>,
) -> ApiResult<Json<VisitDetailRes>> {
    auth::authorize(&state, &headers).await?;
    let id = parse_uuid(&id, "visit")?;

    let bundle = state.store.load_visit_with_relations(id).await?;

    Ok(Json(VisitDetailRes {
        success: true,
        data: VisitDetail::from(bundle),
    }))
}

#[utoipa::path(
    put,
    path = "/checker/visits/{id}/checker",
    params(("id" = String, Path, description = "Visit UUID")),
    request_body = AssessmentReq,
    responses(
        (status = 200, description = "Assessment recorded", body = AssessmentRes),
        (status = 400, description = "Visit is not in registered status"),
        (status = 403, description = "Role not allowed"),
        (status = 404, description = "Unknown visit")
    )
)]
/// Record the checker doctor's assessment
///
/// Captures symptoms and any ordered lab tests. With lab orders the
/// visit moves to `lab_pending`; without, to `checked`.
#[axum::debug_handler]
pub(crate) async fn checker_assessment(
    State(state): State<AppState>,
    headers: HeaderMap,
    AxumPath(id): AxumPath<String>,
    Json(req): Json<AssessmentReq>,
) -> ApiResult<Json<AssessmentRes>> {
    let user = auth::authorize(&state, &headers).await?;
    let id = parse_uuid(&id, "visit")?;

    let lab_tests = req
        .lab_tests
        .into_iter()
        .map(|order| LabTestOrder {
            test_name: order.test_name,
            test_type: order.test_type,
            cost: order.cost,
        })
        .collect();
    let (visit, lab_tests) = state
        .lifecycle
        .record_checker_assessment(
            auth::actor(&user),
            id,
            CheckerAssessment {
                symptoms: req.symptoms,
                lab_tests,
            },
        )
        .await?;

    Ok(Json(AssessmentRes {
        success: true,
        data: AssessmentData { visit, lab_tests },
    }))
}

#[utoipa::path(
    put,
    path = "/checker/visits/{id}/direct",
    params(("id" = String, Path, description = "Visit UUID")),
    request_body = DirectAssessmentReq,
    responses(
        (status = 200, description = "Visit advanced without lab work", body = VisitRes),
        (status = 400, description = "Visit is not in registered status"),
        (status = 403, description = "Role not allowed"),
        (status = 404, description = "Unknown visit")
    )
)]
/// The checker doctor's shortcut for simple cases
///
/// No lab work is ordered. With a diagnosis the visit jumps straight
/// to `diagnosed`; otherwise it lands on `checked`.
#[axum::debug_handler]
pub(crate) async fn checker_direct(
    State(state): State<AppState>,
    headers: HeaderMap,
    AxumPath(id): AxumPath<String>,
    Json(req): Json<DirectAssessmentReq>,
) -> ApiResult<Json<VisitRes>> {
    let user = auth::authorize(&state, &headers).await?;
    let id = parse_uuid(&id, "visit")?;

    let visit = state
        .lifecycle
        .record_checker_direct(
            auth::actor(&user),
            id,
            DirectAssessment {
                symptoms: req.symptoms,
                diagnosis: req.diagnosis,
            },
        )
        .await?;

    Ok(Json(VisitRes {
        success: true,
        data: visit,
    }))
}

#[utoipa::path(
    put,
    path = "/visits/{id}/status",
    params(("id" = String, Path, description = "Visit UUID")),
    request_body = UpdateStatusReq,
    responses(
        (status = 200, description = "Status updated", body = VisitRes),
        (status = 400, description = "Transition not allowed from the current status"),
        (status = 403, description = "Role may not set the target status"),
        (status = 404, description = "Unknown visit")
    )
)]
/// Move a visit to a new status
///
/// The transition must be reachable from the current status and the
/// caller's role must own the target, per the workflow matrix.
#[axum::debug_handler]
pub(crate) async fn update_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    AxumPath(id): AxumPath<String>,
    Json(req): Json<UpdateStatusReq>,
) -> ApiResult<Json<VisitRes>> {
    let user = auth::authorize(&state, &headers).await?;
    let id = parse_uuid(&id, "visit")?;
    let target = parse_status(&req.status)?;

    let visit = state
        .lifecycle
        .update_visit_status(auth::actor(&user), id, target, req.notes)
        .await?;

    Ok(Json(VisitRes {
        success: true,
        data: visit,
    }))
}
