//! Prescription endpoints for the main doctor.

use axum::{
    extract::{Path as AxumPath, State},
    http::HeaderMap,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use hcms_core::lifecycle::{NewPrescription, PrescriptionLine};
use hcms_core::HcmsError;

use crate::auth;
use crate::dto::{CreatePrescriptionRes, PrescriptionRes, PrescriptionWithVisit};
use crate::error::ApiResult;
use crate::routes::parse_uuid;
use crate::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/prescriptions", post(create_prescription))
        .route("/prescriptions/visit/:visit_id", get(prescription_for_visit))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionLineReq {
    pub name: String,
    pub dosage: String,
    pub duration: String,
    pub instruction: Option<String>,
    pub quantity: u32,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePrescriptionReq {
    pub visit: Uuid,
    pub medicines: Vec<PrescriptionLineReq>,
    pub diagnosis: Option<String>,
    pub notes: Option<String>,
}

#[utoipa::path(
    post,
    path = "/prescriptions",
    request_body = CreatePrescriptionReq,
    responses(
        (status = 200, description = "Prescription written, visit diagnosed", body = CreatePrescriptionRes),
        (status = 400, description = "Visit is not ready for prescription"),
        (status = 403, description = "Role not allowed"),
        (status = 404, description = "Unknown visit")
    )
)]
/// Write a prescription for a visit
///
/// The visit must have finished its lab work (or been checked without
/// any). Medicine prices are snapshotted from the inventory into the
/// visit's running total, and the visit moves to `diagnosed`.
#[axum::debug_handler]
pub(crate) async fn create_prescription(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreatePrescriptionReq>,
) -> ApiResult<Json<CreatePrescriptionRes>> {
    let user = auth::authorize(&state, &headers).await?;

    let medicines = req
        .medicines
        .into_iter()
        .map(|line| PrescriptionLine {
            name: line.name,
            dosage: line.dosage,
            duration: line.duration,
            instruction: line.instruction,
            quantity: line.quantity,
        })
        .collect();
    let (prescription, visit) = state
        .lifecycle
        .create_prescription(
            auth::actor(&user),
            NewPrescription {
                visit: req.visit,
                medicines,
                diagnosis: req.diagnosis,
                notes: req.notes,
            },
        )
        .await?;

    Ok(Json(CreatePrescriptionRes {
        success: true,
        data: PrescriptionWithVisit {
            prescription,
            visit,
        },
    }))
}

#[utoipa::path(
    get,
    path = "/prescriptions/visit/{visit_id}",
    params(("visit_id" = String, Path, description = "Visit UUID")),
    responses(
        (status = 200, description = "The visit's prescription", body = PrescriptionRes),
        (status = 400, description = "Malformed UUID"),
        (status = 404, description = "No prescription for the visit")
    )
)]
/// Fetch the prescription written for one visit
#[axum::debug_handler]
pub(crate) async fn prescription_for_visit(
    State(state): State<AppState>,
    headers: HeaderMap,
    AxumPath(visit_id): AxumPath<String>,
) -> ApiResult<Json<PrescriptionRes>> {
    auth::authorize(&state, &headers).await?;
    let visit_id = parse_uuid(&visit_id, "visit")?;

    let prescription = state
        .store
        .prescription_for_visit(visit_id)
        .await
        .ok_or(HcmsError::NotFound("Prescription"))?;

    Ok(Json(PrescriptionRes {
        success: true,
        data: prescription,
    }))
}
