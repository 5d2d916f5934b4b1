//! Patient registration and lookup endpoints.

use axum::{
    extract::{Path as AxumPath, Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use axum::http::HeaderMap;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use hcms_core::constants::MAX_NAME_LEN;
use hcms_core::domain::{Address, Contact, Gender, Patient, Role};
use hcms_core::store::Page;
use hcms_core::validation;
use hcms_core::HcmsError;

use crate::auth;
use crate::dto::{PaginationMeta, PatientListRes, PatientRes};
use crate::error::ApiResult;
use crate::routes::parse_uuid;
use crate::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/patients", post(create_patient))
        .route("/patients", get(list_patients))
        .route("/patients/:id", get(get_patient))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePatientReq {
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub gender: Gender,
    pub phone: String,
    pub email: Option<String>,
    #[serde(default)]
    pub address: Address,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PatientListQuery {
    /// Substring of the name, or digits of the phone number.
    pub search: Option<String>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

#[utoipa::path(
    post,
    path = "/patients",
    request_body = CreatePatientReq,
    responses(
        (status = 200, description = "Patient registered", body = PatientRes),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Role not allowed")
    )
)]
/// Register a new patient
///
/// Reception staff record the patient's demographics and contact
/// details once; visits then reference the patient by id.
///
/// # Errors
/// Returns `400 Bad Request` if:
/// - a name is blank or too long,
/// - the age is out of range, or
/// - the phone number or email is malformed.
#[axum::debug_handler]
pub(crate) async fn create_patient(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreatePatientReq>,
) -> ApiResult<Json<PatientRes>> {
    let user = auth::authorize(&state, &headers).await?;
    auth::require_role(&user, &[Role::Reception, Role::Admin])?;

    let first_name = validation::required_text("First name", &req.first_name, MAX_NAME_LEN)?;
    let last_name = validation::required_text("Last name", &req.last_name, MAX_NAME_LEN)?;
    validation::age(req.age)?;
    let contact = Contact {
        phone: validation::phone(&req.phone)?,
        email: validation::email(req.email.as_deref())?,
    };

    let patient = Patient::new(
        first_name,
        last_name,
        req.age,
        req.gender,
        contact,
        req.address,
        user.id,
    );
    state.store.insert_patient(patient.clone()).await;
    tracing::info!("Registered patient {} ({})", patient.code(), patient.full_name());

    Ok(Json(PatientRes {
        success: true,
        data: patient,
    }))
}

#[utoipa::path(
    get,
    path = "/patients",
    params(PatientListQuery),
    responses(
        (status = 200, description = "Paged patient list", body = PatientListRes),
        (status = 401, description = "Missing or invalid token")
    )
)]
/// Search patients by name or phone number
#[axum::debug_handler]
pub(crate) async fn list_patients(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<PatientListQuery>,
) -> ApiResult<Json<PatientListRes>> {
    auth::authorize(&state, &headers).await?;

    let page = Page::new(query.page, query.limit);
    let paged = state.store.search_patients(query.search.as_deref(), page).await;

    Ok(Json(PatientListRes {
        success: true,
        pagination: PaginationMeta::from_paged(&paged),
        data: paged.items,
    }))
}

#[utoipa::path(
    get,
    path = "/patients/{id}",
    params(("id" = String, Path, description = "Patient UUID")),
    responses(
        (status = 200, description = "Patient record", body = PatientRes),
        (status = 400, description = "Malformed UUID"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Unknown patient")
    )
)]
/// Fetch a single patient record
#[axum::debug_handler]
pub(crate) async fn get_patient(
    State(state): State<AppState>,
    headers: HeaderMap,
    AxumPath(id): AxumPath<String>,
) -> ApiResult<Json<PatientRes>> {
    auth::authorize(&state, &headers).await?;
    let id = parse_uuid(&id, "patient")?;

    let patient = state
        .store
        .patient(id)
        .await
        .ok_or(HcmsError::NotFound("Patient"))?;

    Ok(Json(PatientRes {
        success: true,
        data: patient,
    }))
}
