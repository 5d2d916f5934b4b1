//! Pharmacy endpoints: the dispensing queue, full and partial
//! dispensing, and inventory management.

use axum::{
    extract::{Path as AxumPath, Query, State},
    http::HeaderMap,
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use hcms_core::constants::{DEFAULT_MINIMUM_STOCK, MAX_MEDICINE_NAME_LEN};
use hcms_core::domain::{Medicine, MedicineUnit, Role};
use hcms_core::lifecycle::{DispensedLine, PartialDispense};
use hcms_core::store::{MedicineFilter, Page, StockOperation};
use hcms_core::validation;

use crate::auth;
use crate::dto::{MedicineListRes, MedicineRes, PaginationMeta, PrescriptionListRes, PrescriptionRes};
use crate::error::ApiResult;
use crate::routes::parse_uuid;
use crate::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/pharmacy/prescriptions/pending", get(pending_prescriptions))
        .route("/pharmacy/prescriptions/:id/dispense", put(dispense))
        .route(
            "/pharmacy/prescriptions/:id/partial-dispense",
            put(partial_dispense),
        )
        .route("/pharmacy/medicines", post(create_medicine))
        .route("/pharmacy/medicines", get(list_medicines))
        .route("/pharmacy/medicines/:id/stock", put(adjust_stock))
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DispenseReq {
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DispensedLineReq {
    pub name: String,
    pub quantity: u32,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PartialDispenseReq {
    pub dispensed_medicines: Vec<DispensedLineReq>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMedicineReq {
    pub name: String,
    pub generic_name: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub stock: u32,
    pub minimum_stock: Option<u32>,
    #[serde(default)]
    pub unit: MedicineUnit,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct MedicineListQuery {
    /// Substring of the name or generic name.
    pub search: Option<String>,
    /// Keep only medicines at or below their minimum stock.
    pub low_stock: Option<bool>,
    pub include_inactive: Option<bool>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockAdjustReq {
    pub operation: StockOperation,
    pub quantity: u32,
}

#[utoipa::path(
    get,
    path = "/pharmacy/prescriptions/pending",
    responses(
        (status = 200, description = "Prescriptions not yet fully dispensed", body = PrescriptionListRes),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Role not allowed")
    )
)]
/// The pharmacy's work queue, oldest first
#[axum::debug_handler]
pub(crate) async fn pending_prescriptions(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<PrescriptionListRes>> {
    let user = auth::authorize(&state, &headers).await?;
    auth::require_role(&user, &[Role::Pharmacy])?;

    let queue = state.store.pending_prescriptions().await;

    Ok(Json(PrescriptionListRes {
        success: true,
        data: queue,
    }))
}

#[utoipa::path(
    put,
    path = "/pharmacy/prescriptions/{id}/dispense",
    params(("id" = String, Path, description = "Prescription UUID")),
    request_body = DispenseReq,
    responses(
        (status = 200, description = "Prescription dispensed, visit closed", body = PrescriptionRes),
        (status = 400, description = "Already dispensed or insufficient stock"),
        (status = 403, description = "Role not allowed"),
        (status = 404, description = "Unknown prescription")
    )
)]
/// Dispense a prescription in full
///
/// Stock for every line is checked and decremented as one unit: if any
/// medicine is short, nothing is handed out and the response names the
/// shortfall. On success the visit moves to `done`.
#[axum::debug_handler]
pub(crate) async fn dispense(
    State(state): State<AppState>,
    headers: HeaderMap,
    AxumPath(id): AxumPath<String>,
    body: Option<Json<DispenseReq>>,
) -> ApiResult<Json<PrescriptionRes>> {
    let user = auth::authorize(&state, &headers).await?;
    let id = parse_uuid(&id, "prescription")?;
    let req = body.map(|Json(req)| req).unwrap_or_default();

    let prescription = state
        .lifecycle
        .dispense_prescription(auth::actor(&user), id, req.notes)
        .await?;

    Ok(Json(PrescriptionRes {
        success: true,
        data: prescription,
    }))
}

#[utoipa::path(
    put,
    path = "/pharmacy/prescriptions/{id}/partial-dispense",
    params(("id" = String, Path, description = "Prescription UUID")),
    request_body = PartialDispenseReq,
    responses(
        (status = 200, description = "Listed medicines handed out", body = PrescriptionRes),
        (status = 400, description = "Unknown lines, excess quantity or insufficient stock"),
        (status = 403, description = "Role not allowed"),
        (status = 404, description = "Unknown prescription")
    )
)]
/// Dispense part of a prescription
///
/// Hands out only the listed medicines. Once every line is settled
/// the prescription flips to `dispensed` and the visit closes;
/// otherwise it stays `partially_dispensed`.
#[axum::debug_handler]
pub(crate) async fn partial_dispense(
    State(state): State<AppState>,
    headers: HeaderMap,
    AxumPath(id): AxumPath<String>,
    Json(req): Json<PartialDispenseReq>,
) -> ApiResult<Json<PrescriptionRes>> {
    let user = auth::authorize(&state, &headers).await?;
    let id = parse_uuid(&id, "prescription")?;

    let dispensed_medicines = req
        .dispensed_medicines
        .into_iter()
        .map(|line| DispensedLine {
            name: line.name,
            quantity: line.quantity,
        })
        .collect();
    let prescription = state
        .lifecycle
        .partial_dispense_prescription(
            auth::actor(&user),
            id,
            PartialDispense {
                dispensed_medicines,
                notes: req.notes,
            },
        )
        .await?;

    Ok(Json(PrescriptionRes {
        success: true,
        data: prescription,
    }))
}

#[utoipa::path(
    post,
    path = "/pharmacy/medicines",
    request_body = CreateMedicineReq,
    responses(
        (status = 200, description = "Medicine added to the inventory", body = MedicineRes),
        (status = 400, description = "Validation error or duplicate name"),
        (status = 403, description = "Role not allowed")
    )
)]
/// Add a medicine to the inventory
///
/// Names are unique; prescription lines refer to medicines by name.
#[axum::debug_handler]
pub(crate) async fn create_medicine(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateMedicineReq>,
) -> ApiResult<Json<MedicineRes>> {
    let user = auth::authorize(&state, &headers).await?;
    auth::require_role(&user, &[Role::Pharmacy, Role::Admin])?;

    let name = validation::required_text("Medicine name", &req.name, MAX_MEDICINE_NAME_LEN)?;
    let generic_name = validation::optional_text(
        "Generic name",
        req.generic_name.as_deref(),
        MAX_MEDICINE_NAME_LEN,
    )?;
    validation::amount("Price", req.price)?;

    let medicine = Medicine::new(
        name,
        generic_name,
        req.price,
        req.stock,
        req.minimum_stock.unwrap_or(DEFAULT_MINIMUM_STOCK),
        req.unit,
        true,
    );
    state.store.insert_medicine(medicine.clone()).await?;
    tracing::info!("Added medicine {} to the inventory", medicine.name);

    Ok(Json(MedicineRes {
        success: true,
        data: medicine,
    }))
}

#[utoipa::path(
    get,
    path = "/pharmacy/medicines",
    params(MedicineListQuery),
    responses(
        (status = 200, description = "Paged inventory list", body = MedicineListRes),
        (status = 401, description = "Missing or invalid token")
    )
)]
/// List the medicine inventory
#[axum::debug_handler]
pub(crate) async fn list_medicines(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<MedicineListQuery>,
) -> ApiResult<Json<MedicineListRes>> {
    auth::authorize(&state, &headers).await?;

    let filter = MedicineFilter {
        search: query.search,
        low_stock: query.low_stock.unwrap_or(false),
        include_inactive: query.include_inactive.unwrap_or(false),
    };
    let page = Page::new(query.page, query.limit);
    let paged = state.store.list_medicines(&filter, page).await;

    Ok(Json(MedicineListRes {
        success: true,
        pagination: PaginationMeta::from_paged(&paged),
        data: paged.items,
    }))
}

#[utoipa::path(
    put,
    path = "/pharmacy/medicines/{id}/stock",
    params(("id" = String, Path, description = "Medicine UUID")),
    request_body = StockAdjustReq,
    responses(
        (status = 200, description = "Stock adjusted", body = MedicineRes),
        (status = 400, description = "Malformed UUID"),
        (status = 403, description = "Role not allowed"),
        (status = 404, description = "Unknown medicine")
    )
)]
/// Adjust a medicine's stock level
///
/// `add` tops the stock up by `quantity`; `set` replaces it outright,
/// which is how stocktake corrections are entered.
#[axum::debug_handler]
pub(crate) async fn adjust_stock(
    State(state): State<AppState>,
    headers: HeaderMap,
    AxumPath(id): AxumPath<String>,
    Json(req): Json<StockAdjustReq>,
) -> ApiResult<Json<MedicineRes>> {
    let user = auth::authorize(&state, &headers).await?;
    auth::require_role(&user, &[Role::Pharmacy, Role::Admin])?;
    let id = parse_uuid(&id, "medicine")?;

    let medicine = state.store.adjust_stock(id, req.operation, req.quantity).await?;

    Ok(Json(MedicineRes {
        success: true,
        data: medicine,
    }))
}
