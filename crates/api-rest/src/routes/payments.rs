//! Payment endpoints for the reception desk.

use axum::{
    extract::{Path as AxumPath, State},
    http::HeaderMap,
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use hcms_core::domain::{PaymentMethod, PaymentType};
use hcms_core::lifecycle::NewPayment;

use crate::auth;
use crate::dto::{PaymentListRes, PaymentRes};
use crate::error::ApiResult;
use crate::routes::parse_uuid;
use crate::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/payments", post(record_payment))
        .route("/payments/:id/confirm", put(confirm_payment))
        .route("/payments/visit/:visit_id", get(payments_for_visit))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordPaymentReq {
    pub visit: Uuid,
    pub amount: f64,
    pub payment_type: PaymentType,
    pub payment_method: PaymentMethod,
    pub transaction_id: Option<String>,
    pub notes: Option<String>,
}

#[utoipa::path(
    post,
    path = "/payments",
    request_body = RecordPaymentReq,
    responses(
        (status = 200, description = "Payment recorded, visit marked paid", body = PaymentRes),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Role not allowed"),
        (status = 404, description = "Unknown visit")
    )
)]
/// Record a payment against a visit
///
/// The payment is settled immediately and the visit is marked paid,
/// which admits it to the checker doctor's queue.
#[axum::debug_handler]
pub(crate) async fn record_payment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<RecordPaymentReq>,
) -> ApiResult<Json<PaymentRes>> {
    let user = auth::authorize(&state, &headers).await?;

    let payment = state
        .lifecycle
        .record_payment(
            auth::actor(&user),
            NewPayment {
                visit: req.visit,
                amount: req.amount,
                payment_type: req.payment_type,
                payment_method: req.payment_method,
                transaction_id: req.transaction_id,
                notes: req.notes,
            },
        )
        .await?;

    Ok(Json(PaymentRes {
        success: true,
        data: payment,
    }))
}

#[utoipa::path(
    put,
    path = "/payments/{id}/confirm",
    params(("id" = String, Path, description = "Payment UUID")),
    responses(
        (status = 200, description = "Payment confirmed", body = PaymentRes),
        (status = 400, description = "Payment is already confirmed"),
        (status = 403, description = "Role not allowed"),
        (status = 404, description = "Unknown payment")
    )
)]
/// Confirm a deferred payment
///
/// Settles a payment that was imported unpaid and marks its visit
/// paid. Confirming twice is rejected.
#[axum::debug_handler]
pub(crate) async fn confirm_payment(
    State(state): State<AppState>,
    headers: HeaderMap,
    AxumPath(id): AxumPath<String>,
) -> ApiResult<Json<PaymentRes>> {
    let user = auth::authorize(&state, &headers).await?;
    let id = parse_uuid(&id, "payment")?;

    let payment = state
        .lifecycle
        .confirm_payment(auth::actor(&user), id)
        .await?;

    Ok(Json(PaymentRes {
        success: true,
        data: payment,
    }))
}

#[utoipa::path(
    get,
    path = "/payments/visit/{visit_id}",
    params(("visit_id" = String, Path, description = "Visit UUID")),
    responses(
        (status = 200, description = "Payments recorded for the visit", body = PaymentListRes),
        (status = 400, description = "Malformed UUID"),
        (status = 401, description = "Missing or invalid token")
    )
)]
/// List the payments recorded for one visit
#[axum::debug_handler]
pub(crate) async fn payments_for_visit(
    State(state): State<AppState>,
    headers: HeaderMap,
    AxumPath(visit_id): AxumPath<String>,
) -> ApiResult<Json<PaymentListRes>> {
    auth::authorize(&state, &headers).await?;
    let visit_id = parse_uuid(&visit_id, "visit")?;

    let payments = state.store.payments_for_visit(visit_id).await;

    Ok(Json(PaymentListRes {
        success: true,
        data: payments,
    }))
}
