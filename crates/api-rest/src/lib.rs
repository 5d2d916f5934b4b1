//! # HCMS REST API
//!
//! REST transport for the clinic workflow engine.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - Role-scoped WebSocket notifications
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS)
//!
//! All domain rules live in `hcms-core`; this crate authenticates the
//! caller, shapes requests and responses, and serves lab report files.

#![warn(rust_2018_idioms)]

pub mod auth;
mod docs;
pub mod dto;
pub mod error;
mod routes;
pub mod state;
pub mod ws;

use axum::{extract::State, response::Json, routing::get, Router};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::docs::ApiDoc;
use crate::dto::MessageRes;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = MessageRes)
    )
)]
/// Health check endpoint
///
/// Used for monitoring and load balancer health checks.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<MessageRes> {
    Json(MessageRes {
        success: true,
        message: "HCMS REST API is alive".to_string(),
    })
}

/// Builds the application router over the shared state.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ws", get(ws::ws_handler))
        .merge(routes::patients::router())
        .merge(routes::visits::router())
        .merge(routes::labs::router())
        .merge(routes::prescriptions::router())
        .merge(routes::pharmacy::router())
        .merge(routes::payments::router())
        .merge(routes::users::router())
        .merge(routes::uploads::router())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds `addr` and serves the API until the process stops.
pub async fn serve(addr: &str, state: AppState) -> anyhow::Result<()> {
    let app = app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hcms_core::CoreConfig;
    use tempfile::TempDir;

    #[tokio::test]
    async fn router_builds_over_fresh_state() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let cfg = CoreConfig::new(
            dir.path().to_path_buf(),
            "integration-admin-token".to_string(),
        )
        .expect("Failed to build config");
        let state = AppState::new(cfg).expect("Failed to build state");
        let _app = app(state);
    }
}
