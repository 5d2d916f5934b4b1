//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own.
//!
//! ## Intended use
//! This binary is useful for development and debugging when you only want the REST server (with
//! OpenAPI/Swagger UI). The workspace's main `hcms-run` binary is the usual entry point.

use std::path::PathBuf;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::state::AppState;
use hcms_core::{config::admin_token_from_value, CoreConfig};

/// Main entry point for the HCMS REST API server
///
/// Starts the REST API server on the configured address (default: 0.0.0.0:3000).
/// Provides HTTP endpoints for the clinic workflow with OpenAPI/Swagger documentation.
///
/// # Environment Variables
/// - `HCMS_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `HCMS_UPLOAD_DIR`: Directory for lab report files (default: "hcms_data/uploads")
/// - `HCMS_ADMIN_TOKEN`: Bearer token for the bootstrap admin account (required)
///
/// # Returns
/// * `Ok(())` - If server starts and runs successfully
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the admin token is missing or too short,
/// - the upload directory cannot be created,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("hcms_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("HCMS_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    tracing::info!("-- Starting HCMS REST API on {}", addr);

    let upload_dir =
        std::env::var("HCMS_UPLOAD_DIR").unwrap_or_else(|_| "hcms_data/uploads".into());
    let upload_path = PathBuf::from(&upload_dir);
    std::fs::create_dir_all(&upload_path)?;

    let admin_token = admin_token_from_value(std::env::var("HCMS_ADMIN_TOKEN").ok())?;

    let cfg = CoreConfig::new(upload_path, admin_token)?;
    let state = AppState::new(cfg)?;
    state.bootstrap().await;

    api_rest::serve(&addr, state).await
}
