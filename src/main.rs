use std::path::PathBuf;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::state::AppState;
use hcms_core::{config::admin_token_from_value, CoreConfig};

/// Main entry point for the HCMS application
///
/// Starts the REST server, which carries the WebSocket notification
/// channel and the Swagger UI alongside the HTTP endpoints.
///
/// # Environment Variables
/// - `HCMS_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `HCMS_UPLOAD_DIR`: Directory for lab report files (default: "hcms_data/uploads")
/// - `HCMS_ADMIN_TOKEN`: Bearer token for the bootstrap admin account (required)
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If startup or runtime fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hcms_run=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("hcms_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("HCMS_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    tracing::info!("++ Starting HCMS REST on {}", rest_addr);

    let upload_dir =
        std::env::var("HCMS_UPLOAD_DIR").unwrap_or_else(|_| "hcms_data/uploads".into());
    let upload_path = PathBuf::from(&upload_dir);
    std::fs::create_dir_all(&upload_path)?;

    let admin_token = admin_token_from_value(std::env::var("HCMS_ADMIN_TOKEN").ok())?;

    let cfg = CoreConfig::new(upload_path, admin_token)?;
    let state = AppState::new(cfg)?;
    state.bootstrap().await;

    api_rest::serve(&rest_addr, state).await
}
