use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hfr_core::{CoreConfig, DEFAULT_DATA_DIR};

/// Main entry point for the HFR application
///
/// Starts the REST server (default port 3001) serving the patient record
/// endpoints and the Swagger UI.
///
/// # Environment Variables
/// - `HFR_REST_ADDR`: REST server address (default: "0.0.0.0:3001")
/// - `HFR_DATA_DIR`: Directory for record storage (default: "./hfr_data")
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If server startup or runtime fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("hfr=info".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("HFR_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3001".into());

    tracing::info!("++ Starting HFR REST on {}", rest_addr);

    let data_dir =
        PathBuf::from(std::env::var("HFR_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.into()));
    fs::create_dir_all(&data_dir)?;

    let cfg = Arc::new(CoreConfig::new(data_dir)?);

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, api_rest::app(cfg)).await?;

    Ok(())
}
