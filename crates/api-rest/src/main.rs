//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own.
//!
//! ## Intended use
//! This binary is useful for development and debugging when you only want
//! the REST server (with OpenAPI/Swagger UI). The workspace's main
//! `hfr-run` binary is the deployable entry point.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hfr_core::{CoreConfig, DEFAULT_DATA_DIR};

/// Main entry point for the HFR REST API server
///
/// Starts the REST API server on the configured address (default:
/// 0.0.0.0:3001) with OpenAPI/Swagger documentation.
///
/// # Environment Variables
/// - `HFR_REST_ADDR`: Server address (default: "0.0.0.0:3001")
/// - `HFR_DATA_DIR`: Directory for record storage (default: "./hfr_data")
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the data directory cannot be created,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("HFR_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3001".into());

    tracing::info!("-- Starting HFR REST API on {}", addr);

    let data_dir =
        PathBuf::from(std::env::var("HFR_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.into()));
    fs::create_dir_all(&data_dir)?;

    let cfg = Arc::new(CoreConfig::new(data_dir)?);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, api_rest::app(cfg)).await?;

    Ok(())
}
