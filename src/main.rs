use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, router};
use icu_core::{CoreConfig, Services, StorageLocation, config};

/// Main entry point for the ICU backend
///
/// Loads `.env` if present, opens the store and serves the REST API with Swagger UI.
///
/// # Environment Variables
/// - `ICU_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `ICU_DATA_DIR`: Directory holding the JSON snapshot (default: "icu_data"); `:memory:`
///   keeps everything in memory
/// - `ICU_ARGON2_PARAMS`: argon2 cost as `m_cost,t_cost,p_cost` (default: argon2 defaults)
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration, store loading or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("icu_run=info".parse()?)
                .add_directive("icu_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("ICU_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let storage = config::storage_from_env_value(std::env::var("ICU_DATA_DIR").ok());
    match &storage {
        StorageLocation::Memory => tracing::warn!("++ Store is memory-only; data will not persist"),
        StorageLocation::Snapshot(path) => tracing::info!("++ Store snapshot at {}", path.display()),
    }
    let params = config::password_params_from_env_value(std::env::var("ICU_ARGON2_PARAMS").ok())?;
    let services = Services::open(Arc::new(CoreConfig::new(storage, params)))?;

    tracing::info!("++ Starting ICU REST on {}", rest_addr);

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, router(AppState::new(services))).await?;

    Ok(())
}
