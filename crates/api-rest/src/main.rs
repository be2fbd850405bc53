//! Standalone REST API server binary.
//!
//! Serves the same router as the workspace `icu-run` binary. Useful when working on the HTTP
//! layer alone.

use api_rest::{router, AppState};
use icu_core::{config, CoreConfig, Services};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Start the REST API server.
///
/// # Environment Variables
/// - `ICU_REST_ADDR`: server address (default: "0.0.0.0:3000")
/// - `ICU_DATA_DIR`: snapshot directory, or `:memory:` (default: "icu_data")
/// - `ICU_ARGON2_PARAMS`: argon2 cost as `m_cost,t_cost,p_cost`
///
/// # Errors
/// Returns an error if logging cannot be initialised, the configuration is invalid, the
/// snapshot cannot be loaded, or the address cannot be bound.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("icu_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("ICU_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let storage = config::storage_from_env_value(std::env::var("ICU_DATA_DIR").ok());
    let params =
        config::password_params_from_env_value(std::env::var("ICU_ARGON2_PARAMS").ok())?;
    let cfg = Arc::new(CoreConfig::new(storage, params));
    let services = Services::open(cfg)?;

    tracing::info!("-- Starting ICU REST API on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router(AppState::new(services))).await?;

    Ok(())
}
