//! Rolegate API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod dto;
mod error;
mod handlers;
mod state;

use rolegate_core::AppError;
use tracing::info;

use crate::api_config::{ApiConfig, StoreBackendConfig};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    api_config::init_tracing();

    let config = ApiConfig::load()?;

    let pool = match &config.store_backend {
        StoreBackendConfig::Postgres { database_url } => {
            Some(api_services::connect_and_migrate(database_url.as_str()).await?)
        }
        StoreBackendConfig::Memory => None,
    };

    if config.migrate_only {
        info!("database migrations applied successfully");
        return Ok(());
    }

    let definitions_path = config
        .definitions_path
        .as_deref()
        .ok_or_else(|| AppError::Validation("ROLEGATE_DEFINITIONS_PATH is required".to_owned()))?;
    let (registry, relations) = api_services::load_definitions(definitions_path).await?;

    let app_state = api_services::build_app_state(pool, &config, registry, relations)?;
    let app = api_router::build_router(app_state);

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "rolegate-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
