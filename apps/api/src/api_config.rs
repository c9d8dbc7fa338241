use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use rolegate_core::AppError;
use rolegate_infrastructure::DEFAULT_ROLE_COLUMN;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub enum StoreBackendConfig {
    Memory,
    Postgres { database_url: String },
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub definitions_path: Option<String>,
    pub store_backend: StoreBackendConfig,
    pub api_host: String,
    pub api_port: u16,
    pub role_column: String,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let store_backend = match env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "memory".to_owned())
            .as_str()
        {
            "memory" => StoreBackendConfig::Memory,
            "postgres" => StoreBackendConfig::Postgres {
                database_url: required_non_empty_env("DATABASE_URL")?,
            },
            other => {
                return Err(AppError::Validation(format!(
                    "STORE_BACKEND must be either 'memory' or 'postgres', got '{other}'"
                )));
            }
        };

        if migrate_only && matches!(store_backend, StoreBackendConfig::Memory) {
            return Err(AppError::Validation(
                "migrate requires STORE_BACKEND=postgres".to_owned(),
            ));
        }

        // Migrations do not need the definitions document.
        let definitions_path = if migrate_only {
            env::var("ROLEGATE_DEFINITIONS_PATH").ok()
        } else {
            Some(required_non_empty_env("ROLEGATE_DEFINITIONS_PATH")?)
        };

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let role_column = env::var("ROLE_COLUMN_NAME")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ROLE_COLUMN.to_owned());

        Ok(Self {
            migrate_only,
            definitions_path,
            store_backend,
            api_host,
            api_port,
            role_column,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = required_env(name)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}
