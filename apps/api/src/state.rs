use rolegate_application::AccessService;
use sqlx::PgPool;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub access_service: AccessService,
    pub pool: Option<PgPool>,
}
