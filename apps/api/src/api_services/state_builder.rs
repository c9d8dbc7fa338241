use std::sync::Arc;

use rolegate_application::{AccessService, AssignmentStore, RelationAssignmentStore};
use rolegate_core::AppError;
use rolegate_domain::{DefinitionRegistry, RelationCatalog};
use rolegate_infrastructure::{InMemoryAssignmentStore, PostgresAssignmentStore};
use sqlx::PgPool;

use crate::api_config::ApiConfig;
use crate::state::AppState;

pub fn build_app_state(
    pool: Option<PgPool>,
    config: &ApiConfig,
    registry: DefinitionRegistry,
    relations: RelationCatalog,
) -> Result<AppState, AppError> {
    let (store, relation_store): (Arc<dyn AssignmentStore>, Arc<dyn RelationAssignmentStore>) =
        match pool.clone() {
            Some(pool) => {
                let store = Arc::new(
                    PostgresAssignmentStore::new(pool)
                        .with_role_column(config.role_column.as_str())?,
                );
                (store.clone(), store)
            }
            None => {
                let store = Arc::new(
                    InMemoryAssignmentStore::new()
                        .with_role_column(config.role_column.as_str())?,
                );
                (store.clone(), store)
            }
        };

    Ok(AppState {
        access_service: AccessService::new(
            store,
            relation_store,
            Arc::new(registry),
            Arc::new(relations),
        ),
        pool,
    })
}
