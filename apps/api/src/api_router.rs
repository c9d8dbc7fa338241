use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

pub fn build_router(app_state: AppState) -> Router {
    let entity_routes = Router::new()
        .route(
            "/api/entities/{collection}/{key}/roles",
            get(handlers::entities::list_roles_handler)
                .post(handlers::entities::assign_roles_handler),
        )
        .route(
            "/api/entities/{collection}/{key}/roles/remove",
            post(handlers::entities::remove_roles_handler),
        )
        .route(
            "/api/entities/{collection}/{key}/permissions",
            get(handlers::entities::list_permissions_handler)
                .post(handlers::entities::give_permissions_handler),
        )
        .route(
            "/api/entities/{collection}/{key}/permissions/direct",
            get(handlers::entities::list_direct_permissions_handler),
        )
        .route(
            "/api/entities/{collection}/{key}/permissions/revoke",
            post(handlers::entities::revoke_permissions_handler),
        )
        .route(
            "/api/entities/{collection}/{key}/has-role",
            post(handlers::entities::has_role_handler),
        )
        .route(
            "/api/entities/{collection}/{key}/holds",
            post(handlers::entities::holds_handler),
        )
        .route(
            "/api/entities/{collection}/{key}/can",
            post(handlers::entities::can_handler),
        )
        .route(
            "/api/entities/{collection}/{key}/checks/{name}",
            get(handlers::entities::named_check_handler),
        )
        .route(
            "/api/entities/{collection}/{key}/authorize",
            post(handlers::entities::authorize_handler),
        )
        .route(
            "/api/entities/{collection}/{key}/authorize-role",
            post(handlers::entities::authorize_role_handler),
        );

    let relation_routes = Router::new()
        .route(
            "/api/relations/roles",
            post(handlers::relations::relation_list_roles_handler),
        )
        .route(
            "/api/relations/permissions",
            post(handlers::relations::relation_list_permissions_handler),
        )
        .route(
            "/api/relations/permissions/direct",
            post(handlers::relations::relation_list_direct_permissions_handler),
        )
        .route(
            "/api/relations/give",
            post(handlers::relations::relation_give_permissions_handler),
        )
        .route(
            "/api/relations/revoke",
            post(handlers::relations::relation_revoke_permissions_handler),
        )
        .route(
            "/api/relations/assign",
            post(handlers::relations::relation_assign_roles_handler),
        )
        .route(
            "/api/relations/remove",
            post(handlers::relations::relation_remove_roles_handler),
        )
        .route(
            "/api/relations/has-role",
            post(handlers::relations::relation_has_role_handler),
        )
        .route(
            "/api/relations/holds",
            post(handlers::relations::relation_holds_handler),
        )
        .route(
            "/api/relations/can",
            post(handlers::relations::relation_can_handler),
        )
        .route(
            "/api/relations/checks",
            post(handlers::relations::relation_named_check_handler),
        )
        .route(
            "/api/relations/authorize",
            post(handlers::relations::relation_authorize_handler),
        )
        .route(
            "/api/relations/authorize-role",
            post(handlers::relations::relation_authorize_role_handler),
        );

    Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route(
            "/api/definitions",
            get(handlers::definitions::list_definitions_handler),
        )
        .route(
            "/api/definitions/relations",
            get(handlers::definitions::list_relations_handler),
        )
        .merge(entity_routes)
        .merge(relation_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
