use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use rolegate_application::{RelationResolver, Resolver};
use rolegate_core::AppResult;

use crate::dto::{
    ChangeResponse, CheckResponse, PermissionResponse, RelationCanRequest,
    RelationNamedCheckRequest, RelationPermissionsRequest, RelationRolesRequest,
    RelationScopeRequest, RoleResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

mod checks;
mod permissions;
mod roles;

pub use checks::{
    relation_authorize_handler, relation_authorize_role_handler, relation_can_handler,
    relation_has_role_handler, relation_holds_handler, relation_named_check_handler,
};
pub use permissions::{
    relation_give_permissions_handler, relation_list_direct_permissions_handler,
    relation_revoke_permissions_handler,
};
pub use roles::{
    relation_assign_roles_handler, relation_list_permissions_handler,
    relation_list_roles_handler, relation_remove_roles_handler,
};

/// Builds the scoped resolver, replaying chained calls in order.
fn resolver(state: &AppState, request: RelationScopeRequest) -> AppResult<RelationResolver> {
    let owner = request.owner.into_entity()?;
    let related = request.related.into_entity()?;

    let mut resolver = state
        .access_service
        .entity(owner)
        .of(related, request.relation.as_deref())?;
    for call in &request.calls {
        resolver = resolver.call(call.method.as_str(), &call.arguments)?;
    }

    Ok(resolver.with_pivot(request.pivot))
}

#[cfg(test)]
mod tests;
