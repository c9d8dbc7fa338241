use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use rolegate_application::{DirectResolver, Resolver};
use rolegate_core::{AppResult, EntityRef};

use crate::dto::{
    CanRequest, ChangeResponse, CheckResponse, PermissionResponse, PermissionsRequest,
    RoleResponse, RolesRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

mod checks;
mod permissions;
mod roles;

pub use checks::{
    authorize_handler, authorize_role_handler, can_handler, has_role_handler, holds_handler,
    named_check_handler,
};
pub use permissions::{
    give_permissions_handler, list_direct_permissions_handler, list_permissions_handler,
    revoke_permissions_handler,
};
pub use roles::{assign_roles_handler, list_roles_handler, remove_roles_handler};

fn resolver(state: &AppState, collection: String, key: String) -> AppResult<DirectResolver> {
    Ok(state
        .access_service
        .entity(EntityRef::new(collection, key)?))
}
