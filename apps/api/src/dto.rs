mod common;
mod definitions;
mod entities;
mod relations;

pub use common::{ChangeResponse, CheckResponse, HealthResponse};
pub use definitions::{DefinitionResponse, PermissionResponse, RoleResponse};
pub use entities::{CanRequest, PermissionsRequest, RolesRequest};
pub use relations::{
    RelationCanRequest, RelationNamedCheckRequest, RelationPermissionsRequest,
    RelationRolesRequest, RelationScopeRequest,
};
