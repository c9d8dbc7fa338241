use rolegate_core::AppResult;
use rolegate_domain::{EnumValue, Permission, Role, RoleDefinition};
use serde::Serialize;

/// API representation of a declared permission.
#[derive(Debug, Serialize)]
pub struct PermissionResponse {
    pub value: EnumValue,
    pub key: String,
    pub title: String,
    pub description: String,
}

impl From<&Permission> for PermissionResponse {
    fn from(permission: &Permission) -> Self {
        Self {
            value: permission.value().clone(),
            key: permission.key().to_owned(),
            title: permission.title().to_owned(),
            description: permission.description().to_owned(),
        }
    }
}

/// API representation of a role and its effective permissions.
#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub value: EnumValue,
    pub key: String,
    pub title: String,
    pub description: String,
    pub permissions: Vec<EnumValue>,
}

impl From<&Role> for RoleResponse {
    fn from(role: &Role) -> Self {
        Self {
            value: role.value().clone(),
            key: role.key().to_owned(),
            title: role.title().to_owned(),
            description: role.description().to_owned(),
            permissions: role.permissions().values(),
        }
    }
}

/// API representation of a registered role definition.
#[derive(Debug, Serialize)]
pub struct DefinitionResponse {
    pub scope: String,
    pub name: String,
    pub uses_hierarchy: bool,
    pub delete_pivot_on_remove: bool,
    pub roles: Vec<RoleResponse>,
    pub permissions: Vec<PermissionResponse>,
}

impl DefinitionResponse {
    pub fn new(scope: String, definition: &RoleDefinition) -> AppResult<Self> {
        Ok(Self {
            scope,
            name: definition.name().to_owned(),
            uses_hierarchy: definition.uses_hierarchy(),
            delete_pivot_on_remove: definition.delete_pivot_on_remove(),
            roles: definition.all()?.iter().map(RoleResponse::from).collect(),
            permissions: definition
                .catalog()
                .all()
                .iter()
                .map(PermissionResponse::from)
                .collect(),
        })
    }
}
