//! Role and permission definitions, hierarchy resolution and relation metadata.

#![forbid(unsafe_code)]

mod condition;
mod document;
mod inflection;
mod named;
mod permission;
mod registry;
mod relation;
mod role;
mod role_definition;
mod sets;
mod value;

pub use condition::{
    CONDITIONAL_METHOD_PREFIXES, ComparisonOperator, Condition, Conditions, Connective,
    PivotColumns, Predicate,
};
pub use document::{
    CatalogDocument, DefinitionDocument, DefinitionsDocument, GrantDocument, RegistryDocument,
};
pub use inflection::{camel_case, friendly_key_name, is_identifier, pluralize, snake_case};
pub use named::NamedCheck;
pub use permission::{Permission, PermissionCatalog, PermissionEnum, PermissionSpec};
pub use registry::{DEFAULT_SCOPE, DefinitionRegistry};
pub use relation::{
    NamedScope, PivotTable, RelationCatalog, RelationDefinition, RelationKind,
};
pub use role::{Role, RoleEnum, RoleSpec};
pub use role_definition::{RoleDefinition, RoleDefinitionBuilder};
pub use sets::{PermissionSet, RoleSet};
pub use value::{EnumValue, IntoValues};
