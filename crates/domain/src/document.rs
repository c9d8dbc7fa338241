//! JSON document declaring catalogs, definitions, registry and relations.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use rolegate_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::permission::{PermissionCatalog, PermissionSpec};
use crate::registry::DefinitionRegistry;
use crate::relation::{NamedScope, RelationCatalog, RelationDefinition};
use crate::role::RoleSpec;
use crate::role_definition::RoleDefinition;
use crate::value::EnumValue;

/// Permission catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogDocument {
    /// Catalog name referenced by role definitions.
    pub name: String,
    /// Permissions in declaration order.
    pub permissions: Vec<PermissionSpec>,
}

/// One mapping entry of a role definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantDocument {
    /// Role value.
    pub role: EnumValue,
    /// Permission values granted to the role.
    #[serde(default)]
    pub permissions: Vec<EnumValue>,
}

/// Role definition entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionDocument {
    /// Definition name.
    pub name: String,
    /// Name of the catalog permissions come from.
    pub permission_catalog: String,
    /// Roles, highest first.
    pub roles: Vec<RoleSpec>,
    /// Ordered mapping; must follow role order.
    #[serde(default)]
    pub grants: Vec<GrantDocument>,
    /// Whether higher roles inherit lower roles' grants.
    #[serde(default)]
    pub use_hierarchy: bool,
    /// Whether relation role removal deletes association rows.
    #[serde(default)]
    pub delete_pivot_on_remove: bool,
}

/// Registry entry: default definition plus scope overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryDocument {
    /// Name of the fallback definition.
    pub default: String,
    /// Scope key to definition name.
    #[serde(default)]
    pub scopes: BTreeMap<String, String>,
}

/// Whole definitions document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefinitionsDocument {
    /// Permission catalogs.
    pub permission_catalogs: Vec<CatalogDocument>,
    /// Role definitions.
    pub role_definitions: Vec<DefinitionDocument>,
    /// Registry routing.
    pub registry: RegistryDocument,
    /// Relations between collections.
    #[serde(default)]
    pub relations: Vec<RelationDefinition>,
    /// Named scopes of related collections.
    #[serde(default)]
    pub scopes: Vec<NamedScope>,
}

impl DefinitionsDocument {
    /// Parses a document from JSON text.
    pub fn from_json_str(source: &str) -> AppResult<Self> {
        serde_json::from_str(source).map_err(|error| {
            AppError::Validation(format!("invalid definitions document: {error}"))
        })
    }

    /// Validates the document and builds the runtime registry and relations.
    pub fn into_parts(self) -> AppResult<(DefinitionRegistry, RelationCatalog)> {
        let mut catalogs = HashMap::with_capacity(self.permission_catalogs.len());
        for catalog in self.permission_catalogs {
            let built = PermissionCatalog::new(catalog.name.clone(), catalog.permissions)?;
            if catalogs.insert(catalog.name.clone(), Arc::new(built)).is_some() {
                return Err(AppError::Validation(format!(
                    "permission catalog '{}' is declared twice",
                    catalog.name
                )));
            }
        }

        let mut definitions = HashMap::with_capacity(self.role_definitions.len());
        for definition in self.role_definitions {
            let catalog = catalogs
                .get(&definition.permission_catalog)
                .cloned()
                .ok_or_else(|| {
                    AppError::Validation(format!(
                        "role definition '{}' references unknown permission catalog '{}'",
                        definition.name, definition.permission_catalog
                    ))
                })?;

            let name = definition.name.clone();
            let built = definition
                .grants
                .into_iter()
                .fold(
                    RoleDefinition::builder(definition.name, catalog)
                        .roles(definition.roles)
                        .use_hierarchy(definition.use_hierarchy)
                        .delete_pivot_on_remove(definition.delete_pivot_on_remove),
                    |builder, grant| builder.grant(grant.role, grant.permissions),
                )
                .build()?;

            if definitions.insert(name.clone(), Arc::new(built)).is_some() {
                return Err(AppError::Validation(format!(
                    "role definition '{name}' is declared twice"
                )));
            }
        }

        let find = |name: &str| {
            definitions.get(name).cloned().ok_or_else(|| {
                AppError::Validation(format!("registry references unknown definition '{name}'"))
            })
        };

        let mut registry = DefinitionRegistry::new(find(self.registry.default.as_str())?);
        for (scope_key, definition) in &self.registry.scopes {
            registry = registry.with_scope(scope_key.clone(), find(definition.as_str())?);
        }

        let mut relations = RelationCatalog::new();
        for relation in self.relations {
            relations = relations.with_relation(relation)?;
        }
        for scope in self.scopes {
            relations = relations.with_scope(scope);
        }

        Ok((registry, relations))
    }
}
