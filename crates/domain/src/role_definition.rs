//! Role definitions and hierarchy resolution.
//!
//! A definition is an ordered list of roles plus an ordered mapping from
//! roles to permission lists. Declaration order doubles as rank: the first
//! role is the highest. When the hierarchy is enabled, a role's effective
//! permissions are its own grants plus the grants of every role declared
//! after it.

use std::collections::HashMap;
use std::sync::Arc;

use rolegate_core::{AppError, AppResult};

use crate::inflection::friendly_key_name;
use crate::permission::{PermissionCatalog, PermissionEnum};
use crate::role::{Role, RoleEnum, RoleSpec};
use crate::sets::{PermissionSet, RoleSet};
use crate::value::{EnumValue, IntoValues};

/// Validated role catalog with its permission mapping.
#[derive(Debug, Clone)]
pub struct RoleDefinition {
    name: String,
    roles: Vec<RoleSpec>,
    rank: HashMap<EnumValue, usize>,
    // grants[i] belongs to roles[i]; roles past the end have no mapping entry
    grants: Vec<Vec<EnumValue>>,
    catalog: Arc<PermissionCatalog>,
    uses_hierarchy: bool,
    delete_pivot_on_remove: bool,
}

impl RoleDefinition {
    /// Starts a definition drawing permissions from the catalog.
    #[must_use]
    pub fn builder(
        name: impl Into<String>,
        catalog: Arc<PermissionCatalog>,
    ) -> RoleDefinitionBuilder {
        RoleDefinitionBuilder {
            name: name.into(),
            catalog,
            roles: Vec::new(),
            grants: Vec::new(),
            uses_hierarchy: false,
            delete_pivot_on_remove: false,
        }
    }

    /// Builds a definition from compile-time role and permission enums.
    pub fn from_enum<R: RoleEnum>() -> AppResult<Self> {
        let catalog = PermissionCatalog::from_enum::<R::Permission>()?;
        let mut builder = Self::builder(R::DEFINITION, Arc::new(catalog))
            .use_hierarchy(R::USES_HIERARCHY)
            .delete_pivot_on_remove(R::DELETE_PIVOT_ON_REMOVE);

        for role in R::all() {
            let spec = RoleSpec::new(role.value(), role.key());
            builder = builder.role(match role.description() {
                Some(description) => spec.described(description),
                None => spec,
            });
        }

        for (role, permissions) in R::grants() {
            let values: Vec<EnumValue> = permissions
                .iter()
                .map(PermissionEnum::value)
                .collect();
            builder = builder.grant(role.value(), values);
        }

        builder.build()
    }

    /// Returns the definition name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the permission catalog roles draw from.
    #[must_use]
    pub fn catalog(&self) -> &PermissionCatalog {
        &self.catalog
    }

    /// Returns whether higher roles inherit lower roles' grants.
    #[must_use]
    pub fn uses_hierarchy(&self) -> bool {
        self.uses_hierarchy
    }

    /// Returns whether removing a relation role deletes the association row.
    #[must_use]
    pub fn delete_pivot_on_remove(&self) -> bool {
        self.delete_pivot_on_remove
    }

    /// Returns whether the value is a declared role.
    #[must_use]
    pub fn contains(&self, value: &EnumValue) -> bool {
        self.rank.contains_key(value)
    }

    /// Returns role values in declaration order.
    #[must_use]
    pub fn roles_in_hierarchy(&self) -> Vec<EnumValue> {
        self.roles.iter().map(|spec| spec.value.clone()).collect()
    }

    /// Returns the role declared under a symbolic key.
    pub fn by_key(&self, key: &str) -> Option<AppResult<Role>> {
        self.roles
            .iter()
            .position(|spec| spec.key == key)
            .map(|index| self.materialize(index))
    }

    /// Computes the effective permissions of the given roles.
    ///
    /// Fails with [`AppError::UnknownRole`] for values outside the role
    /// declaration. Declared roles without a mapping entry contribute
    /// nothing.
    pub fn get_permissions(&self, roles: impl IntoValues) -> AppResult<PermissionSet> {
        let mut permissions = PermissionSet::new();
        for value in roles.into_values() {
            let index = self.rank_of(&value)?;
            permissions = permissions.union(&self.permissions_at(index));
        }

        Ok(permissions)
    }

    /// Returns the roles ranked below `role`; empty without hierarchy.
    pub fn lower_roles(&self, role: &EnumValue) -> AppResult<Vec<Role>> {
        let index = self.rank_of(role)?;
        if !self.uses_hierarchy {
            return Ok(Vec::new());
        }

        (index + 1..self.roles.len())
            .map(|lower| self.materialize(lower))
            .collect()
    }

    /// Returns the roles ranked above `role`; empty without hierarchy.
    pub fn higher_roles(&self, role: &EnumValue) -> AppResult<Vec<Role>> {
        let index = self.rank_of(role)?;
        if !self.uses_hierarchy {
            return Ok(Vec::new());
        }

        (0..index).map(|higher| self.materialize(higher)).collect()
    }

    /// Materializes one role.
    pub fn role(&self, value: &EnumValue) -> AppResult<Role> {
        let index = self.rank_of(value)?;
        self.materialize(index)
    }

    /// Materializes roles for the given values.
    ///
    /// Unlike [`RoleDefinition::role`], an undeclared value is reported as a
    /// caller mistake.
    pub fn instances_from_values(&self, values: impl IntoValues) -> AppResult<Vec<Role>> {
        values
            .into_values()
            .into_iter()
            .map(|value| match self.rank.get(&value) {
                Some(index) => self.materialize(*index),
                None => Err(self.invalid_role_argument(&value)),
            })
            .collect()
    }

    /// Decodes a role value read back from storage.
    pub fn decode_stored(&self, raw: &str) -> AppResult<Role> {
        let index = self
            .roles
            .iter()
            .position(|spec| spec.value.to_storage() == raw)
            .ok_or_else(|| AppError::UnknownRole {
                role: raw.to_owned(),
                definition: self.name.clone(),
            })?;

        self.materialize(index)
    }

    /// Returns every declared role.
    pub fn all(&self) -> AppResult<RoleSet> {
        (0..self.roles.len())
            .map(|index| self.materialize(index))
            .collect()
    }

    /// Returns `(value, title)` pairs in declaration order.
    #[must_use]
    pub fn as_select(&self) -> Vec<(EnumValue, String)> {
        self.roles
            .iter()
            .map(|spec| (spec.value.clone(), friendly_key_name(spec.key.as_str())))
            .collect()
    }

    /// Validates role values passed to an assignment.
    pub fn validate_assignable(&self, values: &[EnumValue]) -> AppResult<()> {
        match values.iter().find(|value| !self.contains(value)) {
            Some(value) => Err(self.invalid_role_argument(value)),
            None => Ok(()),
        }
    }

    /// Validates permission values passed to a direct grant.
    pub fn validate_grantable(&self, values: &[EnumValue]) -> AppResult<()> {
        match values.iter().find(|value| !self.catalog.contains(value)) {
            Some(value) => Err(AppError::InvalidArgument(format!(
                "the permission \"{value}\" does not exist on the \"{}\" catalog",
                self.catalog.name()
            ))),
            None => Ok(()),
        }
    }

    fn invalid_role_argument(&self, value: &EnumValue) -> AppError {
        AppError::InvalidArgument(format!(
            "the role \"{value}\" does not exist on the \"{}\" definition",
            self.name
        ))
    }

    fn rank_of(&self, value: &EnumValue) -> AppResult<usize> {
        self.rank
            .get(value)
            .copied()
            .ok_or_else(|| AppError::UnknownRole {
                role: value.to_string(),
                definition: self.name.clone(),
            })
    }

    fn permissions_at(&self, index: usize) -> PermissionSet {
        if index >= self.grants.len() {
            return PermissionSet::new();
        }

        let ranks = if self.uses_hierarchy {
            index..self.grants.len()
        } else {
            index..index + 1
        };

        self.grants[ranks]
            .iter()
            .flatten()
            .filter_map(|value| self.catalog.get(value).cloned())
            .collect()
    }

    fn materialize(&self, index: usize) -> AppResult<Role> {
        let spec = self.roles.get(index).ok_or_else(|| {
            AppError::Internal(format!(
                "role rank {index} is outside the `{}` definition",
                self.name
            ))
        })?;

        Ok(Role::from_spec(spec, self.permissions_at(index)))
    }
}

/// Builder validating a [`RoleDefinition`].
#[derive(Debug)]
pub struct RoleDefinitionBuilder {
    name: String,
    catalog: Arc<PermissionCatalog>,
    roles: Vec<RoleSpec>,
    grants: Vec<(EnumValue, Vec<EnumValue>)>,
    uses_hierarchy: bool,
    delete_pivot_on_remove: bool,
}

impl RoleDefinitionBuilder {
    /// Declares the next role; earlier roles rank higher.
    #[must_use]
    pub fn role(mut self, spec: RoleSpec) -> Self {
        self.roles.push(spec);
        self
    }

    /// Declares several roles in order.
    #[must_use]
    pub fn roles(mut self, specs: impl IntoIterator<Item = RoleSpec>) -> Self {
        self.roles.extend(specs);
        self
    }

    /// Appends the next mapping entry.
    #[must_use]
    pub fn grant(mut self, role: impl Into<EnumValue>, permissions: impl IntoValues) -> Self {
        self.grants.push((role.into(), permissions.into_values()));
        self
    }

    /// Enables or disables hierarchy inheritance.
    #[must_use]
    pub fn use_hierarchy(mut self, enabled: bool) -> Self {
        self.uses_hierarchy = enabled;
        self
    }

    /// Chooses whether relation role removal deletes association rows.
    #[must_use]
    pub fn delete_pivot_on_remove(mut self, enabled: bool) -> Self {
        self.delete_pivot_on_remove = enabled;
        self
    }

    /// Validates and builds the definition.
    ///
    /// The mapping may stop before the last role but must otherwise follow
    /// declaration order exactly.
    pub fn build(self) -> AppResult<RoleDefinition> {
        if self.roles.is_empty() {
            return Err(AppError::Validation(format!(
                "role definition '{}' must declare at least one role",
                self.name
            )));
        }

        let mut rank = HashMap::with_capacity(self.roles.len());
        let mut keys = HashMap::with_capacity(self.roles.len());
        for (index, spec) in self.roles.iter().enumerate() {
            if spec.key.trim().is_empty() || spec.value.is_blank() {
                return Err(AppError::Validation(format!(
                    "role #{index} of definition '{}' must have a value and a key",
                    self.name
                )));
            }
            if rank.insert(spec.value.clone(), index).is_some() {
                return Err(AppError::Validation(format!(
                    "role value '{}' is declared twice in definition '{}'",
                    spec.value, self.name
                )));
            }
            if keys.insert(spec.key.as_str(), index).is_some() {
                return Err(AppError::Validation(format!(
                    "role key '{}' is declared twice in definition '{}'",
                    spec.key, self.name
                )));
            }
        }

        let mut grants = Vec::with_capacity(self.grants.len());
        for (position, (role, permissions)) in self.grants.into_iter().enumerate() {
            let in_order = self
                .roles
                .get(position)
                .is_some_and(|spec| spec.value == role);
            if !in_order {
                return Err(AppError::InvalidRoleHierarchy {
                    role: role.to_string(),
                    definition: self.name,
                });
            }

            if let Some(unknown) = permissions
                .iter()
                .find(|permission| !self.catalog.contains(permission))
            {
                return Err(AppError::Validation(format!(
                    "role '{role}' of definition '{}' grants permission '{unknown}' missing from catalog '{}'",
                    self.name,
                    self.catalog.name()
                )));
            }

            grants.push(permissions);
        }

        Ok(RoleDefinition {
            name: self.name,
            roles: self.roles,
            rank,
            grants,
            catalog: self.catalog,
            uses_hierarchy: self.uses_hierarchy,
            delete_pivot_on_remove: self.delete_pivot_on_remove,
        })
    }
}

#[cfg(test)]
mod tests;
