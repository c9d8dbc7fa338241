use std::sync::Arc;

use async_trait::async_trait;
use rolegate_core::{AppError, AppResult, EntityRef};
use rolegate_domain::{
    Condition, Conditions, DefinitionRegistry, EnumValue, IntoValues, PermissionSet,
    PivotColumns, RelationCatalog, RelationDefinition, RoleDefinition, RoleSet,
};
use serde_json::Value;

use crate::assignment_ports::{PivotRemoval, RelationAssignmentStore, RelationScope};
use crate::resolver::Resolver;

/// Resolver for roles carried on the association rows between two entities.
///
/// The definition is picked by pivot table name. Conditions and staged pivot
/// columns accumulate for the lifetime of the resolver.
#[derive(Clone)]
pub struct RelationResolver {
    scope: RelationScope,
    definition: Arc<RoleDefinition>,
    store: Arc<dyn RelationAssignmentStore>,
    relations: Arc<RelationCatalog>,
    pivot_data: PivotColumns,
}

impl RelationResolver {
    pub(crate) fn new(
        owner: EntityRef,
        related: EntityRef,
        relation: &RelationDefinition,
        registry: &DefinitionRegistry,
        store: Arc<dyn RelationAssignmentStore>,
        relations: Arc<RelationCatalog>,
    ) -> AppResult<Self> {
        let pivot = relation.pivot().cloned().ok_or_else(|| {
            AppError::InvalidRelationName(format!(
                "The `{}` relation is not a BelongsToMany relation.",
                relation.name
            ))
        })?;

        Ok(Self {
            definition: registry.lookup(pivot.table.as_str()),
            scope: RelationScope {
                owner,
                related,
                relation: relation.name.clone(),
                pivot,
                conditions: Conditions::new(),
            },
            store,
            relations,
            pivot_data: PivotColumns::new(),
        })
    }

    /// Returns the address of the association rows.
    #[must_use]
    pub fn scope(&self) -> &RelationScope {
        &self.scope
    }

    /// Returns the pivot columns staged for the next assignment.
    #[must_use]
    pub fn pivot_data(&self) -> &PivotColumns {
        &self.pivot_data
    }

    /// Stages extra pivot columns; later keys win over earlier ones.
    #[must_use]
    pub fn with_pivot(mut self, columns: PivotColumns) -> Self {
        self.pivot_data.extend(columns);
        self
    }

    /// Appends a filter applied to every association read and write.
    #[must_use]
    pub fn append_condition(mut self, condition: Condition) -> Self {
        self.scope.conditions.push(condition);
        self
    }

    /// Filters on `column = value`.
    #[must_use]
    pub fn where_pivot(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.append_condition(Condition::equals(column, value))
    }

    /// Chains a condition by method name.
    ///
    /// Accepts `where*`/`orWhere*` builders and named scopes of the related
    /// collection.
    pub fn call(mut self, method: &str, arguments: &[Value]) -> AppResult<Self> {
        if let Some(condition) = Condition::from_call(method, arguments) {
            self.scope.conditions.push(condition?);
            return Ok(self);
        }

        let related = self.scope.related.collection();
        match self.relations.scope(related, method) {
            Some(conditions) => {
                self.scope.conditions.extend(conditions);
                Ok(self)
            }
            None => Err(AppError::InvalidArgument(format!(
                "Call to undefined method {related}::{method}()"
            ))),
        }
    }

    /// Returns the permissions granted directly to the pair.
    pub async fn direct_permissions(&self) -> AppResult<PermissionSet> {
        let catalog = self.definition.catalog();
        self.store
            .list_relation_permission_grants(&self.scope)
            .await?
            .iter()
            .map(|record| catalog.decode_stored(record.permission.as_str()))
            .collect()
    }

    /// Grants permissions directly to the pair.
    pub async fn give<V>(&self, permissions: V) -> AppResult<bool>
    where
        V: IntoValues,
    {
        let values = permissions.into_values();
        if values.is_empty() {
            return Err(AppError::InvalidArgument(
                "at least one permission must be given".to_owned(),
            ));
        }
        self.definition.validate_grantable(&values)?;

        self.store
            .insert_relation_permission_grants(&self.scope, &values)
            .await?;
        Ok(true)
    }

    /// Revokes direct grants of the pair; empty input revokes every grant.
    pub async fn revoke<V>(&self, permissions: V) -> AppResult<bool>
    where
        V: IntoValues,
    {
        let values = permissions.into_values();
        let filter = if values.is_empty() {
            None
        } else {
            self.definition.validate_grantable(&values)?;
            Some(values.as_slice())
        };

        self.store
            .delete_relation_permission_grants(&self.scope, filter)
            .await?;
        Ok(true)
    }

    /// Revokes every direct grant of the pair.
    pub async fn revoke_all(&self) -> AppResult<bool> {
        self.revoke(()).await
    }
}

#[async_trait]
impl Resolver for RelationResolver {
    fn definition(&self) -> &RoleDefinition {
        &self.definition
    }

    async fn roles(&self) -> AppResult<RoleSet> {
        self.store
            .list_relation_roles(&self.scope)
            .await?
            .iter()
            .map(|record| self.definition.decode_stored(record.role.as_str()))
            .collect()
    }

    async fn permissions(&self) -> AppResult<PermissionSet> {
        let roles = self.roles().await?;
        let from_roles = self.definition.get_permissions(&roles)?;
        let direct = self.direct_permissions().await?;

        Ok(from_roles.union(&direct))
    }

    async fn assign_values(&self, roles: Vec<EnumValue>) -> AppResult<bool> {
        if roles.is_empty() {
            return Err(AppError::InvalidArgument(
                "at least one role must be assigned".to_owned(),
            ));
        }
        self.definition.validate_assignable(&roles)?;

        self.store
            .attach_relation_roles(&self.scope, &roles, &self.pivot_data)
            .await?;
        Ok(true)
    }

    async fn remove_role_values(&self, roles: Vec<EnumValue>) -> AppResult<bool> {
        let filter = if roles.is_empty() {
            None
        } else {
            self.definition.validate_assignable(&roles)?;
            Some(roles.as_slice())
        };
        let removal = if self.definition.delete_pivot_on_remove() {
            PivotRemoval::DeleteRow
        } else {
            PivotRemoval::NullRole
        };

        self.store
            .detach_relation_roles(&self.scope, filter, removal)
            .await?;
        Ok(true)
    }
}
