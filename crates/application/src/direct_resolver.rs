use std::sync::Arc;

use async_trait::async_trait;
use rolegate_core::{AppError, AppResult, EntityRef};
use rolegate_domain::{EnumValue, IntoValues, PermissionSet, RoleDefinition, RoleSet};

use crate::access_service::AccessService;
use crate::relation_resolver::RelationResolver;
use crate::resolver::Resolver;

/// Resolver for roles and direct grants attached to one entity.
#[derive(Clone)]
pub struct DirectResolver {
    entity: EntityRef,
    definition: Arc<RoleDefinition>,
    access: AccessService,
}

impl DirectResolver {
    pub(crate) fn new(
        entity: EntityRef,
        definition: Arc<RoleDefinition>,
        access: AccessService,
    ) -> Self {
        Self {
            entity,
            definition,
            access,
        }
    }

    /// Returns the resolved entity.
    #[must_use]
    pub fn entity(&self) -> &EntityRef {
        &self.entity
    }

    /// Returns the direct permission grants only.
    pub async fn direct_permissions(&self) -> AppResult<PermissionSet> {
        let catalog = self.definition.catalog();
        self.access
            .store()
            .list_permission_grants(&self.entity)
            .await?
            .iter()
            .map(|record| catalog.decode_stored(record.permission.as_str()))
            .collect()
    }

    /// Grants permissions directly; fails with `InvalidArgument` on empty
    /// input or a permission missing from the catalog.
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

        self.access
            .store()
            .insert_permission_grants(&self.entity, &values)
            .await?;
        Ok(true)
    }

    /// Revokes direct grants; empty input revokes every grant.
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

        self.access
            .store()
            .delete_permission_grants(&self.entity, filter)
            .await?;
        Ok(true)
    }

    /// Revokes every direct grant.
    pub async fn revoke_all(&self) -> AppResult<bool> {
        self.revoke(()).await
    }

    /// Scopes resolution to the many-to-many relation with `related`.
    ///
    /// Without a relation name, it is guessed from the related collection.
    pub fn of(
        &self,
        related: EntityRef,
        relation_name: Option<&str>,
    ) -> AppResult<RelationResolver> {
        let relation = self.access.relations().resolve(
            self.entity.collection(),
            related.collection(),
            relation_name,
        )?;

        RelationResolver::new(
            self.entity.clone(),
            related,
            relation,
            self.access.registry(),
            self.access.relation_store().clone(),
            self.access.relation_catalog(),
        )
    }
}

#[async_trait]
impl Resolver for DirectResolver {
    fn definition(&self) -> &RoleDefinition {
        &self.definition
    }

    async fn roles(&self) -> AppResult<RoleSet> {
        self.access
            .store()
            .list_role_assignments(&self.entity)
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

        self.access
            .store()
            .insert_role_assignments(&self.entity, &roles)
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

        self.access
            .store()
            .delete_role_assignments(&self.entity, filter)
            .await?;
        Ok(true)
    }
}
