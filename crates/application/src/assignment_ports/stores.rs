use async_trait::async_trait;
use rolegate_core::{AppResult, EntityRef};
use rolegate_domain::{EnumValue, PivotColumns};

use super::records::{
    PermissionGrantRecord, PivotRemoval, RelationPermissionGrantRecord, RelationRoleRecord,
    RelationScope, RoleAssignmentRecord,
};

/// Storage port for entity-level role assignments and direct grants.
///
/// Every write runs atomically and leaves existing pairs untouched.
#[async_trait]
pub trait AssignmentStore: Send + Sync {
    /// Lists role assignments of an entity.
    async fn list_role_assignments(
        &self,
        entity: &EntityRef,
    ) -> AppResult<Vec<RoleAssignmentRecord>>;

    /// Inserts missing role assignments.
    async fn insert_role_assignments(
        &self,
        entity: &EntityRef,
        roles: &[EnumValue],
    ) -> AppResult<()>;

    /// Deletes the listed role assignments, or every one when `roles` is `None`.
    async fn delete_role_assignments(
        &self,
        entity: &EntityRef,
        roles: Option<&[EnumValue]>,
    ) -> AppResult<u64>;

    /// Lists direct permission grants of an entity.
    async fn list_permission_grants(
        &self,
        entity: &EntityRef,
    ) -> AppResult<Vec<PermissionGrantRecord>>;

    /// Inserts missing direct permission grants.
    async fn insert_permission_grants(
        &self,
        entity: &EntityRef,
        permissions: &[EnumValue],
    ) -> AppResult<()>;

    /// Deletes the listed grants, or every one when `permissions` is `None`.
    async fn delete_permission_grants(
        &self,
        entity: &EntityRef,
        permissions: Option<&[EnumValue]>,
    ) -> AppResult<u64>;
}

/// Storage port for roles carried on association rows.
#[async_trait]
pub trait RelationAssignmentStore: Send + Sync {
    /// Lists rows of the scope whose role column is not null.
    async fn list_relation_roles(
        &self,
        scope: &RelationScope,
    ) -> AppResult<Vec<RelationRoleRecord>>;

    /// Attaches roles to the scope in one transaction.
    ///
    /// A role already present keeps its row; its pivot columns are
    /// overwritten when `pivot` is not empty. Missing roles get a new row
    /// carrying `pivot`.
    async fn attach_relation_roles(
        &self,
        scope: &RelationScope,
        roles: &[EnumValue],
        pivot: &PivotColumns,
    ) -> AppResult<()>;

    /// Removes the listed roles, or every role when `roles` is `None`.
    async fn detach_relation_roles(
        &self,
        scope: &RelationScope,
        roles: Option<&[EnumValue]>,
        removal: PivotRemoval,
    ) -> AppResult<u64>;

    /// Lists direct grants of the owner and related pair.
    ///
    /// Grants are keyed by owner, related entity and relation name; pivot
    /// conditions do not apply to them.
    async fn list_relation_permission_grants(
        &self,
        scope: &RelationScope,
    ) -> AppResult<Vec<RelationPermissionGrantRecord>>;

    /// Inserts missing direct grants for the pair.
    async fn insert_relation_permission_grants(
        &self,
        scope: &RelationScope,
        permissions: &[EnumValue],
    ) -> AppResult<()>;

    /// Deletes the listed grants of the pair, or every one when
    /// `permissions` is `None`.
    async fn delete_relation_permission_grants(
        &self,
        scope: &RelationScope,
        permissions: Option<&[EnumValue]>,
    ) -> AppResult<u64>;
}
