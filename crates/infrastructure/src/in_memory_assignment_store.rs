use std::collections::HashMap;
use std::hash::Hash;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rolegate_application::{
    AssignmentStore, PermissionGrantRecord, PivotRemoval, RelationAssignmentStore,
    RelationPermissionGrantRecord, RelationRoleRecord, RelationScope, RoleAssignmentRecord,
};
use rolegate_core::{AppError, AppResult, EntityRef};
use rolegate_domain::{EnumValue, PivotColumns, is_identifier};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::postgres_assignment_store::DEFAULT_ROLE_COLUMN;

#[derive(Debug, Clone)]
struct StoredValue {
    value: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct StoredPivotRow {
    owner_key: String,
    related_key: String,
    role: Option<String>,
    columns: PivotColumns,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl StoredPivotRow {
    fn in_scope(&self, scope: &RelationScope, role_column: &str) -> bool {
        self.owner_key == scope.owner.key()
            && self.related_key == scope.related.key()
            && (scope.conditions.is_empty()
                || scope.conditions.matches(&self.row_view(scope, role_column)))
    }

    /// Columns as a SQL row of the pivot table would expose them.
    fn row_view(&self, scope: &RelationScope, role_column: &str) -> PivotColumns {
        let mut view = PivotColumns::new();
        view.insert(
            scope.pivot.foreign_pivot_key.clone(),
            stored_cell(self.owner_key.as_str()),
        );
        view.insert(
            scope.pivot.related_pivot_key.clone(),
            stored_cell(self.related_key.as_str()),
        );
        view.insert(
            role_column.to_owned(),
            self.role.as_deref().map_or(Value::Null, stored_cell),
        );
        if scope.pivot.timestamps {
            view.insert(
                "created_at".to_owned(),
                Value::String(self.created_at.to_rfc3339()),
            );
            view.insert(
                "updated_at".to_owned(),
                Value::String(self.updated_at.to_rfc3339()),
            );
        }
        view.extend(self.columns.clone());
        view
    }
}

fn stored_cell(raw: &str) -> Value {
    raw.parse::<i64>()
        .map_or_else(|_| Value::String(raw.to_owned()), Value::from)
}

/// Owner, related entity and relation name of a relation grant.
type RelationPair = (EntityRef, EntityRef, String);

fn relation_pair(scope: &RelationScope) -> RelationPair {
    (
        scope.owner.clone(),
        scope.related.clone(),
        scope.relation.clone(),
    )
}

/// In-memory assignment store for both entity and relation scopes.
#[derive(Debug)]
pub struct InMemoryAssignmentStore {
    role_column: String,
    roles: RwLock<HashMap<EntityRef, Vec<StoredValue>>>,
    permissions: RwLock<HashMap<EntityRef, Vec<StoredValue>>>,
    pivot_rows: RwLock<HashMap<String, Vec<StoredPivotRow>>>,
    relation_permissions: RwLock<HashMap<RelationPair, Vec<StoredValue>>>,
}

impl Default for InMemoryAssignmentStore {
    fn default() -> Self {
        Self {
            role_column: DEFAULT_ROLE_COLUMN.to_owned(),
            roles: RwLock::default(),
            permissions: RwLock::default(),
            pivot_rows: RwLock::default(),
            relation_permissions: RwLock::default(),
        }
    }
}

impl InMemoryAssignmentStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the pivot column name conditions see for relation roles.
    pub fn with_role_column(mut self, column: impl Into<String>) -> AppResult<Self> {
        let column = column.into();
        if !is_identifier(column.as_str()) {
            return Err(AppError::Validation(format!(
                "role column '{column}' must be alphanumeric or underscore"
            )));
        }

        self.role_column = column;
        Ok(self)
    }
}

fn in_filter(stored: &str, filter: Option<&[EnumValue]>) -> bool {
    filter.is_none_or(|values| values.iter().any(|value| value.to_storage() == stored))
}

fn insert_missing(entries: &mut Vec<StoredValue>, values: &[EnumValue]) -> usize {
    let now = Utc::now();
    let mut inserted = 0;
    for value in values {
        let value = value.to_storage();
        if entries.iter().any(|entry| entry.value == value) {
            continue;
        }

        entries.push(StoredValue {
            value,
            created_at: now,
        });
        inserted += 1;
    }

    inserted
}

fn remove_matching<K>(
    map: &mut HashMap<K, Vec<StoredValue>>,
    key: &K,
    filter: Option<&[EnumValue]>,
) -> u64
where
    K: Eq + Hash,
{
    let Some(entries) = map.get_mut(key) else {
        return 0;
    };

    let before = entries.len();
    entries.retain(|entry| !in_filter(entry.value.as_str(), filter));
    let removed = before - entries.len();
    if entries.is_empty() {
        map.remove(key);
    }

    removed as u64
}

#[async_trait]
impl AssignmentStore for InMemoryAssignmentStore {
    async fn list_role_assignments(
        &self,
        entity: &EntityRef,
    ) -> AppResult<Vec<RoleAssignmentRecord>> {
        let roles = self.roles.read().await;

        Ok(roles
            .get(entity)
            .map(|entries| {
                entries
                    .iter()
                    .map(|entry| RoleAssignmentRecord {
                        entity: entity.clone(),
                        role: entry.value.clone(),
                        created_at: entry.created_at,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert_role_assignments(
        &self,
        entity: &EntityRef,
        roles: &[EnumValue],
    ) -> AppResult<()> {
        let mut stored = self.roles.write().await;
        let inserted = insert_missing(stored.entry(entity.clone()).or_default(), roles);
        tracing::debug!(%entity, inserted, "assigned roles");
        Ok(())
    }

    async fn delete_role_assignments(
        &self,
        entity: &EntityRef,
        roles: Option<&[EnumValue]>,
    ) -> AppResult<u64> {
        let removed = remove_matching(&mut *self.roles.write().await, entity, roles);
        tracing::debug!(%entity, removed, "removed roles");
        Ok(removed)
    }

    async fn list_permission_grants(
        &self,
        entity: &EntityRef,
    ) -> AppResult<Vec<PermissionGrantRecord>> {
        let permissions = self.permissions.read().await;

        Ok(permissions
            .get(entity)
            .map(|entries| {
                entries
                    .iter()
                    .map(|entry| PermissionGrantRecord {
                        entity: entity.clone(),
                        permission: entry.value.clone(),
                        created_at: entry.created_at,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert_permission_grants(
        &self,
        entity: &EntityRef,
        permissions: &[EnumValue],
    ) -> AppResult<()> {
        let mut stored = self.permissions.write().await;
        let inserted = insert_missing(stored.entry(entity.clone()).or_default(), permissions);
        tracing::debug!(%entity, inserted, "granted permissions");
        Ok(())
    }

    async fn delete_permission_grants(
        &self,
        entity: &EntityRef,
        permissions: Option<&[EnumValue]>,
    ) -> AppResult<u64> {
        let removed = remove_matching(&mut *self.permissions.write().await, entity, permissions);
        tracing::debug!(%entity, removed, "revoked permissions");
        Ok(removed)
    }
}

#[async_trait]
impl RelationAssignmentStore for InMemoryAssignmentStore {
    async fn list_relation_roles(
        &self,
        scope: &RelationScope,
    ) -> AppResult<Vec<RelationRoleRecord>> {
        let pivot_rows = self.pivot_rows.read().await;
        let Some(rows) = pivot_rows.get(scope.pivot.table.as_str()) else {
            return Ok(Vec::new());
        };

        Ok(rows
            .iter()
            .filter(|row| row.in_scope(scope, self.role_column.as_str()))
            .filter_map(|row| {
                row.role.clone().map(|role| RelationRoleRecord {
                    role,
                    pivot: row.columns.clone(),
                    created_at: scope.pivot.timestamps.then_some(row.created_at),
                })
            })
            .collect())
    }

    async fn attach_relation_roles(
        &self,
        scope: &RelationScope,
        roles: &[EnumValue],
        pivot: &PivotColumns,
    ) -> AppResult<()> {
        let mut pivot_rows = self.pivot_rows.write().await;
        let rows = pivot_rows.entry(scope.pivot.table.clone()).or_default();
        let now = Utc::now();

        for role in roles {
            let role = role.to_storage();
            let mut existing = rows
                .iter_mut()
                .filter(|row| {
                    row.in_scope(scope, self.role_column.as_str())
                        && row.role.as_deref() == Some(role.as_str())
                })
                .peekable();

            if existing.peek().is_some() {
                if !pivot.is_empty() {
                    for row in existing {
                        row.columns.extend(pivot.clone());
                        row.updated_at = now;
                    }
                }
                continue;
            }

            rows.push(StoredPivotRow {
                owner_key: scope.owner.key().to_owned(),
                related_key: scope.related.key().to_owned(),
                role: Some(role),
                columns: pivot.clone(),
                created_at: now,
                updated_at: now,
            });
        }

        tracing::debug!(
            owner = %scope.owner,
            related = %scope.related,
            table = %scope.pivot.table,
            "attached relation roles"
        );
        Ok(())
    }

    async fn detach_relation_roles(
        &self,
        scope: &RelationScope,
        roles: Option<&[EnumValue]>,
        removal: PivotRemoval,
    ) -> AppResult<u64> {
        let mut pivot_rows = self.pivot_rows.write().await;
        let Some(rows) = pivot_rows.get_mut(scope.pivot.table.as_str()) else {
            return Ok(0);
        };

        let targeted = |row: &StoredPivotRow| {
            row.in_scope(scope, self.role_column.as_str())
                && row
                    .role
                    .as_deref()
                    .is_some_and(|role| in_filter(role, roles))
        };

        let affected = match removal {
            PivotRemoval::DeleteRow => {
                let before = rows.len();
                rows.retain(|row| !targeted(row));
                before - rows.len()
            }
            PivotRemoval::NullRole => {
                let mut affected = 0;
                let now = Utc::now();
                for row in rows.iter_mut().filter(|row| targeted(row)) {
                    row.role = None;
                    row.updated_at = now;
                    affected += 1;
                }
                affected
            }
        };

        tracing::debug!(
            owner = %scope.owner,
            related = %scope.related,
            table = %scope.pivot.table,
            affected,
            "detached relation roles"
        );
        Ok(affected as u64)
    }

    async fn list_relation_permission_grants(
        &self,
        scope: &RelationScope,
    ) -> AppResult<Vec<RelationPermissionGrantRecord>> {
        let grants = self.relation_permissions.read().await;

        Ok(grants
            .get(&relation_pair(scope))
            .map(|entries| {
                entries
                    .iter()
                    .map(|entry| RelationPermissionGrantRecord {
                        permission: entry.value.clone(),
                        created_at: entry.created_at,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert_relation_permission_grants(
        &self,
        scope: &RelationScope,
        permissions: &[EnumValue],
    ) -> AppResult<()> {
        let mut stored = self.relation_permissions.write().await;
        let inserted = insert_missing(stored.entry(relation_pair(scope)).or_default(), permissions);
        tracing::debug!(
            owner = %scope.owner,
            related = %scope.related,
            inserted,
            "granted relation permissions"
        );
        Ok(())
    }

    async fn delete_relation_permission_grants(
        &self,
        scope: &RelationScope,
        permissions: Option<&[EnumValue]>,
    ) -> AppResult<u64> {
        let removed = remove_matching(
            &mut *self.relation_permissions.write().await,
            &relation_pair(scope),
            permissions,
        );
        tracing::debug!(
            owner = %scope.owner,
            related = %scope.related,
            removed,
            "revoked relation permissions"
        );
        Ok(removed)
    }
}

#[cfg(test)]
mod tests;
