use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use rolegate_application::{AssignmentStore, PermissionGrantRecord, RoleAssignmentRecord};
use rolegate_core::{AppError, AppResult, EntityRef};
use rolegate_domain::{EnumValue, is_identifier};

mod relations;

/// Default name of the pivot column holding the role value.
pub const DEFAULT_ROLE_COLUMN: &str = "role";

/// PostgreSQL-backed assignment store.
///
/// Entity-level assignments live in `model_roles` and `model_permissions`.
/// Relation roles live in the application's own pivot tables.
#[derive(Clone)]
pub struct PostgresAssignmentStore {
    pool: PgPool,
    role_column: String,
}

impl PostgresAssignmentStore {
    /// Creates a store with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            role_column: DEFAULT_ROLE_COLUMN.to_owned(),
        }
    }

    /// Overrides the pivot column holding relation roles.
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

#[derive(Debug, FromRow)]
struct ModelValueRow {
    model_type: String,
    model_id: String,
    value: String,
    created_at: DateTime<Utc>,
}

impl ModelValueRow {
    fn entity(&self) -> AppResult<EntityRef> {
        EntityRef::new(self.model_type.as_str(), self.model_id.as_str())
    }
}

fn storage_values(values: &[EnumValue]) -> Vec<String> {
    values.iter().map(EnumValue::to_storage).collect()
}

#[async_trait]
impl AssignmentStore for PostgresAssignmentStore {
    async fn list_role_assignments(
        &self,
        entity: &EntityRef,
    ) -> AppResult<Vec<RoleAssignmentRecord>> {
        let rows = sqlx::query_as::<_, ModelValueRow>(
            r#"
            SELECT model_type, model_id, role AS value, created_at
            FROM model_roles
            WHERE model_type = $1 AND model_id = $2
            ORDER BY created_at, role
            "#,
        )
        .bind(entity.collection())
        .bind(entity.key())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list role assignments: {error}")))?;

        rows.into_iter()
            .map(|row| {
                Ok(RoleAssignmentRecord {
                    entity: row.entity()?,
                    role: row.value,
                    created_at: row.created_at,
                })
            })
            .collect()
    }

    async fn insert_role_assignments(
        &self,
        entity: &EntityRef,
        roles: &[EnumValue],
    ) -> AppResult<()> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        for role in storage_values(roles) {
            sqlx::query(
                r#"
                INSERT INTO model_roles (model_type, model_id, role)
                VALUES ($1, $2, $3)
                ON CONFLICT (model_type, model_id, role) DO NOTHING
                "#,
            )
            .bind(entity.collection())
            .bind(entity.key())
            .bind(role)
            .execute(&mut *transaction)
            .await
            .map_err(|error| AppError::Internal(format!("failed to assign role: {error}")))?;
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        tracing::debug!(%entity, count = roles.len(), "assigned roles");
        Ok(())
    }

    async fn delete_role_assignments(
        &self,
        entity: &EntityRef,
        roles: Option<&[EnumValue]>,
    ) -> AppResult<u64> {
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM model_roles
            WHERE model_type = $1
                AND model_id = $2
                AND ($3::TEXT[] IS NULL OR role = ANY($3))
            "#,
        )
        .bind(entity.collection())
        .bind(entity.key())
        .bind(roles.map(storage_values))
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to remove roles: {error}")))?
        .rows_affected();

        tracing::debug!(%entity, rows_affected, "removed roles");
        Ok(rows_affected)
    }

    async fn list_permission_grants(
        &self,
        entity: &EntityRef,
    ) -> AppResult<Vec<PermissionGrantRecord>> {
        let rows = sqlx::query_as::<_, ModelValueRow>(
            r#"
            SELECT model_type, model_id, permission AS value, created_at
            FROM model_permissions
            WHERE model_type = $1 AND model_id = $2
            ORDER BY created_at, permission
            "#,
        )
        .bind(entity.collection())
        .bind(entity.key())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list permission grants: {error}"))
        })?;

        rows.into_iter()
            .map(|row| {
                Ok(PermissionGrantRecord {
                    entity: row.entity()?,
                    permission: row.value,
                    created_at: row.created_at,
                })
            })
            .collect()
    }

    async fn insert_permission_grants(
        &self,
        entity: &EntityRef,
        permissions: &[EnumValue],
    ) -> AppResult<()> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        for permission in storage_values(permissions) {
            sqlx::query(
                r#"
                INSERT INTO model_permissions (model_type, model_id, permission)
                VALUES ($1, $2, $3)
                ON CONFLICT (model_type, model_id, permission) DO NOTHING
                "#,
            )
            .bind(entity.collection())
            .bind(entity.key())
            .bind(permission)
            .execute(&mut *transaction)
            .await
            .map_err(|error| AppError::Internal(format!("failed to give permission: {error}")))?;
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        tracing::debug!(%entity, count = permissions.len(), "granted permissions");
        Ok(())
    }

    async fn delete_permission_grants(
        &self,
        entity: &EntityRef,
        permissions: Option<&[EnumValue]>,
    ) -> AppResult<u64> {
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM model_permissions
            WHERE model_type = $1
                AND model_id = $2
                AND ($3::TEXT[] IS NULL OR permission = ANY($3))
            "#,
        )
        .bind(entity.collection())
        .bind(entity.key())
        .bind(permissions.map(storage_values))
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to revoke permissions: {error}")))?
        .rows_affected();

        tracing::debug!(%entity, rows_affected, "revoked permissions");
        Ok(rows_affected)
    }
}
