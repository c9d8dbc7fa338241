use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, Postgres, QueryBuilder};
use uuid::Uuid;

use rolegate_application::{
    PivotRemoval, RelationAssignmentStore, RelationPermissionGrantRecord, RelationRoleRecord,
    RelationScope,
};
use rolegate_domain::{ComparisonOperator, Conditions, Connective, PivotColumns, Predicate};

use super::*;

const ALIAS: &str = "pivot";

#[derive(Debug, FromRow)]
struct RelationRoleRow {
    role: String,
    row_data: Value,
}

#[derive(Debug, FromRow)]
struct RelationGrantRow {
    permission: String,
    created_at: DateTime<Utc>,
}

fn quote(identifier: &str) -> AppResult<String> {
    if is_identifier(identifier) {
        Ok(format!("\"{identifier}\""))
    } else {
        Err(AppError::InvalidArgument(format!(
            "'{identifier}' is not a valid column name"
        )))
    }
}

/// Quoted identifiers of one pivot table.
struct PivotSql<'a> {
    scope: &'a RelationScope,
    table: String,
    foreign_key: String,
    related_key: String,
    role: String,
    reserved: [&'a str; 5],
}

impl<'a> PivotSql<'a> {
    fn new(scope: &'a RelationScope, role_column: &'a str) -> AppResult<Self> {
        Ok(Self {
            scope,
            table: quote(scope.pivot.table.as_str())?,
            foreign_key: quote(scope.pivot.foreign_pivot_key.as_str())?,
            related_key: quote(scope.pivot.related_pivot_key.as_str())?,
            role: quote(role_column)?,
            reserved: [
                scope.pivot.foreign_pivot_key.as_str(),
                scope.pivot.related_pivot_key.as_str(),
                role_column,
                "created_at",
                "updated_at",
            ],
        })
    }

    fn push_scope_filter(&self, builder: &mut QueryBuilder<'_, Postgres>) -> AppResult<()> {
        builder.push(format!(" WHERE {ALIAS}.{}::TEXT = ", self.foreign_key));
        builder.push_bind(self.scope.owner.key().to_owned());
        builder.push(format!(" AND {ALIAS}.{}::TEXT = ", self.related_key));
        builder.push_bind(self.scope.related.key().to_owned());
        builder.push(format!(" AND {ALIAS}.{} IS NOT NULL", self.role));

        if !self.scope.conditions.is_empty() {
            builder.push(" AND (");
            push_conditions(builder, &self.scope.conditions)?;
            builder.push(')');
        }

        Ok(())
    }

    fn push_role_filter(&self, builder: &mut QueryBuilder<'_, Postgres>, roles: &[EnumValue]) {
        if roles.is_empty() {
            builder.push(" AND FALSE");
            return;
        }

        builder.push(format!(" AND {ALIAS}.{}::TEXT IN (", self.role));
        let mut separated = builder.separated(", ");
        for role in roles {
            separated.push_bind(role.to_storage());
        }
        separated.push_unseparated(")");
    }

    fn pivot_columns(&self, pivot: &PivotColumns) -> AppResult<Vec<String>> {
        pivot
            .keys()
            .map(|column| {
                if self.reserved.iter().any(|reserved| *reserved == column) {
                    return Err(AppError::InvalidArgument(format!(
                        "pivot column '{column}' is managed by the store"
                    )));
                }
                quote(column)
            })
            .collect()
    }

    fn record(&self, row: RelationRoleRow) -> RelationRoleRecord {
        let mut columns = match row.row_data {
            Value::Object(map) => map,
            _ => PivotColumns::new(),
        };
        let created_at = columns
            .get("created_at")
            .and_then(Value::as_str)
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|value| value.with_timezone(&Utc));
        for column in self.reserved {
            columns.remove(column);
        }

        RelationRoleRecord {
            role: row.role,
            pivot: columns,
            created_at,
        }
    }
}

fn push_key_bind(builder: &mut QueryBuilder<'_, Postgres>, key: &str) {
    if let Ok(number) = key.parse::<i64>() {
        builder.push_bind(number);
    } else if let Ok(uuid) = Uuid::parse_str(key) {
        builder.push_bind(uuid);
    } else {
        builder.push_bind(key.to_owned());
    }
}

fn push_role_bind(builder: &mut QueryBuilder<'_, Postgres>, role: &EnumValue) {
    match role {
        EnumValue::Integer(value) => builder.push_bind(*value),
        EnumValue::Text(value) => builder.push_bind(value.clone()),
    };
}

fn push_json_bind(builder: &mut QueryBuilder<'_, Postgres>, value: &Value) -> AppResult<()> {
    match value {
        Value::Null => {
            builder.push("NULL");
        }
        Value::Bool(flag) => {
            builder.push_bind(*flag);
        }
        Value::Number(number) => {
            if let Some(integer) = number.as_i64() {
                builder.push_bind(integer);
            } else if let Some(float) = number.as_f64() {
                builder.push_bind(float);
            } else {
                return Err(AppError::InvalidArgument(format!(
                    "number '{number}' cannot be stored in a pivot column"
                )));
            }
        }
        Value::String(text) => {
            builder.push_bind(text.clone());
        }
        Value::Array(_) | Value::Object(_) => {
            builder.push_bind(value.clone());
        }
    }

    Ok(())
}

fn push_value_list(
    builder: &mut QueryBuilder<'_, Postgres>,
    column: &str,
    keyword: &str,
    values: &[Value],
    when_empty: &str,
) -> AppResult<()> {
    if values.is_empty() {
        builder.push(when_empty);
        return Ok(());
    }

    builder.push(format!("{column} {keyword} ("));
    for (index, value) in values.iter().enumerate() {
        if index > 0 {
            builder.push(", ");
        }
        push_json_bind(builder, value)?;
    }
    builder.push(')');

    Ok(())
}

fn push_conditions(
    builder: &mut QueryBuilder<'_, Postgres>,
    conditions: &Conditions,
) -> AppResult<()> {
    for (index, condition) in conditions.iter().enumerate() {
        if index > 0 {
            match condition.connective {
                Connective::And => builder.push(" AND "),
                Connective::Or => builder.push(" OR "),
            };
        }

        let column = format!("{ALIAS}.{}", quote(condition.predicate.column())?);
        match &condition.predicate {
            Predicate::Compare {
                operator: ComparisonOperator::Like,
                value,
                ..
            } => {
                builder.push(format!("{column}::TEXT LIKE "));
                push_json_bind(builder, value)?;
            }
            Predicate::Compare {
                operator, value, ..
            } => {
                builder.push(format!("{column} {} ", operator.as_sql()));
                push_json_bind(builder, value)?;
            }
            Predicate::In { values, .. } => {
                push_value_list(builder, &column, "IN", values, "FALSE")?;
            }
            Predicate::NotIn { values, .. } => {
                push_value_list(builder, &column, "NOT IN", values, "TRUE")?;
            }
            Predicate::Null { .. } => {
                builder.push(format!("{column} IS NULL"));
            }
            Predicate::NotNull { .. } => {
                builder.push(format!("{column} IS NOT NULL"));
            }
        }
    }

    Ok(())
}

#[async_trait]
impl RelationAssignmentStore for PostgresAssignmentStore {
    async fn list_relation_roles(
        &self,
        scope: &RelationScope,
    ) -> AppResult<Vec<RelationRoleRecord>> {
        let sql = PivotSql::new(scope, self.role_column.as_str())?;

        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(format!(
            "SELECT {ALIAS}.{}::TEXT AS role, to_jsonb({ALIAS}) AS row_data FROM {} AS {ALIAS}",
            sql.role, sql.table
        ));
        sql.push_scope_filter(&mut builder)?;
        builder.push(" ORDER BY 1");

        let rows = builder
            .build_query_as::<RelationRoleRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to list relation roles: {error}"))
            })?;

        Ok(rows.into_iter().map(|row| sql.record(row)).collect())
    }

    async fn attach_relation_roles(
        &self,
        scope: &RelationScope,
        roles: &[EnumValue],
        pivot: &PivotColumns,
    ) -> AppResult<()> {
        let sql = PivotSql::new(scope, self.role_column.as_str())?;
        let pivot_columns = sql.pivot_columns(pivot)?;

        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        for role in roles {
            let mut existing: QueryBuilder<'_, Postgres> =
                QueryBuilder::new(format!("SELECT COUNT(*) FROM {} AS {ALIAS}", sql.table));
            sql.push_scope_filter(&mut existing)?;
            sql.push_role_filter(&mut existing, std::slice::from_ref(role));

            let existing = existing
                .build_query_scalar::<i64>()
                .fetch_one(&mut *transaction)
                .await
                .map_err(|error| {
                    AppError::Internal(format!("failed to look up relation role: {error}"))
                })?;

            if existing > 0 {
                if pivot.is_empty() {
                    continue;
                }

                let mut update: QueryBuilder<'_, Postgres> =
                    QueryBuilder::new(format!("UPDATE {} AS {ALIAS} SET ", sql.table));
                for (index, (column, value)) in pivot_columns.iter().zip(pivot.values()).enumerate()
                {
                    if index > 0 {
                        update.push(", ");
                    }
                    update.push(format!("{column} = "));
                    push_json_bind(&mut update, value)?;
                }
                if scope.pivot.timestamps {
                    update.push(", \"updated_at\" = now()");
                }
                sql.push_scope_filter(&mut update)?;
                sql.push_role_filter(&mut update, std::slice::from_ref(role));

                update
                    .build()
                    .execute(&mut *transaction)
                    .await
                    .map_err(|error| {
                        AppError::Internal(format!("failed to update relation role: {error}"))
                    })?;
                continue;
            }

            let mut insert: QueryBuilder<'_, Postgres> = QueryBuilder::new(format!(
                "INSERT INTO {} ({}, {}, {}",
                sql.table, sql.foreign_key, sql.related_key, sql.role
            ));
            for column in &pivot_columns {
                insert.push(format!(", {column}"));
            }
            if scope.pivot.timestamps {
                insert.push(", \"created_at\", \"updated_at\"");
            }
            insert.push(") VALUES (");
            push_key_bind(&mut insert, scope.owner.key());
            insert.push(", ");
            push_key_bind(&mut insert, scope.related.key());
            insert.push(", ");
            push_role_bind(&mut insert, role);
            for value in pivot.values() {
                insert.push(", ");
                push_json_bind(&mut insert, value)?;
            }
            if scope.pivot.timestamps {
                insert.push(", now(), now()");
            }
            insert.push(')');

            insert
                .build()
                .execute(&mut *transaction)
                .await
                .map_err(|error| {
                    AppError::Internal(format!("failed to attach relation role: {error}"))
                })?;
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        tracing::debug!(
            owner = %scope.owner,
            related = %scope.related,
            table = %scope.pivot.table,
            count = roles.len(),
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
        let sql = PivotSql::new(scope, self.role_column.as_str())?;

        let mut builder: QueryBuilder<'_, Postgres> = match removal {
            PivotRemoval::DeleteRow => {
                QueryBuilder::new(format!("DELETE FROM {} AS {ALIAS}", sql.table))
            }
            PivotRemoval::NullRole => {
                let mut builder = QueryBuilder::new(format!(
                    "UPDATE {} AS {ALIAS} SET {} = NULL",
                    sql.table, sql.role
                ));
                if scope.pivot.timestamps {
                    builder.push(", \"updated_at\" = now()");
                }
                builder
            }
        };
        sql.push_scope_filter(&mut builder)?;
        if let Some(roles) = roles {
            sql.push_role_filter(&mut builder, roles);
        }

        let rows_affected = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to detach relation roles: {error}"))
            })?
            .rows_affected();

        tracing::debug!(
            owner = %scope.owner,
            related = %scope.related,
            table = %scope.pivot.table,
            rows_affected,
            "detached relation roles"
        );
        Ok(rows_affected)
    }

    async fn list_relation_permission_grants(
        &self,
        scope: &RelationScope,
    ) -> AppResult<Vec<RelationPermissionGrantRecord>> {
        let rows = sqlx::query_as::<_, RelationGrantRow>(
            r#"
            SELECT permission, created_at
            FROM relation_permissions
            WHERE owner_type = $1
                AND owner_id = $2
                AND related_type = $3
                AND related_id = $4
                AND relation = $5
            ORDER BY created_at, permission
            "#,
        )
        .bind(scope.owner.collection())
        .bind(scope.owner.key())
        .bind(scope.related.collection())
        .bind(scope.related.key())
        .bind(scope.relation.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list relation permission grants: {error}"))
        })?;

        Ok(rows
            .into_iter()
            .map(|row| RelationPermissionGrantRecord {
                permission: row.permission,
                created_at: row.created_at,
            })
            .collect())
    }

    async fn insert_relation_permission_grants(
        &self,
        scope: &RelationScope,
        permissions: &[EnumValue],
    ) -> AppResult<()> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        for permission in storage_values(permissions) {
            sqlx::query(
                r#"
                INSERT INTO relation_permissions
                    (owner_type, owner_id, related_type, related_id, relation, permission)
                VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT (owner_type, owner_id, related_type, related_id, relation, permission)
                DO NOTHING
                "#,
            )
            .bind(scope.owner.collection())
            .bind(scope.owner.key())
            .bind(scope.related.collection())
            .bind(scope.related.key())
            .bind(scope.relation.as_str())
            .bind(permission)
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to give relation permission: {error}"))
            })?;
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        tracing::debug!(
            owner = %scope.owner,
            related = %scope.related,
            count = permissions.len(),
            "granted relation permissions"
        );
        Ok(())
    }

    async fn delete_relation_permission_grants(
        &self,
        scope: &RelationScope,
        permissions: Option<&[EnumValue]>,
    ) -> AppResult<u64> {
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM relation_permissions
            WHERE owner_type = $1
                AND owner_id = $2
                AND related_type = $3
                AND related_id = $4
                AND relation = $5
                AND ($6::TEXT[] IS NULL OR permission = ANY($6))
            "#,
        )
        .bind(scope.owner.collection())
        .bind(scope.owner.key())
        .bind(scope.related.collection())
        .bind(scope.related.key())
        .bind(scope.relation.as_str())
        .bind(permissions.map(storage_values))
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to revoke relation permissions: {error}"))
        })?
        .rows_affected();

        tracing::debug!(
            owner = %scope.owner,
            related = %scope.related,
            rows_affected,
            "revoked relation permissions"
        );
        Ok(rows_affected)
    }
}
