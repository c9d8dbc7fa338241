use chrono::{DateTime, Utc};
use rolegate_core::EntityRef;
use rolegate_domain::{Conditions, PivotColumns, PivotTable};

/// Stored role assignment of one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleAssignmentRecord {
    /// Owning entity.
    pub entity: EntityRef,
    /// Role value in storage form.
    pub role: String,
    /// Assignment timestamp.
    pub created_at: DateTime<Utc>,
}

/// Stored direct permission grant of one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionGrantRecord {
    /// Owning entity.
    pub entity: EntityRef,
    /// Permission value in storage form.
    pub permission: String,
    /// Grant timestamp.
    pub created_at: DateTime<Utc>,
}

/// Association row carrying a role between two entities.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationRoleRecord {
    /// Role value in storage form.
    pub role: String,
    /// Extra pivot columns, role and key columns excluded.
    pub pivot: PivotColumns,
    /// Row creation timestamp, when the pivot table keeps one.
    pub created_at: Option<DateTime<Utc>>,
}

/// Direct permission grant scoped to an owner and related entity pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationPermissionGrantRecord {
    /// Permission value in storage form.
    pub permission: String,
    /// Grant timestamp.
    pub created_at: DateTime<Utc>,
}

/// Address of the association rows between an owner and a related entity.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationScope {
    /// Owning entity, such as a user.
    pub owner: EntityRef,
    /// Related entity, such as a merchant.
    pub related: EntityRef,
    /// Relation name on the owner collection.
    pub relation: String,
    /// Pivot table holding the rows.
    pub pivot: PivotTable,
    /// Filters applied to every read and write.
    pub conditions: Conditions,
}

/// What removing a relation role does to its association row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PivotRemoval {
    /// Delete the row.
    DeleteRow,
    /// Keep the row and null its role column.
    NullRole,
}
