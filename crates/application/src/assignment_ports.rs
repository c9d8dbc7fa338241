mod records;
mod stores;

pub use records::{
    PermissionGrantRecord, PivotRemoval, RelationPermissionGrantRecord, RelationRoleRecord,
    RelationScope, RoleAssignmentRecord,
};
pub use stores::{AssignmentStore, RelationAssignmentStore};
