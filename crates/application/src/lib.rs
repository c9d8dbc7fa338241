//! Application services and ports.

#![forbid(unsafe_code)]

mod access_service;
mod assignment_ports;
mod direct_resolver;
mod relation_resolver;
mod resolver;

pub use access_service::AccessService;
pub use assignment_ports::{
    AssignmentStore, PermissionGrantRecord, PivotRemoval, RelationAssignmentStore,
    RelationPermissionGrantRecord, RelationRoleRecord, RelationScope, RoleAssignmentRecord,
};
pub use direct_resolver::DirectResolver;
pub use relation_resolver::RelationResolver;
pub use resolver::Resolver;
