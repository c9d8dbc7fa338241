use rolegate_core::{AppResult, EntityRef};
use rolegate_domain::{EnumValue, PivotColumns};
use serde::Deserialize;
use serde_json::Value;

/// Entity reference as sent by clients.
#[derive(Debug, Clone, Deserialize)]
pub struct EntityRefRequest {
    pub collection: String,
    pub key: String,
}

impl EntityRefRequest {
    pub fn into_entity(self) -> AppResult<EntityRef> {
        EntityRef::new(self.collection, self.key)
    }
}

/// A chained condition or named scope call, like `wherePivot("level", ">", 2)`.
#[derive(Debug, Clone, Deserialize)]
pub struct MethodCallRequest {
    pub method: String,
    #[serde(default)]
    pub arguments: Vec<Value>,
}

/// Relation scope shared by every relation request.
#[derive(Debug, Clone, Deserialize)]
pub struct RelationScopeRequest {
    pub owner: EntityRefRequest,
    pub related: EntityRefRequest,
    #[serde(default)]
    pub relation: Option<String>,
    #[serde(default)]
    pub calls: Vec<MethodCallRequest>,
    #[serde(default)]
    pub pivot: PivotColumns,
}

#[derive(Debug, Deserialize)]
pub struct RelationRolesRequest {
    #[serde(flatten)]
    pub scope: RelationScopeRequest,
    #[serde(default)]
    pub roles: Vec<EnumValue>,
}

#[derive(Debug, Deserialize)]
pub struct RelationPermissionsRequest {
    #[serde(flatten)]
    pub scope: RelationScopeRequest,
    #[serde(default)]
    pub permissions: Vec<EnumValue>,
}

#[derive(Debug, Deserialize)]
pub struct RelationCanRequest {
    #[serde(flatten)]
    pub scope: RelationScopeRequest,
    pub permission: EnumValue,
}

#[derive(Debug, Deserialize)]
pub struct RelationNamedCheckRequest {
    #[serde(flatten)]
    pub scope: RelationScopeRequest,
    pub name: String,
}
