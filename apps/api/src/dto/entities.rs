use rolegate_domain::EnumValue;
use serde::Deserialize;

/// Incoming role list; an empty list means "all" for removals.
#[derive(Debug, Default, Deserialize)]
pub struct RolesRequest {
    #[serde(default)]
    pub roles: Vec<EnumValue>,
}

/// Incoming permission list; an empty list means "all" for revocations.
#[derive(Debug, Default, Deserialize)]
pub struct PermissionsRequest {
    #[serde(default)]
    pub permissions: Vec<EnumValue>,
}

/// Incoming single permission check.
#[derive(Debug, Deserialize)]
pub struct CanRequest {
    pub permission: EnumValue,
}
