use serde::{Deserialize, Serialize};

use crate::inflection::friendly_key_name;
use crate::permission::PermissionEnum;
use crate::sets::PermissionSet;
use crate::value::{EnumValue, IntoValues};

/// Declared metadata for one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSpec {
    /// Stable identifier.
    pub value: EnumValue,
    /// Symbolic name such as `SuperAdmin`.
    pub key: String,
    /// Optional custom description; derived from the key when absent.
    #[serde(default)]
    pub description: Option<String>,
}

impl RoleSpec {
    /// Creates a role declaration.
    #[must_use]
    pub fn new(value: impl Into<EnumValue>, key: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            key: key.into(),
            description: None,
        }
    }

    /// Sets a custom description.
    #[must_use]
    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Materialized role carrying its effective permissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    value: EnumValue,
    key: String,
    description: String,
    title: String,
    permissions: PermissionSet,
}

impl Role {
    pub(crate) fn from_spec(spec: &RoleSpec, permissions: PermissionSet) -> Self {
        let title = friendly_key_name(spec.key.as_str());

        Self {
            value: spec.value.clone(),
            key: spec.key.clone(),
            description: spec.description.clone().unwrap_or_else(|| title.clone()),
            title,
            permissions,
        }
    }

    /// Returns the stable identifier.
    #[must_use]
    pub fn value(&self) -> &EnumValue {
        &self.value
    }

    /// Returns the symbolic name.
    #[must_use]
    pub fn key(&self) -> &str {
        self.key.as_str()
    }

    /// Returns the human description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Returns the readable title.
    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Returns the permissions the role carries, hierarchy included.
    #[must_use]
    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }
}

impl IntoValues for Role {
    fn into_values(self) -> Vec<EnumValue> {
        vec![self.value]
    }
}

impl IntoValues for &Role {
    fn into_values(self) -> Vec<EnumValue> {
        vec![self.value.clone()]
    }
}

/// Compile-time role enumeration.
///
/// Variants are ranked by their position in [`RoleEnum::all`]; with
/// hierarchy enabled a role inherits the grants of every variant after it.
pub trait RoleEnum: Copy + 'static {
    /// Permission enumeration the roles draw from.
    type Permission: PermissionEnum;

    /// Definition name.
    const DEFINITION: &'static str;

    /// Whether higher roles inherit the grants of lower ones.
    const USES_HIERARCHY: bool = false;

    /// Whether removing a relation role deletes the association row.
    const DELETE_PIVOT_ON_REMOVE: bool = false;

    /// Every variant in declaration order.
    fn all() -> &'static [Self];

    /// Stable identifier of the variant.
    fn value(&self) -> EnumValue;

    /// Symbolic name of the variant.
    fn key(&self) -> &'static str;

    /// Custom description, if any.
    fn description(&self) -> Option<&'static str> {
        None
    }

    /// Ordered mapping of roles to their own grants.
    fn grants() -> Vec<(Self, Vec<Self::Permission>)>;
}
