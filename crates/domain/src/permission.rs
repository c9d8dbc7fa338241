use std::collections::HashMap;

use rolegate_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::inflection::friendly_key_name;
use crate::sets::PermissionSet;
use crate::value::{EnumValue, IntoValues};

/// Declared metadata for one permission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSpec {
    /// Stable identifier.
    pub value: EnumValue,
    /// Symbolic name such as `EditProduct`.
    pub key: String,
    /// Optional custom description; derived from the key when absent.
    #[serde(default)]
    pub description: Option<String>,
}

impl PermissionSpec {
    /// Creates a permission declaration.
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

/// Materialized permission with its display metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Permission {
    value: EnumValue,
    key: String,
    description: String,
    title: String,
}

impl Permission {
    fn from_spec(spec: &PermissionSpec) -> Self {
        let title = friendly_key_name(spec.key.as_str());
        let base = spec.description.clone().unwrap_or_else(|| title.clone());

        Self {
            value: spec.value.clone(),
            key: spec.key.clone(),
            description: format!("Can {}", base.to_lowercase()),
            title,
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

    /// Returns the `Can ...` description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Returns the readable title.
    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_str()
    }
}

impl IntoValues for Permission {
    fn into_values(self) -> Vec<EnumValue> {
        vec![self.value]
    }
}

impl IntoValues for &Permission {
    fn into_values(self) -> Vec<EnumValue> {
        vec![self.value.clone()]
    }
}

/// Closed enumeration of permissions shared by one or more role definitions.
#[derive(Debug, Clone)]
pub struct PermissionCatalog {
    name: String,
    permissions: Vec<Permission>,
    by_value: HashMap<EnumValue, usize>,
    by_key: HashMap<String, usize>,
}

impl PermissionCatalog {
    /// Builds a catalog, rejecting duplicate values or keys.
    pub fn new(name: impl Into<String>, specs: Vec<PermissionSpec>) -> AppResult<Self> {
        let name = name.into();
        let mut permissions = Vec::with_capacity(specs.len());
        let mut by_value = HashMap::with_capacity(specs.len());
        let mut by_key = HashMap::with_capacity(specs.len());

        for (index, spec) in specs.iter().enumerate() {
            if spec.key.trim().is_empty() || spec.value.is_blank() {
                return Err(AppError::Validation(format!(
                    "permission #{index} of catalog '{name}' must have a value and a key"
                )));
            }
            if by_value.insert(spec.value.clone(), index).is_some() {
                return Err(AppError::Validation(format!(
                    "permission value '{}' is declared twice in catalog '{name}'",
                    spec.value
                )));
            }
            if by_key.insert(spec.key.clone(), index).is_some() {
                return Err(AppError::Validation(format!(
                    "permission key '{}' is declared twice in catalog '{name}'",
                    spec.key
                )));
            }
            permissions.push(Permission::from_spec(spec));
        }

        Ok(Self {
            name,
            permissions,
            by_value,
            by_key,
        })
    }

    /// Builds a catalog from a compile-time permission enum.
    pub fn from_enum<P: PermissionEnum>() -> AppResult<Self> {
        let specs = P::all()
            .iter()
            .map(|permission| PermissionSpec {
                value: permission.value(),
                key: permission.key().to_owned(),
                description: permission.description().map(str::to_owned),
            })
            .collect();

        Self::new(P::CATALOG, specs)
    }

    /// Returns the catalog name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns whether the value is a member of the catalog.
    #[must_use]
    pub fn contains(&self, value: &EnumValue) -> bool {
        self.by_value.contains_key(value)
    }

    /// Returns the permission for a value.
    #[must_use]
    pub fn get(&self, value: &EnumValue) -> Option<&Permission> {
        self.by_value
            .get(value)
            .map(|index| &self.permissions[*index])
    }

    /// Returns the permission declared under a symbolic key.
    #[must_use]
    pub fn by_key(&self, key: &str) -> Option<&Permission> {
        self.by_key.get(key).map(|index| &self.permissions[*index])
    }

    /// Decodes a stored permission value.
    pub fn decode_stored(&self, raw: &str) -> AppResult<Permission> {
        self.permissions
            .iter()
            .find(|permission| permission.value.to_storage() == raw)
            .cloned()
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "stored permission '{raw}' is not declared in catalog '{}'",
                    self.name
                ))
            })
    }

    /// Materializes permissions for the given values.
    pub fn instances_from_values(&self, values: impl IntoValues) -> AppResult<Vec<Permission>> {
        values
            .into_values()
            .into_iter()
            .map(|value| {
                self.get(&value).cloned().ok_or_else(|| {
                    AppError::InvalidArgument(format!(
                        "the permission \"{value}\" does not exist on the \"{}\" catalog",
                        self.name
                    ))
                })
            })
            .collect()
    }

    /// Returns every permission of the catalog.
    #[must_use]
    pub fn all(&self) -> PermissionSet {
        self.permissions.iter().cloned().collect()
    }

    /// Returns `(value, title)` pairs in declaration order.
    #[must_use]
    pub fn as_select(&self) -> Vec<(EnumValue, String)> {
        self.permissions
            .iter()
            .map(|permission| (permission.value.clone(), permission.title.clone()))
            .collect()
    }
}

/// Compile-time permission enumeration.
///
/// Implement this for a fieldless enum and build the runtime catalog with
/// [`PermissionCatalog::from_enum`].
pub trait PermissionEnum: Copy + 'static {
    /// Catalog name.
    const CATALOG: &'static str;

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
}

#[cfg(test)]
mod tests {
    use super::{PermissionCatalog, PermissionSpec};
    use crate::value::EnumValue;

    fn catalog() -> PermissionCatalog {
        PermissionCatalog::new(
            "permissions",
            vec![
                PermissionSpec::new("edit_product", "EditProduct"),
                PermissionSpec::new("view_transaction", "ViewTransaction")
                    .described("Look at past transactions"),
            ],
        )
        .unwrap_or_else(|error| panic!("catalog should build: {error}"))
    }

    #[test]
    fn permission_metadata_is_derived_from_key() {
        let catalog = catalog();
        let permission = catalog.get(&EnumValue::from("edit_product"));
        assert!(permission.is_some());
        let permission = permission.unwrap_or_else(|| unreachable!());
        assert_eq!(permission.title(), "Edit product");
        assert_eq!(permission.description(), "Can edit product");
        assert_eq!(permission.key(), "EditProduct");
    }

    #[test]
    fn custom_description_is_prefixed_and_lowered() {
        let catalog = catalog();
        let permission = catalog.by_key("ViewTransaction");
        assert_eq!(
            permission.map(|value| value.description().to_owned()),
            Some("Can look at past transactions".to_owned())
        );
    }

    #[test]
    fn duplicate_values_are_rejected() {
        let result = PermissionCatalog::new(
            "permissions",
            vec![
                PermissionSpec::new("edit_product", "EditProduct"),
                PermissionSpec::new("edit_product", "ChangeProduct"),
            ],
        );
        assert!(result.is_err());
    }

    #[test]
    fn select_pairs_keep_declaration_order() {
        let pairs = catalog().as_select();
        assert_eq!(pairs[0], (EnumValue::from("edit_product"), "Edit product".to_owned()));
        assert_eq!(pairs.len(), 2);
    }

    #[test]
    fn unknown_instances_are_invalid_arguments() {
        let result = catalog().instances_from_values("fly");
        assert!(matches!(
            result,
            Err(rolegate_core::AppError::InvalidArgument(_))
        ));
    }
}
