//! Immutable, deduplicated role and permission collections.

use std::collections::BTreeMap;

use crate::permission::Permission;
use crate::role::Role;
use crate::value::{EnumValue, IntoValues};

/// Returns true when every needle value is present in the haystack.
///
/// An empty needle or an empty haystack never matches.
fn all_exist_in<T>(needle: &[EnumValue], haystack: &BTreeMap<EnumValue, T>) -> bool {
    if needle.is_empty() || haystack.is_empty() {
        return false;
    }

    needle.iter().all(|value| haystack.contains_key(value))
}

/// Set of permissions keyed by value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet {
    items: BTreeMap<EnumValue, Permission>,
}

impl PermissionSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new set holding the members of both sets.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let mut items = self.items.clone();
        for (value, permission) in &other.items {
            items
                .entry(value.clone())
                .or_insert_with(|| permission.clone());
        }

        Self { items }
    }

    /// Returns whether the value is a member.
    #[must_use]
    pub fn contains(&self, value: &EnumValue) -> bool {
        self.items.contains_key(value)
    }

    /// Returns whether every given value is a member.
    #[must_use]
    pub fn contains_all(&self, values: &[EnumValue]) -> bool {
        all_exist_in(values, &self.items)
    }

    /// Returns member values.
    #[must_use]
    pub fn values(&self) -> Vec<EnumValue> {
        self.items.keys().cloned().collect()
    }

    /// Returns members as a vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Permission> {
        self.items.values().cloned().collect()
    }

    /// Iterates over members.
    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.items.values()
    }

    /// Returns the number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        let mut items = BTreeMap::new();
        for permission in iter {
            items
                .entry(permission.value().clone())
                .or_insert(permission);
        }

        Self { items }
    }
}

impl IntoValues for &PermissionSet {
    fn into_values(self) -> Vec<EnumValue> {
        self.values()
    }
}

impl IntoValues for PermissionSet {
    fn into_values(self) -> Vec<EnumValue> {
        self.items.into_keys().collect()
    }
}

/// Set of roles keyed by value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSet {
    items: BTreeMap<EnumValue, Role>,
}

impl RoleSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new set holding the members of both sets.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let mut items = self.items.clone();
        for (value, role) in &other.items {
            items.entry(value.clone()).or_insert_with(|| role.clone());
        }

        Self { items }
    }

    /// Returns every permission carried by the members.
    #[must_use]
    pub fn permissions(&self) -> PermissionSet {
        self.items
            .values()
            .fold(PermissionSet::new(), |merged, role| {
                merged.union(role.permissions())
            })
    }

    /// Returns whether the value is a member.
    #[must_use]
    pub fn contains(&self, value: &EnumValue) -> bool {
        self.items.contains_key(value)
    }

    /// Returns whether every given value is a member.
    #[must_use]
    pub fn contains_all(&self, values: &[EnumValue]) -> bool {
        all_exist_in(values, &self.items)
    }

    /// Returns member values.
    #[must_use]
    pub fn values(&self) -> Vec<EnumValue> {
        self.items.keys().cloned().collect()
    }

    /// Returns members as a vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Role> {
        self.items.values().cloned().collect()
    }

    /// Iterates over members.
    pub fn iter(&self) -> impl Iterator<Item = &Role> {
        self.items.values()
    }

    /// Returns the number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        let mut items = BTreeMap::new();
        for role in iter {
            items.entry(role.value().clone()).or_insert(role);
        }

        Self { items }
    }
}

impl IntoValues for &RoleSet {
    fn into_values(self) -> Vec<EnumValue> {
        self.values()
    }
}

impl IntoValues for RoleSet {
    fn into_values(self) -> Vec<EnumValue> {
        self.items.into_keys().collect()
    }
}
