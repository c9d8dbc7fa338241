use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Stable identifier of a role or permission.
///
/// Definitions may use either string or integer identifiers. Both are stored
/// as text, see [`EnumValue::to_storage`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumValue {
    /// Integer identifier.
    Integer(i64),
    /// String identifier.
    Text(String),
}

impl EnumValue {
    /// Returns the representation written to storage columns.
    #[must_use]
    pub fn to_storage(&self) -> String {
        match self {
            Self::Integer(value) => value.to_string(),
            Self::Text(value) => value.clone(),
        }
    }

    /// Returns whether the value is an empty string.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(value) if value.trim().is_empty())
    }
}

impl Display for EnumValue {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(value) => write!(formatter, "{value}"),
            Self::Text(value) => formatter.write_str(value),
        }
    }
}

impl From<&str> for EnumValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for EnumValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for EnumValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for EnumValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

/// Flattens role or permission arguments into a list of values.
///
/// Implemented for single values, slices, arrays, vectors and the typed
/// sets, so callers can pass whatever shape they hold.
pub trait IntoValues {
    /// Consumes the argument and returns its values in order.
    fn into_values(self) -> Vec<EnumValue>;
}

impl IntoValues for EnumValue {
    fn into_values(self) -> Vec<EnumValue> {
        vec![self]
    }
}

impl IntoValues for &EnumValue {
    fn into_values(self) -> Vec<EnumValue> {
        vec![self.clone()]
    }
}

impl IntoValues for &str {
    fn into_values(self) -> Vec<EnumValue> {
        vec![EnumValue::from(self)]
    }
}

impl IntoValues for String {
    fn into_values(self) -> Vec<EnumValue> {
        vec![EnumValue::from(self)]
    }
}

impl IntoValues for i64 {
    fn into_values(self) -> Vec<EnumValue> {
        vec![EnumValue::from(self)]
    }
}

impl IntoValues for i32 {
    fn into_values(self) -> Vec<EnumValue> {
        vec![EnumValue::from(self)]
    }
}

impl IntoValues for () {
    fn into_values(self) -> Vec<EnumValue> {
        Vec::new()
    }
}

impl<T: IntoValues> IntoValues for Vec<T> {
    fn into_values(self) -> Vec<EnumValue> {
        self.into_iter().flat_map(IntoValues::into_values).collect()
    }
}

impl<T: IntoValues, const N: usize> IntoValues for [T; N] {
    fn into_values(self) -> Vec<EnumValue> {
        self.into_iter().flat_map(IntoValues::into_values).collect()
    }
}

impl<T: IntoValues + Clone> IntoValues for &[T] {
    fn into_values(self) -> Vec<EnumValue> {
        self.iter().cloned().flat_map(IntoValues::into_values).collect()
    }
}

impl<T: IntoValues + Clone, const N: usize> IntoValues for &[T; N] {
    fn into_values(self) -> Vec<EnumValue> {
        self.as_slice().into_values()
    }
}
