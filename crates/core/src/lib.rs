//! Shared primitives for all Rust crates in Rolegate.

#![forbid(unsafe_code)]

/// Entity references shared across services.
pub mod entity;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use entity::EntityRef;

/// Result type used across Rolegate crates.
pub type AppResult<T> = Result<T, AppError>;

/// Message carried by every authorization failure.
pub const PERMISSION_DENIED_MESSAGE: &str = "You are not authorized to perform this action.";

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// A definition's permission mapping disagrees with its declared role order.
    #[error(
        "invalid role hierarchy in the permission mapping of the `{definition}` definition: role `{role}` should be placed in the same position as in the role declaration"
    )]
    InvalidRoleHierarchy {
        /// Offending role value.
        role: String,
        /// Definition name.
        definition: String,
    },

    /// A role value absent from its definition was referenced.
    #[error("invalid role `{role}` supplied to the `{definition}` definition")]
    UnknownRole {
        /// Offending role value.
        role: String,
        /// Definition name.
        definition: String,
    },

    /// The caller passed an empty or out-of-range argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A named or guessed relation does not exist or is not many-to-many.
    #[error("invalid relation name: {0}")]
    InvalidRelationName(String),

    /// The entity lacks the required roles or permissions.
    #[error("{0}")]
    PermissionDenied(String),

    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Builds the standard authorization failure.
    #[must_use]
    pub fn permission_denied() -> Self {
        Self::PermissionDenied(PERMISSION_DENIED_MESSAGE.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::{AppError, EntityRef, NonEmptyString};

    #[test]
    fn non_empty_string_rejects_whitespace() {
        let result = NonEmptyString::new("   ");
        assert!(result.is_err());
    }

    #[test]
    fn entity_ref_formats_collection_and_key() {
        let entity = EntityRef::new("users", "42");
        assert!(entity.is_ok());
        assert_eq!(
            entity.map(|value| value.to_string()).unwrap_or_default(),
            "users:42"
        );
    }

    #[test]
    fn entity_ref_rejects_blank_key() {
        assert!(EntityRef::new("users", " ").is_err());
    }

    #[test]
    fn permission_denied_carries_standard_message() {
        assert_eq!(
            AppError::permission_denied().to_string(),
            "You are not authorized to perform this action."
        );
    }
}
