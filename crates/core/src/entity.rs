use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppResult, NonEmptyString};

/// Reference to an entity that can hold roles and permissions.
///
/// The collection doubles as the stored morph type of assignments and as the
/// registry scope key for entity-scoped resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    collection: NonEmptyString,
    key: NonEmptyString,
}

impl EntityRef {
    /// Creates a validated entity reference.
    pub fn new(collection: impl Into<String>, key: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            collection: NonEmptyString::new(collection)?,
            key: NonEmptyString::new(key)?,
        })
    }

    /// Creates an entity reference keyed by a UUID primary key.
    pub fn from_uuid(collection: impl Into<String>, key: Uuid) -> AppResult<Self> {
        Self::new(collection, key.to_string())
    }

    /// Returns the collection (table) name of the entity.
    #[must_use]
    pub fn collection(&self) -> &str {
        self.collection.as_str()
    }

    /// Returns the primary key of the entity rendered as a string.
    #[must_use]
    pub fn key(&self) -> &str {
        self.key.as_str()
    }
}

impl Display for EntityRef {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}:{}", self.collection(), self.key())
    }
}
