//! Relation metadata between entity collections.
//!
//! Only many-to-many relations carry role assignments; the catalog also
//! knows the other kinds so it can reject them with a precise message.

use std::collections::HashMap;

use rolegate_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::condition::Conditions;
use crate::inflection::{camel_case, is_identifier, pluralize};

/// Association table joining two collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PivotTable {
    /// Table name.
    pub table: String,
    /// Column referencing the owning entity.
    pub foreign_pivot_key: String,
    /// Column referencing the related entity.
    pub related_pivot_key: String,
    /// Whether rows carry `created_at`/`updated_at`.
    #[serde(default)]
    pub timestamps: bool,
}

impl PivotTable {
    fn validate(&self) -> AppResult<()> {
        for identifier in [
            &self.table,
            &self.foreign_pivot_key,
            &self.related_pivot_key,
        ] {
            if !is_identifier(identifier) {
                return Err(AppError::Validation(format!(
                    "pivot identifier '{identifier}' must be alphanumeric or underscore"
                )));
            }
        }

        Ok(())
    }
}

/// Kind of a relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RelationKind {
    /// Many-to-many through a pivot table.
    BelongsToMany(PivotTable),
    /// One-to-many.
    HasMany,
    /// One-to-one, owned by the other side.
    HasOne,
    /// Inverse of one-to-many or one-to-one.
    BelongsTo,
}

impl RelationKind {
    fn label(&self) -> &'static str {
        match self {
            Self::BelongsToMany(_) => "BelongsToMany",
            Self::HasMany => "HasMany",
            Self::HasOne => "HasOne",
            Self::BelongsTo => "BelongsTo",
        }
    }
}

/// A named relation declared on an owner collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationDefinition {
    /// Owning collection, such as `users`.
    pub owner: String,
    /// Relation name, such as `merchants`.
    pub name: String,
    /// Related collection, such as `merchants`.
    pub related: String,
    /// Relation kind.
    #[serde(flatten)]
    pub kind: RelationKind,
}

impl RelationDefinition {
    /// Returns the pivot table of a many-to-many relation.
    #[must_use]
    pub fn pivot(&self) -> Option<&PivotTable> {
        match &self.kind {
            RelationKind::BelongsToMany(pivot) => Some(pivot),
            _ => None,
        }
    }
}

/// Named filter scope declared on a related collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedScope {
    /// Collection the scope belongs to.
    pub collection: String,
    /// Scope name as used in chained calls.
    pub name: String,
    /// Conditions the scope appends.
    pub conditions: Conditions,
}

/// Known relations and named scopes.
#[derive(Debug, Clone, Default)]
pub struct RelationCatalog {
    relations: HashMap<(String, String), RelationDefinition>,
    scopes: HashMap<(String, String), Conditions>,
}

impl RelationCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a relation.
    pub fn with_relation(mut self, relation: RelationDefinition) -> AppResult<Self> {
        if let Some(pivot) = relation.pivot() {
            pivot.validate()?;
        }

        let key = (relation.owner.clone(), relation.name.clone());
        if self.relations.contains_key(&key) {
            return Err(AppError::Validation(format!(
                "relation '{}' is declared twice on '{}'",
                relation.name, relation.owner
            )));
        }

        self.relations.insert(key, relation);
        Ok(self)
    }

    /// Registers a named scope.
    #[must_use]
    pub fn with_scope(mut self, scope: NamedScope) -> Self {
        self.scopes
            .insert((scope.collection, scope.name), scope.conditions);
        self
    }

    /// Guesses the relation name from the related collection.
    #[must_use]
    pub fn guess_relation_name(related_collection: &str) -> String {
        camel_case(pluralize(related_collection).as_str())
    }

    /// Resolves the many-to-many relation from `owner` to `related`.
    pub fn resolve(
        &self,
        owner: &str,
        related: &str,
        relation_name: Option<&str>,
    ) -> AppResult<&RelationDefinition> {
        let explicit = relation_name.is_some();
        let name = relation_name
            .map(str::to_owned)
            .unwrap_or_else(|| Self::guess_relation_name(related));

        let relation = self
            .relations
            .get(&(owner.to_owned(), name.clone()))
            .ok_or_else(|| {
                let hint = if explicit {
                    "Ensure the right relation name was passed."
                } else {
                    "Pass the right relation name as the second argument."
                };
                AppError::InvalidRelationName(format!(
                    "The `{name}` relation does not exist on `{owner}`. {hint}"
                ))
            })?;

        if relation.pivot().is_none() {
            return Err(AppError::InvalidRelationName(format!(
                "The `{name}` relation is not a BelongsToMany relation, it is {}.",
                relation.kind.label()
            )));
        }

        if relation.related != related {
            return Err(AppError::InvalidRelationName(format!(
                "The `{name}` relation on `{owner}` relates to `{}`, not `{related}`.",
                relation.related
            )));
        }

        Ok(relation)
    }

    /// Returns the conditions of a named scope of a collection.
    #[must_use]
    pub fn scope(&self, collection: &str, name: &str) -> Option<&Conditions> {
        self.scopes
            .get(&(collection.to_owned(), name.to_owned()))
    }

    /// Iterates over registered relations.
    pub fn relations(&self) -> impl Iterator<Item = &RelationDefinition> {
        self.relations.values()
    }
}

#[cfg(test)]
mod tests {
    use rolegate_core::AppError;

    use crate::condition::{Condition, Conditions};

    use super::{NamedScope, PivotTable, RelationCatalog, RelationDefinition, RelationKind};

    fn catalog() -> RelationCatalog {
        let pivot = PivotTable {
            table: "merchant_user".to_owned(),
            foreign_pivot_key: "user_id".to_owned(),
            related_pivot_key: "merchant_id".to_owned(),
            timestamps: true,
        };

        RelationCatalog::new()
            .with_relation(RelationDefinition {
                owner: "users".to_owned(),
                name: "merchants".to_owned(),
                related: "merchants".to_owned(),
                kind: RelationKind::BelongsToMany(pivot),
            })
            .and_then(|catalog| {
                catalog.with_relation(RelationDefinition {
                    owner: "users".to_owned(),
                    name: "primaryMerchant".to_owned(),
                    related: "merchants".to_owned(),
                    kind: RelationKind::BelongsTo,
                })
            })
            .map(|catalog| {
                catalog.with_scope(NamedScope {
                    collection: "merchants".to_owned(),
                    name: "active".to_owned(),
                    conditions: [Condition::equals("status", "active")]
                        .into_iter()
                        .collect::<Conditions>(),
                })
            })
            .unwrap_or_else(|error| panic!("catalog should build: {error}"))
    }

    #[test]
    fn relation_name_is_guessed_from_related_collection() {
        assert_eq!(RelationCatalog::guess_relation_name("merchants"), "merchants");
        assert_eq!(
            RelationCatalog::guess_relation_name("store_branch"),
            "storeBranches"
        );

        let catalog = catalog();
        let resolved = catalog.resolve("users", "merchants", None);
        assert!(resolved.is_ok());
    }

    #[test]
    fn missing_relation_hints_at_the_relation_argument() {
        let catalog = catalog();

        let guessed = catalog.resolve("users", "teams", None);
        assert!(matches!(
            guessed,
            Err(AppError::InvalidRelationName(message)) if message.contains("second argument")
        ));

        let explicit = catalog.resolve("users", "merchants", Some("shops"));
        assert!(matches!(
            explicit,
            Err(AppError::InvalidRelationName(message)) if message.contains("Ensure the right relation")
        ));
    }

    #[test]
    fn non_many_to_many_relations_are_rejected() {
        let catalog = catalog();
        let result = catalog.resolve("users", "merchants", Some("primaryMerchant"));
        assert!(matches!(
            result,
            Err(AppError::InvalidRelationName(message)) if message.contains("not a BelongsToMany")
        ));
    }

    #[test]
    fn unsafe_pivot_identifiers_are_rejected() {
        let result = RelationCatalog::new().with_relation(RelationDefinition {
            owner: "users".to_owned(),
            name: "teams".to_owned(),
            related: "teams".to_owned(),
            kind: RelationKind::BelongsToMany(PivotTable {
                table: "team_user; drop".to_owned(),
                foreign_pivot_key: "user_id".to_owned(),
                related_pivot_key: "team_id".to_owned(),
                timestamps: false,
            }),
        });
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn named_scopes_are_looked_up_per_collection() {
        let catalog = catalog();
        assert!(catalog.scope("merchants", "active").is_some());
        assert!(catalog.scope("users", "active").is_none());
    }
}
