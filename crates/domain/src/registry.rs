use std::collections::HashMap;
use std::sync::Arc;

use crate::role_definition::RoleDefinition;

/// Scope key of the fallback definition.
pub const DEFAULT_SCOPE: &str = "default";

/// Immutable mapping from a scope key (a collection or pivot table name) to
/// the role definition resolving it.
#[derive(Debug, Clone)]
pub struct DefinitionRegistry {
    default: Arc<RoleDefinition>,
    scoped: HashMap<String, Arc<RoleDefinition>>,
}

impl DefinitionRegistry {
    /// Creates a registry resolving every scope to `default`.
    #[must_use]
    pub fn new(default: Arc<RoleDefinition>) -> Self {
        Self {
            default,
            scoped: HashMap::new(),
        }
    }

    /// Routes one scope key to a dedicated definition.
    #[must_use]
    pub fn with_scope(
        mut self,
        scope_key: impl Into<String>,
        definition: Arc<RoleDefinition>,
    ) -> Self {
        self.scoped.insert(scope_key.into(), definition);
        self
    }

    /// Returns the definition for a scope key, falling back to the default.
    #[must_use]
    pub fn lookup(&self, scope_key: &str) -> Arc<RoleDefinition> {
        self.scoped
            .get(scope_key)
            .cloned()
            .unwrap_or_else(|| self.default.clone())
    }

    /// Returns the fallback definition.
    #[must_use]
    pub fn default_definition(&self) -> Arc<RoleDefinition> {
        self.default.clone()
    }

    /// Returns `(scope_key, definition)` pairs, default first then by key.
    #[must_use]
    pub fn entries(&self) -> Vec<(String, Arc<RoleDefinition>)> {
        let mut scoped: Vec<(String, Arc<RoleDefinition>)> = self
            .scoped
            .iter()
            .map(|(key, definition)| (key.clone(), definition.clone()))
            .collect();
        scoped.sort_by(|left, right| left.0.cmp(&right.0));

        let mut entries = Vec::with_capacity(scoped.len() + 1);
        entries.push((DEFAULT_SCOPE.to_owned(), self.default.clone()));
        entries.extend(scoped);
        entries
    }
}
