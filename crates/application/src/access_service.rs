use std::sync::Arc;

use rolegate_core::EntityRef;
use rolegate_domain::{DefinitionRegistry, RelationCatalog};

use crate::assignment_ports::{AssignmentStore, RelationAssignmentStore};
use crate::direct_resolver::DirectResolver;

/// Entry point binding stores and definitions to resolvers.
#[derive(Clone)]
pub struct AccessService {
    store: Arc<dyn AssignmentStore>,
    relation_store: Arc<dyn RelationAssignmentStore>,
    registry: Arc<DefinitionRegistry>,
    relations: Arc<RelationCatalog>,
}

impl AccessService {
    /// Creates a new access service.
    #[must_use]
    pub fn new(
        store: Arc<dyn AssignmentStore>,
        relation_store: Arc<dyn RelationAssignmentStore>,
        registry: Arc<DefinitionRegistry>,
        relations: Arc<RelationCatalog>,
    ) -> Self {
        Self {
            store,
            relation_store,
            registry,
            relations,
        }
    }

    /// Returns a resolver for the entity, using the definition registered
    /// for its collection.
    #[must_use]
    pub fn entity(&self, entity: EntityRef) -> DirectResolver {
        let definition = self.registry.lookup(entity.collection());
        DirectResolver::new(entity, definition, self.clone())
    }

    /// Returns the definition registry.
    #[must_use]
    pub fn registry(&self) -> &DefinitionRegistry {
        &self.registry
    }

    /// Returns the relation catalog.
    #[must_use]
    pub fn relations(&self) -> &RelationCatalog {
        &self.relations
    }

    pub(crate) fn store(&self) -> &Arc<dyn AssignmentStore> {
        &self.store
    }

    pub(crate) fn relation_store(&self) -> &Arc<dyn RelationAssignmentStore> {
        &self.relation_store
    }

    pub(crate) fn relation_catalog(&self) -> Arc<RelationCatalog> {
        self.relations.clone()
    }
}
