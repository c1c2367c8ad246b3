//! Node-type metadata lookup.

use std::collections::HashMap;
use std::sync::Arc;

use flowmend_core::Result;
use flowmend_core::node_type::{NodeTypeMetadata, normalize};

/// Source of node-type metadata, keyed by type identifier.
///
/// Implementations return `Ok(None)` for unknown types and reserve `Err`
/// for failures of the backing store.
pub trait NodeTypeLookup: Send + Sync {
    /// Returns metadata stored under exactly this identifier.
    fn get_node(&self, node_type: &str) -> Result<Option<NodeTypeMetadata>>;

    /// Resolves a workflow type by trying the literal identifier first, then
    /// its short and canonical forms.
    ///
    /// Returns the identifier that matched along with the metadata.
    fn resolve(&self, node_type: &str) -> Result<Option<(String, NodeTypeMetadata)>> {
        for candidate in normalize::lookup_candidates(node_type) {
            if let Some(metadata) = self.get_node(&candidate)? {
                return Ok(Some((candidate, metadata)));
            }
        }
        Ok(None)
    }
}

impl<T: NodeTypeLookup + ?Sized> NodeTypeLookup for &T {
    fn get_node(&self, node_type: &str) -> Result<Option<NodeTypeMetadata>> {
        (**self).get_node(node_type)
    }
}

impl<T: NodeTypeLookup + ?Sized> NodeTypeLookup for Arc<T> {
    fn get_node(&self, node_type: &str) -> Result<Option<NodeTypeMetadata>> {
        (**self).get_node(node_type)
    }
}

/// In-memory metadata store.
#[derive(Debug, Clone, Default)]
pub struct NodeTypeRegistry {
    types: HashMap<String, NodeTypeMetadata>,
}

impl NodeTypeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON array of node-type metadata documents.
    ///
    /// # Errors
    ///
    /// Returns a serialization error when the document is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        let types: Vec<NodeTypeMetadata> = serde_json::from_str(json)?;
        Ok(types.into_iter().collect())
    }

    /// Stores metadata under its own `node_type`, replacing any previous entry.
    pub fn insert(&mut self, metadata: NodeTypeMetadata) -> Option<NodeTypeMetadata> {
        self.types.insert(metadata.node_type.clone(), metadata)
    }

    /// Adds metadata.
    pub fn with_type(mut self, metadata: NodeTypeMetadata) -> Self {
        self.insert(metadata);
        self
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl FromIterator<NodeTypeMetadata> for NodeTypeRegistry {
    fn from_iter<T: IntoIterator<Item = NodeTypeMetadata>>(iter: T) -> Self {
        let mut registry = Self::new();
        for metadata in iter {
            registry.insert(metadata);
        }
        registry
    }
}

impl NodeTypeLookup for NodeTypeRegistry {
    fn get_node(&self, node_type: &str) -> Result<Option<NodeTypeMetadata>> {
        Ok(self.types.get(node_type).cloned())
    }
}
