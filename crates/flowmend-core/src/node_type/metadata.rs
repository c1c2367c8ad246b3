//! Node-type metadata as resolved from a type repository.

use serde::{Deserialize, Serialize};

use crate::property::PropertyDefinition;

/// Schema and version information about one node type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeTypeMetadata {
    /// Type identifier as stored in the repository, e.g. `nodes-base.slack`.
    pub node_type: String,
    /// Human-readable name.
    #[serde(default)]
    pub display_name: String,
    /// Owning package, e.g. `n8n-nodes-base`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    /// Latest known version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<f64>,
    /// Whether nodes of this type must carry a `typeVersion`.
    #[serde(default)]
    pub is_versioned: bool,
    #[serde(default)]
    pub is_trigger: bool,
    #[serde(default)]
    pub is_webhook: bool,
    /// Property schema.
    #[serde(default)]
    pub properties: Vec<PropertyDefinition>,
}

impl NodeTypeMetadata {
    /// Creates metadata with no properties.
    pub fn new(node_type: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            display_name: String::new(),
            package: None,
            version: None,
            is_versioned: false,
            is_trigger: false,
            is_webhook: false,
            properties: Vec::new(),
        }
    }

    /// Marks the type as versioned with the given latest version.
    pub fn versioned(mut self, latest: f64) -> Self {
        self.is_versioned = true;
        self.version = Some(latest);
        self
    }

    /// Replaces the property schema.
    pub fn with_properties(mut self, properties: Vec<PropertyDefinition>) -> Self {
        self.properties = properties;
        self
    }
}
