//! Node-type catalog configuration.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use flowmend_validate::lookup::NodeTypeRegistry;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// Where node-type metadata is read from.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
pub struct NodeTypesConfig {
    /// Path to a JSON array of node-type metadata documents.
    ///
    /// Without a catalog every node type is reported as unknown.
    #[arg(long, env = "FLOWMEND_NODE_TYPES")]
    pub node_types: Option<PathBuf>,
}

impl NodeTypesConfig {
    /// Loads the catalog, or an empty registry when no path is configured.
    pub fn load(&self) -> anyhow::Result<NodeTypeRegistry> {
        let Some(path) = &self.node_types else {
            tracing::warn!(
                target: TRACING_TARGET_CONFIG,
                "no node-type catalog configured, every node type will be unknown"
            );
            return Ok(NodeTypeRegistry::new());
        };

        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read node types from {}", path.display()))?;
        let registry = NodeTypeRegistry::from_json(&json)
            .with_context(|| format!("failed to parse node types from {}", path.display()))?;

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            path = %path.display(),
            node_types = registry.len(),
            "Node-type catalog loaded"
        );
        Ok(registry)
    }

    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            node_types = ?self.node_types,
            "Node-type catalog configuration"
        );
    }
}
