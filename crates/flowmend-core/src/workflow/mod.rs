//! Workflow definition types.
//!
//! This module contains the serializable, wire-compatible workflow model:
//! - [`Workflow`]: nodes, name-keyed connections, settings and tags
//! - [`Node`]: a typed unit of work with its partial configuration
//! - [`Connections`]: `sourceName → channel → output slots → edges`

mod connection;
mod node;

pub use connection::{
    AI_TOOL, Connection, Connections, ERROR, EdgeRef, MAIN, NodeConnections, OutputSlots,
};
pub use node::{CredentialReference, Node, Position};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::TRACING_TARGET;
use crate::error::{Error, Result};

/// Serializable workflow definition.
///
/// Created by an external caller and validated or rewritten in memory.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Workflow {
    /// Persistent identifier, if the workflow has been stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Workflow name.
    #[serde(default)]
    pub name: String,
    /// Nodes in declaration order.
    pub nodes: Vec<Node>,
    /// Name-keyed connection map.
    #[serde(default)]
    pub connections: Connections,
    /// Free-form workflow settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Map<String, Value>>,
    /// Tag set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Unrecognized fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Workflow {
    /// Creates an empty workflow with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Parses a workflow from JSON, enforcing the structural precondition.
    ///
    /// # Errors
    ///
    /// Returns a precondition error if `nodes` is absent or not an array, and
    /// a serialization error if the value does not match the workflow shape.
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.get("nodes").is_some_and(Value::is_array) {
            tracing::debug!(
                target: TRACING_TARGET,
                "rejecting workflow without a nodes array"
            );
            return Err(Error::precondition().with_message("workflow must have a nodes array"));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Adds a node.
    pub fn with_node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    /// Adds a connection from `source`'s output slot to `connection`.
    pub fn with_connection(
        mut self,
        source: impl Into<String>,
        channel: impl Into<String>,
        output_index: usize,
        connection: Connection,
    ) -> Self {
        self.connections
            .connect(source, channel, output_index, connection);
        self
    }

    /// Returns the node with the given name.
    pub fn node_by_name(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.name == name)
    }

    /// Returns the node with the given id.
    pub fn node_by_id(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Returns the position of a node matched by id first, then by name.
    pub fn find_node_index(&self, id_or_name: &str) -> Option<usize> {
        self.nodes
            .iter()
            .position(|node| !node.id.is_empty() && node.id == id_or_name)
            .or_else(|| self.nodes.iter().position(|node| node.name == id_or_name))
    }

    /// Returns a node matched by id first, then by name.
    pub fn find_node(&self, id_or_name: &str) -> Option<&Node> {
        self.find_node_index(id_or_name).map(|index| &self.nodes[index])
    }

    /// Returns a mutable node matched by id first, then by name.
    pub fn find_node_mut(&mut self, id_or_name: &str) -> Option<&mut Node> {
        self.find_node_index(id_or_name)
            .map(move |index| &mut self.nodes[index])
    }

    /// Returns an iterator over enabled nodes.
    pub fn enabled_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|node| node.is_enabled())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_from_value_requires_nodes_array() {
        let missing = Workflow::from_value(json!({ "name": "w", "connections": {} }));
        assert_eq!(missing.unwrap_err().kind(), ErrorKind::Precondition);

        let not_array = Workflow::from_value(json!({ "nodes": {}, "connections": {} }));
        assert_eq!(not_array.unwrap_err().kind(), ErrorKind::Precondition);
    }

    #[test]
    fn test_from_value_parses_workflow() {
        let workflow = Workflow::from_value(json!({
            "name": "demo",
            "nodes": [
                { "id": "a", "name": "Start", "type": "n8n-nodes-base.manualTrigger", "position": [0, 0] },
                { "id": "b", "name": "HTTP", "type": "n8n-nodes-base.httpRequest", "position": [200, 0] }
            ],
            "connections": {
                "Start": { "main": [[{ "node": "HTTP", "type": "main", "index": 0 }]] }
            },
            "tags": ["demo"],
            "active": false
        }))
        .expect("valid workflow");

        assert_eq!(workflow.nodes.len(), 2);
        assert_eq!(workflow.connections.edge_count(), 1);
        assert_eq!(workflow.tags, Some(vec!["demo".to_string()]));
        assert_eq!(workflow.extra.get("active"), Some(&json!(false)));
    }

    #[test]
    fn test_find_node_prefers_id() {
        let workflow = Workflow::new("w")
            .with_node(Node::new("HTTP", "Start", "n8n-nodes-base.manualTrigger"))
            .with_node(Node::new("2", "HTTP", "n8n-nodes-base.httpRequest"));

        assert_eq!(workflow.find_node("HTTP").map(|n| n.name.as_str()), Some("Start"));
        assert_eq!(workflow.find_node("2").map(|n| n.name.as_str()), Some("HTTP"));
        assert!(workflow.find_node("missing").is_none());
    }
}
