//! Workflow node, position, and credential reference types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Position of a node in the visual editor, serialized as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Position {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

impl Position {
    /// Creates a new position.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for Position {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Position> for [f64; 2] {
    fn from(position: Position) -> Self {
        [position.x, position.y]
    }
}

/// Reference from a node to a stored credential.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CredentialReference {
    /// Identifier of the stored credential.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name of the stored credential.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl CredentialReference {
    /// Returns whether the reference carries a non-empty identifier.
    pub fn is_resolved(&self) -> bool {
        self.id.as_deref().is_some_and(|id| !id.trim().is_empty())
    }
}

/// A typed unit of work in a workflow graph.
///
/// `name` is the human-facing key used by connections, `id` the
/// machine-generated one. Fields this type does not know about are kept
/// in [`Node::extra`] so they survive a round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Machine-generated unique identifier.
    #[serde(default)]
    pub id: String,
    /// Human-facing unique name.
    pub name: String,
    /// Namespace-prefixed node type, e.g. `n8n-nodes-base.httpRequest`.
    #[serde(rename = "type")]
    pub node_type: String,
    /// Version of the node type implementation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_version: Option<f64>,
    /// Editor position.
    #[serde(default)]
    pub position: Position,
    /// Node configuration.
    #[serde(default)]
    pub parameters: Map<String, Value>,
    /// Credentials keyed by credential type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<BTreeMap<String, CredentialReference>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes_in_flow: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continue_on_fail: Option<bool>,
    /// Error behaviour, e.g. `continueErrorOutput`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_on_fail: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tries: Option<u32>,
    /// Milliseconds to wait between retries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_between_tries: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub always_output_data: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execute_once: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_id: Option<String>,
    /// Unrecognized fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Node {
    /// Creates a node with the given identity and empty configuration.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        node_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            node_type: node_type.into(),
            type_version: None,
            position: Position::default(),
            parameters: Map::new(),
            credentials: None,
            disabled: None,
            notes: None,
            notes_in_flow: None,
            continue_on_fail: None,
            on_error: None,
            retry_on_fail: None,
            max_tries: None,
            wait_between_tries: None,
            always_output_data: None,
            execute_once: None,
            webhook_id: None,
            extra: Map::new(),
        }
    }

    /// Sets the type version.
    pub fn with_type_version(mut self, version: f64) -> Self {
        self.type_version = Some(version);
        self
    }

    /// Sets the editor position.
    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position = Position::new(x, y);
        self
    }

    /// Replaces the node configuration.
    pub fn with_parameters(mut self, parameters: Map<String, Value>) -> Self {
        self.parameters = parameters;
        self
    }

    /// Adds a credential reference.
    pub fn with_credential(
        mut self,
        credential_type: impl Into<String>,
        reference: CredentialReference,
    ) -> Self {
        self.credentials
            .get_or_insert_with(BTreeMap::new)
            .insert(credential_type.into(), reference);
        self
    }

    /// Marks the node as disabled.
    pub fn disabled(mut self) -> Self {
        self.disabled = Some(true);
        self
    }

    /// Returns whether the node takes part in execution.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.disabled != Some(true)
    }
}
