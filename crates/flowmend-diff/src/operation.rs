//! Diff operation payloads.

use flowmend_core::workflow::{Node, Position};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use strum::{Display, EnumString, IntoStaticStr};

/// Pass an operation is applied in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum OperationPhase {
    Node,
    Connection,
    Metadata,
}

impl OperationPhase {
    /// Passes in application order.
    pub const ORDER: [Self; 3] = [Self::Node, Self::Connection, Self::Metadata];
}

/// Wire name of every supported operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "camelCase")]
pub enum OperationKind {
    AddNode,
    RemoveNode,
    UpdateNode,
    MoveNode,
    EnableNode,
    DisableNode,
    AddConnection,
    RemoveConnection,
    UpdateConnection,
    UpdateSettings,
    UpdateName,
    AddTag,
    RemoveTag,
}

impl OperationKind {
    /// Returns the pass this kind of operation belongs to.
    pub fn phase(self) -> OperationPhase {
        match self {
            Self::AddNode
            | Self::RemoveNode
            | Self::UpdateNode
            | Self::MoveNode
            | Self::EnableNode
            | Self::DisableNode => OperationPhase::Node,
            Self::AddConnection | Self::RemoveConnection | Self::UpdateConnection => {
                OperationPhase::Connection
            }
            Self::UpdateSettings | Self::UpdateName | Self::AddTag | Self::RemoveTag => {
                OperationPhase::Metadata
            }
        }
    }
}

/// Addresses an existing node by id or by name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSelector {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_name: Option<String>,
}

impl NodeSelector {
    /// Selects a node by id.
    pub fn id(id: impl Into<String>) -> Self {
        Self {
            node_id: Some(id.into()),
            node_name: None,
        }
    }

    /// Selects a node by name.
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            node_id: None,
            node_name: Some(name.into()),
        }
    }

    /// Returns the reference used in messages.
    pub fn label(&self) -> &str {
        self.node_id
            .as_deref()
            .or(self.node_name.as_deref())
            .unwrap_or_default()
    }
}

/// `updateNode` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateNode {
    #[serde(flatten)]
    pub selector: NodeSelector,
    /// Dot-separated paths on the node's JSON form, mapped to new values.
    pub updates: Map<String, Value>,
}

/// `moveNode` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveNode {
    #[serde(flatten)]
    pub selector: NodeSelector,
    pub position: Position,
}

/// One edge, as addressed by connection operations.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionSpec {
    /// Source node name or id.
    pub source: String,
    /// Target node name or id.
    pub target: String,
    /// Source output channel, `main` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_output: Option<String>,
    /// Target input channel, `main` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_input: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_index: Option<u32>,
}

impl ConnectionSpec {
    /// Creates a spec for a `main` edge between two nodes.
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            ..Default::default()
        }
    }
}

/// Field overrides applied by `updateConnection`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionUpdates {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_input: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_index: Option<u32>,
}

/// `updateConnection` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateConnection {
    /// The edge to replace.
    #[serde(flatten)]
    pub connection: ConnectionSpec,
    /// Overrides merged into the replacement edge.
    #[serde(default)]
    pub updates: ConnectionUpdates,
}

impl UpdateConnection {
    /// Returns the edge that replaces the current one.
    pub fn replacement(&self) -> ConnectionSpec {
        let current = &self.connection;
        ConnectionSpec {
            source: current.source.clone(),
            target: current.target.clone(),
            source_output: self
                .updates
                .source_output
                .clone()
                .or_else(|| current.source_output.clone()),
            target_input: self
                .updates
                .target_input
                .clone()
                .or_else(|| current.target_input.clone()),
            source_index: self.updates.source_index.or(current.source_index),
            target_index: self.updates.target_index.or(current.target_index),
        }
    }
}

/// A single requested mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DiffOperation {
    AddNode { node: Node },
    RemoveNode(NodeSelector),
    UpdateNode(UpdateNode),
    MoveNode(MoveNode),
    EnableNode(NodeSelector),
    DisableNode(NodeSelector),
    AddConnection(ConnectionSpec),
    RemoveConnection(ConnectionSpec),
    UpdateConnection(UpdateConnection),
    UpdateSettings { settings: Map<String, Value> },
    UpdateName { name: String },
    AddTag { tag: String },
    RemoveTag { tag: String },
}

impl DiffOperation {
    /// Returns the operation's kind.
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::AddNode { .. } => OperationKind::AddNode,
            Self::RemoveNode(_) => OperationKind::RemoveNode,
            Self::UpdateNode(_) => OperationKind::UpdateNode,
            Self::MoveNode(_) => OperationKind::MoveNode,
            Self::EnableNode(_) => OperationKind::EnableNode,
            Self::DisableNode(_) => OperationKind::DisableNode,
            Self::AddConnection(_) => OperationKind::AddConnection,
            Self::RemoveConnection(_) => OperationKind::RemoveConnection,
            Self::UpdateConnection(_) => OperationKind::UpdateConnection,
            Self::UpdateSettings { .. } => OperationKind::UpdateSettings,
            Self::UpdateName { .. } => OperationKind::UpdateName,
            Self::AddTag { .. } => OperationKind::AddTag,
            Self::RemoveTag { .. } => OperationKind::RemoveTag,
        }
    }
}

/// An operation as it arrived in a request.
///
/// Payloads that do not parse are kept verbatim so the engine can reject
/// them at their position in the request instead of failing the whole parse.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestedOperation {
    Parsed(DiffOperation),
    Unparsed { raw: Value, reason: String },
}

impl RequestedOperation {
    /// Returns the declared `type`, if the payload carries one.
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Self::Parsed(operation) => Some(operation.kind().into()),
            Self::Unparsed { raw, .. } => raw.get("type").and_then(Value::as_str),
        }
    }

    /// Returns the known kind, if the declared type is supported.
    pub fn kind(&self) -> Option<OperationKind> {
        match self {
            Self::Parsed(operation) => Some(operation.kind()),
            Self::Unparsed { .. } => self.type_name().and_then(|name| name.parse().ok()),
        }
    }

    /// Returns the pass the operation runs in; unknown types run last.
    pub fn phase(&self) -> OperationPhase {
        self.kind()
            .map_or(OperationPhase::Metadata, OperationKind::phase)
    }

    /// Returns the payload in its wire form.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Parsed(operation) => serde_json::to_value(operation).unwrap_or(Value::Null),
            Self::Unparsed { raw, .. } => raw.clone(),
        }
    }
}

impl From<DiffOperation> for RequestedOperation {
    fn from(operation: DiffOperation) -> Self {
        Self::Parsed(operation)
    }
}

impl From<Value> for RequestedOperation {
    fn from(raw: Value) -> Self {
        match serde_json::from_value::<DiffOperation>(raw.clone()) {
            Ok(operation) => Self::Parsed(operation),
            Err(error) => Self::Unparsed {
                raw,
                reason: error.to_string(),
            },
        }
    }
}

impl<'de> Deserialize<'de> for RequestedOperation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from)
    }
}

impl Serialize for RequestedOperation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Parsed(operation) => operation.serialize(serializer),
            Self::Unparsed { raw, .. } => raw.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parses_tagged_operations() {
        let operation: DiffOperation = serde_json::from_value(json!({
            "type": "moveNode",
            "nodeName": "HTTP",
            "position": [100, 200]
        }))
        .expect("deserialization failed");

        assert_eq!(operation.kind(), OperationKind::MoveNode);
        let DiffOperation::MoveNode(payload) = operation else {
            panic!("expected moveNode");
        };
        assert_eq!(payload.selector, NodeSelector::name("HTTP"));
        assert_eq!(payload.position, Position::new(100.0, 200.0));
    }

    #[test]
    fn test_unknown_and_malformed_operations_are_kept() {
        let unknown = RequestedOperation::from(json!({ "type": "explode" }));
        assert_eq!(unknown.type_name(), Some("explode"));
        assert_eq!(unknown.kind(), None);
        assert_eq!(unknown.phase(), OperationPhase::Metadata);

        let malformed = RequestedOperation::from(json!({ "type": "addConnection", "source": "A" }));
        assert_eq!(malformed.kind(), Some(OperationKind::AddConnection));
        assert_eq!(malformed.phase(), OperationPhase::Connection);
        let RequestedOperation::Unparsed { reason, .. } = malformed else {
            panic!("expected unparsed payload");
        };
        assert!(reason.contains("target"));
    }

    #[test]
    fn test_kind_phases() {
        assert_eq!(OperationKind::DisableNode.phase(), OperationPhase::Node);
        assert_eq!(OperationKind::UpdateConnection.phase(), OperationPhase::Connection);
        assert_eq!(OperationKind::RemoveTag.phase(), OperationPhase::Metadata);
        assert_eq!("updateSettings".parse::<OperationKind>(), Ok(OperationKind::UpdateSettings));
        assert_eq!(OperationKind::AddNode.to_string(), "addNode");
    }

    #[test]
    fn test_update_connection_merges_overrides() {
        let update: UpdateConnection = serde_json::from_value(json!({
            "source": "If",
            "target": "Done",
            "sourceIndex": 0,
            "updates": { "sourceIndex": 1 }
        }))
        .expect("deserialization failed");

        let replacement = update.replacement();
        assert_eq!(replacement.source_index, Some(1));
        assert_eq!(replacement.source, "If");
        assert_eq!(replacement.source_output, None);
    }
}
