//! Per-operation failure reasons.

use thiserror::Error;

use crate::operation::OperationKind;

/// Why a single diff operation could not be applied.
///
/// Rendered into [`DiffError::message`](crate::DiffError) when a request is
/// rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationError {
    #[error("Unknown operation type: {0}")]
    UnknownOperation(String),

    #[error("Invalid {kind} operation: {reason}")]
    InvalidOperation { kind: OperationKind, reason: String },

    #[error("{0} operation requires nodeId or nodeName")]
    MissingSelector(OperationKind),

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Node with name \"{0}\" already exists")]
    DuplicateNodeName(String),

    #[error(
        "Invalid node type \"{node_type}\": node types must include a package prefix. \
         Use \"{suggestion}\" instead"
    )]
    MissingPackagePrefix {
        node_type: String,
        suggestion: String,
    },

    #[error("Invalid node type \"{node_type}\": deprecated prefix. Use \"{canonical}\" instead")]
    DeprecatedPrefix {
        node_type: String,
        canonical: String,
    },

    #[error("Cannot update \"{path}\": {reason}")]
    InvalidUpdate { path: String, reason: String },

    #[error("Source node not found: {0}")]
    SourceNotFound(String),

    #[error("Target node not found: {0}")]
    TargetNotFound(String),

    #[error("Connection already exists from \"{source_node}\" to \"{target_node}\" on output \"{channel}\"")]
    DuplicateConnection {
        source_node: String,
        channel: String,
        target_node: String,
    },

    #[error("No connections found from \"{0}\"")]
    NoConnections(String),

    #[error("No connection found from \"{source_node}\" to \"{target_node}\" on output \"{channel}\"")]
    ConnectionNotFound {
        source_node: String,
        channel: String,
        target_node: String,
    },
}
