//! Transactional application of diff requests.

mod connection;
mod metadata;
mod node;

use flowmend_core::workflow::Workflow;

use crate::TRACING_TARGET;
use crate::config::DiffEngineConfig;
use crate::error::OperationError;
use crate::id::{IdGenerator, UuidGenerator};
use crate::operation::{DiffOperation, OperationKind, OperationPhase, RequestedOperation};
use crate::request::{DiffError, DiffRequest, DiffResult};

/// Applies diff requests to private copies of workflows.
///
/// Operations run in three passes (nodes, connections, metadata) whatever
/// their order in the request. The first failing operation aborts the whole
/// request and nothing is returned but the error.
#[derive(Debug, Clone, Default)]
pub struct DiffEngine<G = UuidGenerator> {
    config: DiffEngineConfig,
    ids: G,
}

impl DiffEngine {
    /// Creates an engine with the default limits and random ids.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine with the given limits and random ids.
    pub fn with_config(config: DiffEngineConfig) -> Self {
        Self {
            config,
            ids: UuidGenerator,
        }
    }
}

impl<G: IdGenerator> DiffEngine<G> {
    /// Creates an engine drawing node ids from `ids`.
    pub fn with_id_generator(config: DiffEngineConfig, ids: G) -> Self {
        Self { config, ids }
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &DiffEngineConfig {
        &self.config
    }

    /// Applies `request` to a copy of `workflow`.
    ///
    /// Failures are reported in the result, with the position of the failing
    /// operation in `request.operations`.
    pub fn apply_diff(&self, workflow: &Workflow, request: &DiffRequest) -> DiffResult {
        let total = request.operations.len();
        let limit = self.config.max_operations;
        if total > limit {
            tracing::warn!(
                target: TRACING_TARGET,
                operations = total,
                limit,
                "rejecting diff request over the operation limit"
            );
            return DiffResult::rejected(
                "Too many operations",
                DiffError::request(format!(
                    "Too many operations. Maximum allowed is {limit}, received {total}"
                )),
            );
        }

        let mut working = workflow.clone();
        let mut node_operations = 0;
        for phase in OperationPhase::ORDER {
            let batch: Vec<(usize, &RequestedOperation)> = request
                .operations
                .iter()
                .enumerate()
                .filter(|(_, operation)| operation.phase() == phase)
                .collect();
            if phase == OperationPhase::Node {
                node_operations = batch.len();
            }

            tracing::debug!(
                target: TRACING_TARGET,
                pass = %phase,
                operations = batch.len(),
                "applying diff pass"
            );

            for (index, operation) in batch {
                if let Err(error) = self.apply_operation(&mut working, operation) {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        operation = index,
                        %error,
                        "rejecting diff request"
                    );
                    return DiffResult::rejected(
                        format!("Failed to apply operation {index}"),
                        DiffError::at(index, error.to_string()).with_details(operation.to_value()),
                    );
                }
                tracing::trace!(
                    target: TRACING_TARGET,
                    operation = index,
                    kind = operation.type_name().unwrap_or_default(),
                    "operation applied"
                );
            }
        }

        if request.validate_only {
            tracing::debug!(target: TRACING_TARGET, operations = total, "diff request validated");
            return DiffResult::validated();
        }

        DiffResult::applied(
            working,
            total,
            format!(
                "Successfully applied {total} operations ({node_operations} node operations, {} other operations)",
                total - node_operations
            ),
        )
    }

    fn apply_operation(
        &self,
        workflow: &mut Workflow,
        requested: &RequestedOperation,
    ) -> Result<(), OperationError> {
        let operation = match requested {
            RequestedOperation::Parsed(operation) => operation,
            RequestedOperation::Unparsed { reason, .. } => {
                return Err(match requested.kind() {
                    Some(kind) => OperationError::InvalidOperation {
                        kind,
                        reason: reason.clone(),
                    },
                    None => OperationError::UnknownOperation(
                        requested.type_name().unwrap_or("undefined").to_owned(),
                    ),
                });
            }
        };

        match operation {
            DiffOperation::AddNode { node } => node::add_node(workflow, node, &self.ids),
            DiffOperation::RemoveNode(selector) => node::remove_node(workflow, selector),
            DiffOperation::UpdateNode(update) => node::update_node(workflow, update),
            DiffOperation::MoveNode(update) => node::move_node(workflow, update),
            DiffOperation::EnableNode(selector) => {
                node::set_disabled(workflow, selector, false, OperationKind::EnableNode)
            }
            DiffOperation::DisableNode(selector) => {
                node::set_disabled(workflow, selector, true, OperationKind::DisableNode)
            }
            DiffOperation::AddConnection(spec) => connection::add_connection(workflow, spec),
            DiffOperation::RemoveConnection(spec) => connection::remove_connection(workflow, spec),
            DiffOperation::UpdateConnection(update) => {
                connection::update_connection(workflow, update)
            }
            DiffOperation::UpdateSettings { settings } => {
                metadata::update_settings(workflow, settings);
                Ok(())
            }
            DiffOperation::UpdateName { name } => {
                workflow.name = name.clone();
                Ok(())
            }
            DiffOperation::AddTag { tag } => {
                metadata::add_tag(workflow, tag);
                Ok(())
            }
            DiffOperation::RemoveTag { tag } => {
                metadata::remove_tag(workflow, tag);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use flowmend_core::workflow::{Connection, MAIN, Node};
    use serde_json::{Value, json};

    use super::*;
    use crate::config::DiffEngineConfig;

    /// Hands out `generated-1`, `generated-2`, ...
    #[derive(Debug, Default)]
    pub(crate) struct SequentialIds(AtomicUsize);

    impl IdGenerator for SequentialIds {
        fn generate(&self) -> String {
            format!("generated-{}", self.0.fetch_add(1, Ordering::Relaxed) + 1)
        }
    }

    pub(crate) fn start_http() -> Workflow {
        Workflow::new("fetch")
            .with_node(
                Node::new("1", "Start", "n8n-nodes-base.manualTrigger").with_type_version(1.0),
            )
            .with_node(
                Node::new("2", "HTTP", "n8n-nodes-base.httpRequest")
                    .with_type_version(4.2)
                    .with_position(250.0, 0.0),
            )
            .with_connection("Start", MAIN, 0, Connection::main("HTTP"))
    }

    fn engine() -> DiffEngine<SequentialIds> {
        DiffEngine::with_id_generator(DiffEngineConfig::default(), SequentialIds::default())
    }

    fn request(operations: Value) -> DiffRequest {
        serde_json::from_value(json!({ "operations": operations })).expect("valid request")
    }

    #[test]
    fn test_adds_node_and_connection() {
        let workflow = start_http();
        let result = engine().apply_diff(
            &workflow,
            &request(json!([
                { "type": "addNode", "node": { "name": "Slack", "type": "n8n-nodes-base.slack" } },
                { "type": "addConnection", "source": "Start", "target": "Slack" }
            ])),
        );

        assert!(result.success, "{:?}", result.errors);
        assert_eq!(result.operations_applied, Some(2));
        let updated = result.workflow.expect("workflow");
        assert_eq!(updated.nodes.len(), 3);

        let targets: Vec<&str> = updated.connections["Start"][MAIN][0]
            .iter()
            .flatten()
            .map(|connection| connection.node.as_str())
            .collect();
        assert_eq!(targets, vec!["HTTP", "Slack"]);

        let slack = updated.node_by_name("Slack").expect("slack");
        assert_eq!(slack.id, "generated-1");
        assert_eq!(slack.type_version, Some(1.0));
    }

    #[test]
    fn test_failure_reports_original_index() {
        let workflow = start_http();
        let result = engine().apply_diff(
            &workflow,
            &request(json!([
                { "type": "updateName", "name": "renamed" },
                { "type": "removeNode", "nodeName": "Missing" }
            ])),
        );

        assert!(!result.success);
        assert!(result.workflow.is_none());
        assert!(result.operations_applied.is_none());
        let error = result.first_error().expect("error");
        assert_eq!(error.operation, Some(1));
        assert_eq!(error.message, "Node not found: Missing");
        assert_eq!(error.details.as_ref().map(|d| &d["type"]), Some(&json!("removeNode")));

        assert_eq!(workflow, start_http());
    }

    #[test]
    fn test_later_node_pass_failure_discards_earlier_changes() {
        let workflow = start_http();
        let result = engine().apply_diff(
            &workflow,
            &request(json!([
                { "type": "disableNode", "nodeName": "HTTP" },
                { "type": "addNode", "node": { "name": "Start", "type": "n8n-nodes-base.set" } }
            ])),
        );

        assert!(!result.success);
        assert_eq!(result.errors[0].operation, Some(1));
        assert!(result.errors[0].message.contains("already exists"));
        assert_eq!(workflow.node_by_name("HTTP").and_then(|n| n.disabled), None);
    }

    #[test]
    fn test_connection_before_node_is_reordered() {
        let workflow = start_http();
        let result = engine().apply_diff(
            &workflow,
            &request(json!([
                { "type": "addConnection", "source": "HTTP", "target": "Log" },
                { "type": "addNode", "node": { "name": "Log", "type": "n8n-nodes-base.noOp" } }
            ])),
        );

        assert!(result.success, "{:?}", result.errors);
        let updated = result.workflow.expect("workflow");
        assert!(updated.connections.contains_edge("HTTP", MAIN, 0, &Connection::main("Log")));
        assert_eq!(
            result.message,
            "Successfully applied 2 operations (1 node operations, 1 other operations)"
        );
    }

    #[test]
    fn test_remove_then_add_same_name() {
        let workflow = start_http();
        let result = engine().apply_diff(
            &workflow,
            &request(json!([
                { "type": "removeNode", "nodeName": "HTTP" },
                { "type": "addNode", "node": {
                    "name": "HTTP",
                    "type": "n8n-nodes-base.httpRequest",
                    "typeVersion": 3
                } }
            ])),
        );

        assert!(result.success, "{:?}", result.errors);
        let updated = result.workflow.expect("workflow");
        assert_eq!(updated.nodes.len(), workflow.nodes.len());
        assert_eq!(updated.node_by_name("HTTP").and_then(|n| n.type_version), Some(3.0));
    }

    #[test]
    fn test_remove_node_prunes_connections() {
        let workflow = start_http();
        let result = engine().apply_diff(
            &workflow,
            &request(json!([{ "type": "removeNode", "nodeId": "2" }])),
        );

        let updated = result.workflow.expect("workflow");
        assert!(updated.connections.is_empty());
        let value = serde_json::to_value(&updated).expect("serialization failed");
        assert_eq!(value["connections"], json!({}));
    }

    #[test]
    fn test_too_many_operations() {
        let operations: Vec<Value> = (0..6)
            .map(|i| json!({ "type": "addTag", "tag": format!("t{i}") }))
            .collect();
        let result = engine().apply_diff(&start_http(), &request(Value::Array(operations)));

        assert!(!result.success);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].operation, None);
        assert_eq!(
            result.errors[0].message,
            "Too many operations. Maximum allowed is 5, received 6"
        );
    }

    #[test]
    fn test_operation_limit_is_configurable() {
        let config = DiffEngineConfig::builder()
            .with_max_operations(1usize)
            .build()
            .expect("valid config");
        let engine = DiffEngine::with_id_generator(config, SequentialIds::default());
        let result = engine.apply_diff(
            &start_http(),
            &request(json!([
                { "type": "addTag", "tag": "a" },
                { "type": "addTag", "tag": "b" }
            ])),
        );
        assert_eq!(result.errors[0].operation, None);
    }

    #[test]
    fn test_validate_only() {
        let result = engine().apply_diff(
            &start_http(),
            &request(json!([{ "type": "updateName", "name": "renamed" }])).validate_only(),
        );

        assert!(result.success);
        assert!(result.workflow.is_none());
        assert!(result.message.starts_with("Validation successful"));

        let invalid = engine().apply_diff(
            &start_http(),
            &request(json!([{ "type": "moveNode", "nodeName": "Nope", "position": [0, 0] }]))
                .validate_only(),
        );
        assert!(!invalid.success);
    }

    #[test]
    fn test_unknown_operation_type() {
        let result = engine().apply_diff(
            &start_http(),
            &request(json!([
                { "type": "updateName", "name": "renamed" },
                { "type": "explode" }
            ])),
        );

        let error = result.first_error().expect("error");
        assert_eq!(error.operation, Some(1));
        assert_eq!(error.message, "Unknown operation type: explode");
        assert_eq!(error.details, Some(json!({ "type": "explode" })));
    }

    #[test]
    fn test_malformed_operation_runs_in_its_pass() {
        let result = engine().apply_diff(
            &start_http(),
            &request(json!([
                { "type": "addConnection", "source": "Start" },
                { "type": "removeNode", "nodeName": "Missing" }
            ])),
        );

        let error = result.first_error().expect("error");
        assert_eq!(error.operation, Some(1));

        let result = engine().apply_diff(
            &start_http(),
            &request(json!([{ "type": "addConnection", "source": "Start" }])),
        );
        let error = result.first_error().expect("error");
        assert_eq!(error.operation, Some(0));
        assert!(error.message.starts_with("Invalid addConnection operation: "));
    }

    #[test]
    fn test_metadata_operations() {
        let result = engine().apply_diff(
            &start_http(),
            &request(json!([
                { "type": "updateSettings", "settings": { "timezone": "UTC" } },
                { "type": "updateName", "name": "renamed" },
                { "type": "addTag", "tag": "prod" },
                { "type": "addTag", "tag": "prod" },
                { "type": "removeTag", "tag": "missing" }
            ])),
        );

        assert!(result.success, "{:?}", result.errors);
        let updated = result.workflow.expect("workflow");
        assert_eq!(updated.name, "renamed");
        assert_eq!(updated.tags, Some(vec!["prod".to_string()]));
        assert_eq!(
            updated.settings.as_ref().and_then(|s| s.get("timezone")),
            Some(&json!("UTC"))
        );
    }
}
