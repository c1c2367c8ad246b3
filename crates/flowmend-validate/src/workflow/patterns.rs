//! Best-practice checks and summary suggestions.

use flowmend_core::node_type::{is_agent_type, is_webhook_type, normalize};
use flowmend_core::workflow::{AI_TOOL, ERROR, Workflow};
use serde_json::Value;

use super::index::WorkflowIndex;
use super::result::{Finding, FindingCategory, Findings};

const ERROR_HANDLING_MIN_NODES: usize = 3;
const MAX_CHAIN_HOPS: usize = 10;
const MAX_NODE_EXPRESSIONS: usize = 5;
const SUB_WORKFLOW_MIN_NODES: usize = 20;

const COMMUNITY_TOOL_ENV: &str = "N8N_COMMUNITY_PACKAGES_ALLOW_TOOL_USAGE";

pub(super) fn check_patterns(workflow: &Workflow, index: &WorkflowIndex<'_>, findings: &mut Findings) {
    if workflow.nodes.len() > ERROR_HANDLING_MIN_NODES
        && !workflow.connections.has_channel_edges(ERROR)
    {
        findings.warning(Finding::new(
            FindingCategory::Pattern,
            "Consider adding error handling to your workflow",
        ));
    }

    let hops = index.longest_main_chain();
    if hops > MAX_CHAIN_HOPS {
        findings.warning(Finding::new(
            FindingCategory::Pattern,
            format!(
                "Long linear chain detected ({hops} hops). Consider breaking it into sub-workflows"
            ),
        ));
    }

    for node in workflow.enabled_nodes() {
        for (credential_type, reference) in node.credentials.iter().flatten() {
            if !reference.is_resolved() {
                findings.warning(
                    Finding::new(
                        FindingCategory::Pattern,
                        format!(
                            "Node \"{}\" references credential \"{credential_type}\" without an id",
                            node.name
                        ),
                    )
                    .with_node(node),
                );
            }
        }

        if is_agent_type(&node.node_type) {
            let tools: Vec<&str> = workflow
                .connections
                .edges()
                .filter(|edge| edge.channel == AI_TOOL && edge.connection.node == node.name)
                .map(|edge| edge.source)
                .collect();
            if tools.is_empty() {
                findings.warning(
                    Finding::new(
                        FindingCategory::Pattern,
                        format!(
                            "AI Agent \"{}\" has no tools connected. Consider adding tools to extend its capabilities",
                            node.name
                        ),
                    )
                    .with_node(node),
                );
            }

            let community: Vec<&str> = tools
                .into_iter()
                .filter(|tool| {
                    index
                        .node(tool)
                        .is_some_and(|tool| !normalize::is_canonical(&tool.node_type))
                })
                .collect();
            if !community.is_empty() {
                findings.warning(
                    Finding::new(
                        FindingCategory::Pattern,
                        format!(
                            "AI Agent \"{}\" uses community nodes as tools: {}",
                            node.name,
                            community.join(", ")
                        ),
                    )
                    .with_node(node),
                );
                findings.suggest(format!(
                    "Community nodes used as AI tools require the environment variable {COMMUNITY_TOOL_ENV}=true"
                ));
            }
        }

        let expressions: usize = node.parameters.values().map(count_expressions).sum();
        if expressions > MAX_NODE_EXPRESSIONS {
            findings.suggest(format!(
                "Node \"{}\" has {expressions} expressions. Consider moving complex logic into a Code node",
                node.name
            ));
        }
    }
}

pub(super) fn add_suggestions(workflow: &Workflow, findings: &mut Findings) {
    if findings.statistics.trigger_nodes == 0 {
        findings.suggest(
            "Add a trigger node (e.g. Webhook, Schedule Trigger or Manual Trigger) to start the workflow",
        );
    }

    if findings.has_errors(FindingCategory::Connection) {
        findings.suggest(
            r#"Example connection structure: connections: { "Manual Trigger": { "main": [[{ "node": "Set", "type": "main", "index": 0 }]] } }"#,
        );
        findings.suggest("Connections must use node names, not node IDs");
    }

    if !workflow.connections.has_channel_edges(ERROR) {
        findings.suggest(
            "Add error handling using the error output of nodes or an Error Trigger workflow",
        );
    }

    if workflow.nodes.len() > SUB_WORKFLOW_MIN_NODES {
        findings.suggest(
            "Consider breaking this workflow into smaller sub-workflows for better maintainability",
        );
    }

    if let [node] = workflow.nodes.as_slice()
        && is_webhook_type(&node.node_type)
    {
        findings.suggest(
            "A webhook-only workflow responds with a default message. Add nodes after the webhook to process requests",
        );
    }
}

/// Counts `{{` openings anywhere in a parameter value.
fn count_expressions(value: &Value) -> usize {
    match value {
        Value::String(s) => s.matches("{{").count(),
        Value::Array(items) => items.iter().map(count_expressions).sum(),
        Value::Object(map) => map.values().map(count_expressions).sum(),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_count_expressions() {
        let value = json!({
            "a": "={{ $json.a }} and {{ $json.b }}",
            "b": [{ "c": "{{ 1 }}" }, "plain"],
            "d": 3
        });
        assert_eq!(count_expressions(&value), 3);
    }
}
