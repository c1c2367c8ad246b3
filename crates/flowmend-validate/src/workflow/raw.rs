//! Lenient reading of workflow JSON on the validation path.
//!
//! Entries that do not fit the workflow model are reported as findings and
//! left out, so one malformed node or edge does not stop the run.

use std::collections::HashSet;

use flowmend_core::workflow::{Node, Workflow};
use serde_json::{Map, Value, json};

use super::result::{Finding, FindingCategory, Findings};
use crate::TRACING_TARGET_WORKFLOW;

/// Top-level fields with a fixed shape, checked before the workflow is read.
const SHAPED_FIELDS: [&str; 4] = ["id", "name", "settings", "tags"];

/// A workflow read from raw JSON.
#[derive(Debug)]
pub(super) struct RawWorkflow {
    pub workflow: Workflow,
    /// Names of nodes whose unreadable `typeVersion` was already reported.
    pub invalid_versions: HashSet<String>,
}

/// Reads a workflow whose `nodes` is an array and `connections` an object.
///
/// Returns `None` only when the remaining top-level value cannot be read,
/// after reporting it.
pub(super) fn read(value: &Value, findings: &mut Findings) -> Option<RawWorkflow> {
    let mut value = value.clone();
    let object = value.as_object_mut()?;

    for field in SHAPED_FIELDS {
        if object.get(field).is_some_and(|v| !has_expected_shape(field, v)) {
            object.remove(field);
            findings.warning(Finding::new(
                FindingCategory::Structure,
                format!("Workflow field '{field}' has an unexpected type and was ignored"),
            ));
        }
    }

    let mut invalid_versions = HashSet::new();
    let nodes = match object.insert("nodes".into(), Value::Array(Vec::new())) {
        Some(Value::Array(entries)) => read_nodes(entries, findings, &mut invalid_versions),
        _ => Vec::new(),
    };
    if let Some(Value::Object(connections)) = object.get_mut("connections") {
        retain_readable_edges(connections, findings);
    }

    match serde_json::from_value::<Workflow>(value) {
        Ok(mut workflow) => {
            workflow.nodes = nodes;
            Some(RawWorkflow {
                workflow,
                invalid_versions,
            })
        }
        Err(error) => {
            findings.error(Finding::new(
                FindingCategory::Structure,
                format!("Workflow could not be read: {error}"),
            ));
            None
        }
    }
}

fn has_expected_shape(field: &str, value: &Value) -> bool {
    match field {
        "name" => value.is_string(),
        "settings" => value.is_null() || value.is_object(),
        "tags" => {
            value.is_null()
                || value
                    .as_array()
                    .is_some_and(|tags| tags.iter().all(Value::is_string))
        }
        _ => value.is_null() || value.is_string(),
    }
}

fn read_nodes(
    entries: Vec<Value>,
    findings: &mut Findings,
    invalid_versions: &mut HashSet<String>,
) -> Vec<Node> {
    let mut nodes = Vec::with_capacity(entries.len());

    for (position, entry) in entries.into_iter().enumerate() {
        let Value::Object(mut fields) = entry else {
            findings.error(
                Finding::new(
                    FindingCategory::Structure,
                    format!("Node at index {position} is not an object"),
                )
                .with_details(json!({ "index": position })),
            );
            continue;
        };
        let Some(name) = fields.get("name").and_then(Value::as_str).map(str::to_owned) else {
            findings.error(
                Finding::new(
                    FindingCategory::Structure,
                    format!("Node at index {position} is missing a name"),
                )
                .with_details(json!({ "index": position })),
            );
            continue;
        };
        if !fields.get("type").is_some_and(Value::is_string) {
            findings.error(node_finding(
                &fields,
                &name,
                format!("Node \"{name}\" is missing a type"),
            ));
            continue;
        }

        if let Some(version) = fields
            .get("typeVersion")
            .filter(|version| !version.is_number() && !version.is_null())
        {
            let message = format!("Invalid typeVersion: {version}. Must be a positive number");
            findings.error(node_finding(&fields, &name, message));
            fields.remove("typeVersion");
            invalid_versions.insert(name.clone());
        }

        let finding = node_finding(&fields, &name, String::new());
        match serde_json::from_value::<Node>(Value::Object(fields)) {
            Ok(node) => nodes.push(node),
            Err(error) => {
                tracing::debug!(
                    target: TRACING_TARGET_WORKFLOW,
                    node = %name,
                    error = %error,
                    "skipping unreadable node"
                );
                findings.error(Finding {
                    message: format!("Node \"{name}\" could not be read: {error}"),
                    ..finding
                });
            }
        }
    }

    nodes
}

fn node_finding(fields: &Map<String, Value>, name: &str, message: String) -> Finding {
    let mut finding = Finding::new(FindingCategory::Node, message).with_node_name(name);
    finding.node_id = fields
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(str::to_owned);
    finding
}

/// Drops sources, channels, slots and edges that do not fit the connection
/// model, reporting each one.
fn retain_readable_edges(connections: &mut Map<String, Value>, findings: &mut Findings) {
    connections.retain(|source, channels| {
        let Some(channels) = channels.as_object_mut() else {
            findings.error(
                Finding::new(
                    FindingCategory::Connection,
                    format!("Connections of \"{source}\" must map channel names to output slots"),
                )
                .with_details(json!({ "source": source })),
            );
            findings.statistics.invalid_connections += 1;
            return false;
        };

        channels.retain(|channel, slots| {
            let Some(slots) = slots.as_array_mut() else {
                findings.error(
                    Finding::new(
                        FindingCategory::Connection,
                        format!(
                            "Connections of \"{source}\" on channel \"{channel}\" must be a list of output slots"
                        ),
                    )
                    .with_node_name(source.as_str())
                    .with_details(json!({ "source": source, "channel": channel })),
                );
                findings.statistics.invalid_connections += 1;
                return false;
            };

            for (output_index, slot) in slots.iter_mut().enumerate() {
                let details = json!({
                    "source": source,
                    "channel": channel,
                    "outputIndex": output_index,
                });
                let edges = match slot {
                    Value::Null => continue,
                    Value::Array(edges) => edges,
                    other => {
                        findings.error(
                            Finding::new(
                                FindingCategory::Connection,
                                format!(
                                    "Output slot {output_index} of \"{source}\" must be a list of connections"
                                ),
                            )
                            .with_node_name(source.as_str())
                            .with_details(details),
                        );
                        findings.statistics.invalid_connections += 1;
                        *other = Value::Null;
                        continue;
                    }
                };

                edges.retain(|edge| match edge_problem(edge) {
                    None => true,
                    Some(problem) => {
                        findings.error(
                            Finding::new(
                                FindingCategory::Connection,
                                format!("Connection from \"{source}\" {problem}"),
                            )
                            .with_node_name(source.as_str())
                            .with_details(details.clone()),
                        );
                        findings.statistics.invalid_connections += 1;
                        false
                    }
                });
            }
            true
        });
        true
    });
}

fn edge_problem(edge: &Value) -> Option<&'static str> {
    let Some(edge) = edge.as_object() else {
        return Some("is not an object");
    };
    if !edge.get("node").is_some_and(Value::is_string) {
        return Some("is missing a target node");
    }
    if !edge.get("type").is_some_and(Value::is_string) {
        return Some("is missing type");
    }
    let valid_index = |index: &Value| index.as_u64().is_some_and(|i| u32::try_from(i).is_ok());
    if edge.get("index").is_some_and(|index| !valid_index(index)) {
        return Some("has an invalid index");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_problems() {
        assert_eq!(edge_problem(&json!({ "node": "B", "type": "main", "index": 0 })), None);
        assert_eq!(edge_problem(&json!({ "node": "B", "type": "main" })), None);
        assert_eq!(edge_problem(&json!("B")), Some("is not an object"));
        assert_eq!(edge_problem(&json!({ "type": "main" })), Some("is missing a target node"));
        assert_eq!(edge_problem(&json!({ "node": "B", "index": 0 })), Some("is missing type"));
        assert_eq!(
            edge_problem(&json!({ "node": "B", "type": "main", "index": -1 })),
            Some("has an invalid index")
        );
    }

    #[test]
    fn test_mistyped_workflow_fields_are_ignored() {
        let mut findings = Findings::new();
        let raw = read(
            &json!({ "name": 7, "tags": "x", "nodes": [], "connections": {} }),
            &mut findings,
        )
        .expect("readable workflow");
        let result = findings.finish();

        assert_eq!(raw.workflow.name, "");
        assert_eq!(raw.workflow.tags, None);
        assert_eq!(result.warnings.len(), 2);
        assert!(result.has_warning_containing("Workflow field 'name' has an unexpected type"));
    }

    #[test]
    fn test_unreadable_slots_are_cleared() {
        let mut findings = Findings::new();
        let raw = read(
            &json!({
                "nodes": [],
                "connections": {
                    "A": { "main": [null, "B", [{ "node": "B", "type": "main" }]] },
                    "C": 3
                }
            }),
            &mut findings,
        )
        .expect("readable workflow");
        let result = findings.finish();

        assert_eq!(raw.workflow.connections.edge_count(), 1);
        assert!(!raw.workflow.connections.contains_key("C"));
        assert!(result.has_error_containing("Output slot 1 of \"A\" must be a list of connections"));
        assert_eq!(result.statistics.invalid_connections, 2);
    }
}
