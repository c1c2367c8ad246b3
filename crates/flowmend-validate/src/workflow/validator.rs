//! Phase orchestration for workflow validation.

use std::collections::HashSet;

use flowmend_core::node_type::{is_agent_type, is_trigger_type, normalize};
use flowmend_core::workflow::{AI_TOOL, Node, Workflow};
use flowmend_core::{Error, Result};
use serde_json::{Value, json};

use super::index::WorkflowIndex;
use super::options::ValidationOptions;
use super::patterns;
use super::raw::{self, RawWorkflow};
use super::result::{Finding, FindingCategory, Findings, ValidationResult};
use crate::TRACING_TARGET_WORKFLOW;
use crate::config::{ConfigIssue, ConfigValidator, ModeAwareConfigValidator};
use crate::expression::{ExpressionContext, validate_node_expressions};
use crate::graph::NameGraph;
use crate::lookup::NodeTypeLookup;

/// Validates workflows against node-type metadata.
///
/// Generic over the metadata source and the per-node configuration
/// validator, both of which are borrowed for the lifetime of the run.
#[derive(Debug, Clone)]
pub struct WorkflowValidator<L, C = ModeAwareConfigValidator> {
    lookup: L,
    config_validator: C,
}

impl<L: NodeTypeLookup> WorkflowValidator<L> {
    /// Creates a validator using the built-in configuration rules.
    pub fn new(lookup: L) -> Self {
        Self::with_config_validator(lookup, ModeAwareConfigValidator::new())
    }
}

impl<L, C> WorkflowValidator<L, C>
where
    L: NodeTypeLookup,
    C: ConfigValidator,
{
    /// Creates a validator with a custom per-node configuration validator.
    pub fn with_config_validator(lookup: L, config_validator: C) -> Self {
        Self {
            lookup,
            config_validator,
        }
    }

    /// Validates a workflow given as raw JSON.
    ///
    /// A `connections` value that is missing or not an object is reported as
    /// a fatal structural error. Nodes and edges that do not fit the workflow
    /// model are reported as findings and left out of the remaining phases.
    ///
    /// # Errors
    ///
    /// Returns a precondition error if `nodes` is absent or not an array.
    pub fn validate_value(
        &self,
        value: &Value,
        options: &ValidationOptions,
    ) -> Result<ValidationResult> {
        let Some(nodes) = value.get("nodes").and_then(Value::as_array) else {
            return Err(Error::precondition().with_message("workflow must have a nodes array"));
        };

        let mut findings = Findings::new();
        findings.statistics.total_nodes = nodes.len();
        if !value.get("connections").is_some_and(Value::is_object) {
            if nodes.is_empty() {
                findings.error(Finding::new(
                    FindingCategory::Structure,
                    "Workflow must have at least one node",
                ));
            }
            findings.error(Finding::new(
                FindingCategory::Structure,
                "Workflow must have a connections object",
            ));
            return Ok(findings.finish());
        }

        let Some(RawWorkflow {
            workflow,
            invalid_versions,
        }) = raw::read(value, &mut findings)
        else {
            return Ok(findings.finish());
        };
        Ok(self.run(&workflow, options, findings, &invalid_versions))
    }

    /// Validates a workflow, reporting every problem found.
    pub fn validate(&self, workflow: &Workflow, options: &ValidationOptions) -> ValidationResult {
        let mut findings = Findings::new();
        findings.statistics.total_nodes = workflow.nodes.len();
        self.run(workflow, options, findings, &HashSet::new())
    }

    /// Runs every phase. Version checks are skipped for the nodes named in
    /// `invalid_versions`, whose `typeVersion` was already reported.
    fn run(
        &self,
        workflow: &Workflow,
        options: &ValidationOptions,
        mut findings: Findings,
        invalid_versions: &HashSet<String>,
    ) -> ValidationResult {
        findings.statistics.enabled_nodes = workflow.enabled_nodes().count();

        if !check_structure(workflow, &mut findings) {
            return findings.finish();
        }
        let index = WorkflowIndex::new(workflow);

        classify_triggers(workflow, &mut findings);
        if options.validate_connections {
            check_connections(workflow, &index, &mut findings);
        }
        check_cycles(workflow, &index, &mut findings);
        tracing::debug!(
            target: TRACING_TARGET_WORKFLOW,
            errors = findings.error_count(),
            warnings = findings.warning_count(),
            "structural phases complete"
        );

        if options.validate_nodes {
            for node in workflow.enabled_nodes() {
                let check_version = !invalid_versions.contains(&node.name);
                self.validate_node(node, options, check_version, &mut findings);
            }
        }
        if options.validate_expressions {
            check_expressions(workflow, &index, &mut findings);
        }

        patterns::check_patterns(workflow, &index, &mut findings);
        patterns::add_suggestions(workflow, &mut findings);

        let result = findings.finish();
        tracing::debug!(
            target: TRACING_TARGET_WORKFLOW,
            valid = result.valid,
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            nodes = result.statistics.total_nodes,
            "validated workflow"
        );
        result
    }

    fn validate_node(
        &self,
        node: &Node,
        options: &ValidationOptions,
        check_version: bool,
        findings: &mut Findings,
    ) {
        tracing::trace!(
            target: TRACING_TARGET_WORKFLOW,
            node = %node.name,
            node_type = %node.node_type,
            "validating node"
        );

        let metadata = match self.lookup.resolve(&node.node_type) {
            Ok(Some((_, metadata))) => metadata,
            Ok(None) => {
                findings.error(
                    Finding::new(FindingCategory::Node, unknown_type_message(&node.node_type))
                        .with_node(node),
                );
                return;
            }
            Err(error) => {
                node_failure(node, &error, findings);
                return;
            }
        };

        if let Some(canonical) = normalize::deprecated_alias(&node.node_type) {
            findings.warning(
                Finding::new(
                    FindingCategory::Node,
                    format!(
                        "Node type \"{}\" uses a deprecated prefix. Use \"{canonical}\" instead",
                        node.node_type
                    ),
                )
                .with_node(node),
            );
        }

        if metadata.is_versioned && check_version {
            check_type_version(node, metadata.version, findings);
        }

        let result = match self.config_validator.validate_with_mode(
            &node.node_type,
            &node.parameters,
            &metadata.properties,
            options.mode,
            options.profile,
        ) {
            Ok(result) => result,
            Err(error) => {
                node_failure(node, &error, findings);
                return;
            }
        };
        for issue in &result.errors {
            findings.error(config_finding(node, issue));
        }
        for issue in &result.warnings {
            findings.warning(config_finding(node, issue));
        }
    }
}

/// Runs the fatal checks. Returns `false` when the run must stop.
fn check_structure(workflow: &Workflow, findings: &mut Findings) -> bool {
    if workflow.nodes.is_empty() {
        findings.error(Finding::new(
            FindingCategory::Structure,
            "Workflow must have at least one node",
        ));
        return false;
    }

    let mut names = HashSet::new();
    let mut ids = HashSet::new();
    for node in &workflow.nodes {
        if !names.insert(node.name.as_str()) {
            findings.error(
                Finding::new(
                    FindingCategory::Structure,
                    format!("Duplicate node name: \"{}\"", node.name),
                )
                .with_node(node),
            );
        }
        if !node.id.is_empty() && !ids.insert(node.id.as_str()) {
            findings.error(
                Finding::new(
                    FindingCategory::Structure,
                    format!("Duplicate node ID: \"{}\"", node.id),
                )
                .with_node(node),
            );
        }
    }

    if let [node] = workflow.nodes.as_slice() {
        if !is_trigger_type(&node.node_type) {
            findings.error(
                Finding::new(
                    FindingCategory::Structure,
                    "Single-node workflows are only valid for trigger nodes. Add at least one more connected node to create a functional workflow",
                )
                .with_node(node),
            );
        }
    } else if findings.statistics.enabled_nodes > 0 && workflow.connections.is_empty() {
        findings.error(Finding::new(
            FindingCategory::Structure,
            "Multi-node workflow has no connections. Nodes must be connected to create a workflow",
        ));
    }

    true
}

fn classify_triggers(workflow: &Workflow, findings: &mut Findings) {
    let triggers = workflow
        .enabled_nodes()
        .filter(|node| is_trigger_type(&node.node_type))
        .count();
    findings.statistics.trigger_nodes = triggers;
    if triggers == 0 {
        findings.warning(Finding::new(
            FindingCategory::Structure,
            "Workflow has no trigger nodes. It can only be executed manually or from another workflow",
        ));
    }
}

fn check_connections(workflow: &Workflow, index: &WorkflowIndex<'_>, findings: &mut Findings) {
    let mut connected: HashSet<&str> = HashSet::new();

    for (source, channels) in workflow.connections.iter() {
        if index.node(source).is_none() {
            let message = match index.node_by_id(source) {
                Some(node) => format!(
                    "Connection uses node ID \"{source}\" instead of node name \"{}\". Connections must reference node names",
                    node.name
                ),
                None => format!("Connection from non-existent node: \"{source}\""),
            };
            findings.error(
                Finding::new(FindingCategory::Connection, message)
                    .with_details(json!({ "source": source })),
            );
            findings.statistics.invalid_connections += 1;
            continue;
        }

        for (channel, slots) in channels {
            for (output_index, slot) in slots.iter().enumerate() {
                for connection in slot.iter().flatten() {
                    connected.insert(source);
                    let target = connection.node.as_str();
                    let details = json!({
                        "source": source,
                        "channel": channel,
                        "outputIndex": output_index,
                        "target": target,
                    });

                    let Some(target_node) = index.node(target) else {
                        let message = match index.node_by_id(target) {
                            Some(node) => format!(
                                "Connection target uses node ID \"{target}\" instead of node name \"{}\" (from \"{source}\")",
                                node.name
                            ),
                            None => format!(
                                "Connection to non-existent node: \"{target}\" (from \"{source}\")"
                            ),
                        };
                        findings.error(
                            Finding::new(FindingCategory::Connection, message)
                                .with_node_name(source)
                                .with_details(details),
                        );
                        findings.statistics.invalid_connections += 1;
                        continue;
                    };

                    findings.statistics.valid_connections += 1;
                    connected.insert(target);

                    if !target_node.is_enabled() {
                        findings.warning(
                            Finding::new(
                                FindingCategory::Connection,
                                format!(
                                    "Connection to disabled node: \"{target}\" (from \"{source}\")"
                                ),
                            )
                            .with_node(target_node)
                            .with_details(details.clone()),
                        );
                    }
                    if channel == AI_TOOL && !is_agent_type(&target_node.node_type) {
                        findings.warning(
                            Finding::new(
                                FindingCategory::Connection,
                                format!(
                                    "Tool connection from \"{source}\" targets \"{target}\", which is not an AI agent"
                                ),
                            )
                            .with_node(target_node)
                            .with_details(details),
                        );
                    }
                }
            }
        }
    }

    if workflow.nodes.len() < 2 {
        return;
    }
    for node in workflow.enabled_nodes() {
        if !connected.contains(node.name.as_str()) && !is_trigger_type(&node.node_type) {
            findings.warning(
                Finding::new(
                    FindingCategory::Connection,
                    format!("Node \"{}\" is not connected to any other nodes", node.name),
                )
                .with_node(node),
            );
        }
    }
}

fn check_cycles(workflow: &Workflow, index: &WorkflowIndex<'_>, findings: &mut Findings) {
    let mut graph = NameGraph::new();
    for node in &workflow.nodes {
        graph.add_node(&node.name);
    }
    for edge in workflow.connections.edges() {
        if index.node(edge.source).is_some() && index.node(&edge.connection.node).is_some() {
            graph.add_edge(edge.source, &edge.connection.node);
        }
    }

    for cycle in graph.find_cycles() {
        findings.error(
            Finding::new(
                FindingCategory::Cycle,
                format!(
                    "Workflow contains a cycle (infinite loop): {}",
                    cycle.join(" -> ")
                ),
            )
            .with_details(json!({ "cycle": cycle })),
        );
    }
}

fn check_expressions(workflow: &Workflow, index: &WorkflowIndex<'_>, findings: &mut Findings) {
    let names: Vec<&str> = workflow.nodes.iter().map(|node| node.name.as_str()).collect();

    for node in workflow.enabled_nodes() {
        let context = ExpressionContext::new(node.name.as_str())
            .with_available_nodes(index.upstream_of(&node.name))
            .with_workflow_nodes(names.iter().copied())
            .with_input_data(index.has_incoming(&node.name));
        let result = validate_node_expressions(&node.parameters, &context);

        findings.statistics.expressions_validated += result.used_variables.len();
        for error in result.errors {
            findings.error(
                Finding::new(FindingCategory::Expression, format!("Expression error: {error}"))
                    .with_node(node),
            );
        }
        for warning in result.warnings {
            findings.warning(
                Finding::new(
                    FindingCategory::Expression,
                    format!("Expression warning: {warning}"),
                )
                .with_node(node),
            );
        }
    }
}

fn check_type_version(node: &Node, latest: Option<f64>, findings: &mut Findings) {
    let finding = |message: String| Finding::new(FindingCategory::Node, message).with_node(node);
    let missing_version = |latest: Option<f64>| {
        finding(format!(
            "Missing required property 'typeVersion'. Add typeVersion: {}",
            latest.unwrap_or(1.0)
        ))
    };

    match node.type_version {
        // Zero is treated as absent, not as an invalid version.
        None => findings.error(missing_version(latest)),
        Some(version) if version == 0.0 => findings.error(missing_version(latest)),
        Some(version) if version < 0.0 => findings.error(finding(format!(
            "Invalid typeVersion: {version}. Must be a positive number"
        ))),
        Some(version) => match latest {
            Some(latest) if version > latest => findings.error(finding(format!(
                "typeVersion {version} exceeds maximum supported version {latest}"
            ))),
            Some(latest) if version < latest => findings.warning(finding(format!(
                "Outdated typeVersion: {version}. Latest is {latest}"
            ))),
            _ => {}
        },
    }
}

fn unknown_type_message(node_type: &str) -> String {
    if let Some(canonical) = normalize::deprecated_alias(node_type) {
        format!("Unknown node type: \"{node_type}\". Use \"{canonical}\" instead")
    } else if !normalize::has_package_prefix(node_type) {
        format!(
            "Unknown node type: \"{node_type}\". Node types need a package prefix, e.g. \"{}{node_type}\"",
            normalize::BASE_PREFIX
        )
    } else {
        format!("Unknown node type: \"{node_type}\"")
    }
}

fn config_finding(node: &Node, issue: &ConfigIssue) -> Finding {
    let mut finding = Finding::new(FindingCategory::Node, issue.message.clone()).with_node(node);
    finding.details = serde_json::to_value(issue).ok();
    finding
}

fn node_failure(node: &Node, error: &Error, findings: &mut Findings) {
    tracing::warn!(
        target: TRACING_TARGET_WORKFLOW,
        node = %node.name,
        error = %error,
        "node failed to validate"
    );
    findings.error(
        Finding::new(
            FindingCategory::Node,
            format!("Failed to validate node: {error}"),
        )
        .with_node(node),
    );
}
