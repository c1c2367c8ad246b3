//! Findings and results of a workflow validation run.

use flowmend_core::workflow::Node;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{AsRefStr, Display};

/// Phase family a finding belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(AsRefStr, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FindingCategory {
    Structure,
    Connection,
    Cycle,
    Node,
    Expression,
    Pattern,
}

/// A single error or warning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub category: FindingCategory,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl Finding {
    pub fn new(category: FindingCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            node_name: None,
            node_id: None,
            details: None,
        }
    }

    /// Attributes the finding to a node.
    pub fn with_node(mut self, node: &Node) -> Self {
        self.node_name = Some(node.name.clone());
        self.node_id = Some(node.id.clone()).filter(|id| !id.is_empty());
        self
    }

    /// Attributes the finding to a node known only by name.
    pub fn with_node_name(mut self, name: impl Into<String>) -> Self {
        self.node_name = Some(name.into());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Counters reported alongside the findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_nodes: usize,
    pub enabled_nodes: usize,
    pub trigger_nodes: usize,
    pub valid_connections: usize,
    pub invalid_connections: usize,
    /// Sum of the distinct variables used by each node's expressions.
    pub expressions_validated: usize,
}

/// Outcome of a workflow validation run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// `true` when no error was reported.
    pub valid: bool,
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
    pub suggestions: Vec<String>,
    pub statistics: Statistics,
}

impl ValidationResult {
    /// Returns connection and cycle errors and warnings.
    pub fn connection_findings(&self) -> impl Iterator<Item = &Finding> {
        self.findings().filter(|finding| {
            matches!(
                finding.category,
                FindingCategory::Connection | FindingCategory::Cycle
            )
        })
    }

    /// Returns expression errors and warnings.
    pub fn expression_findings(&self) -> impl Iterator<Item = &Finding> {
        self.findings()
            .filter(|finding| finding.category == FindingCategory::Expression)
    }

    /// Returns errors followed by warnings.
    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.errors.iter().chain(&self.warnings)
    }

    /// Returns whether an error message contains `needle`.
    pub fn has_error_containing(&self, needle: &str) -> bool {
        self.errors.iter().any(|error| error.message.contains(needle))
    }

    /// Returns whether a warning message contains `needle`.
    pub fn has_warning_containing(&self, needle: &str) -> bool {
        self.warnings
            .iter()
            .any(|warning| warning.message.contains(needle))
    }
}

/// Accumulator threaded through the validation phases.
#[derive(Debug, Default)]
pub(crate) struct Findings {
    errors: Vec<Finding>,
    warnings: Vec<Finding>,
    suggestions: Vec<String>,
    pub statistics: Statistics,
}

impl Findings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, finding: Finding) {
        self.errors.push(finding);
    }

    pub fn warning(&mut self, finding: Finding) {
        self.warnings.push(finding);
    }

    pub fn suggest(&mut self, suggestion: impl Into<String>) {
        let suggestion = suggestion.into();
        if !self.suggestions.contains(&suggestion) {
            self.suggestions.push(suggestion);
        }
    }

    pub fn has_errors(&self, category: FindingCategory) -> bool {
        self.errors.iter().any(|error| error.category == category)
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    pub fn finish(self) -> ValidationResult {
        ValidationResult {
            valid: self.errors.is_empty(),
            errors: self.errors,
            warnings: self.warnings,
            suggestions: self.suggestions,
            statistics: self.statistics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filtered_views() {
        let mut findings = Findings::new();
        findings.error(Finding::new(FindingCategory::Connection, "dangling"));
        findings.error(Finding::new(FindingCategory::Cycle, "loop"));
        findings.warning(Finding::new(FindingCategory::Expression, "upstream"));
        findings.warning(Finding::new(FindingCategory::Pattern, "long chain"));
        findings.suggest("twice");
        findings.suggest("twice");
        let result = findings.finish();

        assert!(!result.valid);
        assert_eq!(result.connection_findings().count(), 2);
        assert_eq!(result.expression_findings().count(), 1);
        assert_eq!(result.suggestions.len(), 1);
    }

    #[test]
    fn test_finding_serialization() {
        let node = Node::new("", "HTTP", "n8n-nodes-base.httpRequest");
        let finding = Finding::new(FindingCategory::Node, "bad").with_node(&node);
        let value = serde_json::to_value(&finding).expect("serialization failed");

        assert_eq!(
            value,
            serde_json::json!({ "category": "node", "message": "bad", "nodeName": "HTTP" })
        );
    }
}
