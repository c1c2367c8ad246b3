//! Per-node-type validation rules.
//!
//! Rules run after the base checks and can only add findings.

mod code;
mod http;
mod sql;
mod webhook;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub use code::CodeRule;
use flowmend_core::node_type::normalize;
pub use http::HttpRequestRule;
use serde_json::{Map, Value};
pub use sql::SqlRule;
pub use webhook::WebhookRule;

use super::{ConfigIssue, IssueKind};

/// Type-specific checks for one node type.
pub trait NodeRule: Send + Sync {
    /// Inspects the configuration and records additional findings.
    fn check(&self, config: &Map<String, Value>, findings: &mut RuleFindings);
}

/// Append-only sink for the findings of a [`NodeRule`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleFindings {
    pub(crate) errors: Vec<ConfigIssue>,
    pub(crate) warnings: Vec<ConfigIssue>,
    pub(crate) suggestions: Vec<String>,
    pub(crate) autofix: Map<String, Value>,
}

impl RuleFindings {
    /// Creates an empty set of findings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an error.
    pub fn error(&mut self, issue: ConfigIssue) {
        self.errors.push(issue);
    }

    /// Records a warning.
    pub fn warning(&mut self, issue: ConfigIssue) {
        self.warnings.push(issue);
    }

    /// Records a suggestion.
    pub fn suggest(&mut self, suggestion: impl Into<String>) {
        self.suggestions.push(suggestion.into());
    }

    /// Records a replacement value for a property.
    pub fn autofix(&mut self, property: impl Into<String>, value: Value) {
        self.autofix.insert(property.into(), value);
    }

    /// Returns the recorded errors.
    pub fn errors(&self) -> &[ConfigIssue] {
        &self.errors
    }

    /// Returns the recorded warnings.
    pub fn warnings(&self) -> &[ConfigIssue] {
        &self.warnings
    }

    /// Returns the recorded suggestions.
    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    /// Returns whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
            && self.warnings.is_empty()
            && self.suggestions.is_empty()
            && self.autofix.is_empty()
    }
}

/// Rules keyed by short-form node type, e.g. `nodes-base.httpRequest`.
#[derive(Clone, Default)]
pub struct NodeRuleRegistry {
    rules: HashMap<String, Arc<dyn NodeRule>>,
}

impl NodeRuleRegistry {
    /// Creates a registry with no rules.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a registry with the built-in rules.
    pub fn with_defaults() -> Self {
        let sql: Arc<dyn NodeRule> = Arc::new(SqlRule);
        let mut registry = Self::empty()
            .with_rule("nodes-base.httpRequest", HttpRequestRule)
            .with_rule("nodes-base.webhook", WebhookRule)
            .with_rule("nodes-base.code", CodeRule);
        for node_type in ["nodes-base.postgres", "nodes-base.mySql", "nodes-base.microsoftSql"] {
            registry.rules.insert(node_type.to_owned(), Arc::clone(&sql));
        }
        registry
    }

    /// Registers a rule, replacing any rule for the same type.
    pub fn register(&mut self, node_type: &str, rule: impl NodeRule + 'static) {
        self.rules
            .insert(normalize::to_short_form(node_type), Arc::new(rule));
    }

    pub fn with_rule(mut self, node_type: &str, rule: impl NodeRule + 'static) -> Self {
        self.register(node_type, rule);
        self
    }

    /// Returns the rule for a type given in any prefix form.
    pub fn find(&self, node_type: &str) -> Option<&dyn NodeRule> {
        self.rules
            .get(&normalize::to_short_form(node_type))
            .map(|rule| rule.as_ref())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl fmt::Debug for NodeRuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<&String> = self.rules.keys().collect();
        types.sort();
        f.debug_struct("NodeRuleRegistry")
            .field("types", &types)
            .finish()
    }
}

/// Returns the configured string value, if any.
fn string_param<'a>(config: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    config.get(key).and_then(Value::as_str)
}

fn issue(kind: IssueKind, property: &str, message: impl Into<String>) -> ConfigIssue {
    ConfigIssue::new(kind, message).with_property(property)
}
