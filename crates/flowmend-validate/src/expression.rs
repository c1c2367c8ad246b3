//! Token-level checks for `{{ ... }}` expressions in node parameters.
//!
//! This is a narrow lexical pass: it balances brackets, collects the
//! well-known `$` variables and resolves node references against the
//! workflow. It does not parse or evaluate the expression language.

use std::collections::{BTreeSet, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The variables recognized inside expressions, without the leading `$`.
const VARIABLES: &str = "json|input|node|items|parameter|env|workflow|execution|prevNode|itemIndex|runIndex|now|today|vars";

struct Patterns {
    body: Regex,
    empty: Regex,
    variable: Regex,
    selector: Regex,
    node_reference: Regex,
}

impl Patterns {
    fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            body: Regex::new(r"(?s)\{\{(.*?)\}\}")?,
            empty: Regex::new(r"\{\{\s*\}\}")?,
            variable: Regex::new(&format!(r"\$({VARIABLES})\b"))?,
            selector: Regex::new(r"\$\(")?,
            node_reference: Regex::new(
                r#"\$node\[\s*["']([^"']+)["']\s*\]|\$\(\s*["']([^"']+)["']\s*\)|\$items\(\s*["']([^"']+)["']"#,
            )?,
        })
    }
}

static PATTERNS: LazyLock<Option<Patterns>> = LazyLock::new(|| Patterns::compile().ok());

/// Returns whether the string contains an expression.
///
/// Covers both the `={{ ... }}` form and inline `{{ ... }}` interpolation.
pub fn is_expression_str(value: &str) -> bool {
    value.contains("{{")
}

/// Returns whether the value is a string containing an expression.
pub fn is_expression(value: &Value) -> bool {
    value.as_str().is_some_and(is_expression_str)
}

/// What an expression may legally refer to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpressionContext {
    /// Name of the node whose parameters are checked.
    pub current_node_name: String,
    /// Nodes upstream of the current node.
    pub available_nodes: HashSet<String>,
    /// Every node in the workflow.
    pub workflow_nodes: HashSet<String>,
    /// Whether the current node has at least one inbound edge.
    pub has_input_data: bool,
}

impl ExpressionContext {
    pub fn new(current_node_name: impl Into<String>) -> Self {
        Self {
            current_node_name: current_node_name.into(),
            ..Default::default()
        }
    }

    pub fn with_available_nodes<I, S>(mut self, nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.available_nodes = nodes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_workflow_nodes<I, S>(mut self, nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.workflow_nodes = nodes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_input_data(mut self, has_input_data: bool) -> Self {
        self.has_input_data = has_input_data;
        self
    }
}

/// Findings of an expression pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpressionValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Distinct variables, with their `$` prefix.
    pub used_variables: BTreeSet<String>,
    /// Distinct referenced node names.
    pub used_nodes: BTreeSet<String>,
}

impl Default for ExpressionValidationResult {
    fn default() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            used_variables: BTreeSet::new(),
            used_nodes: BTreeSet::new(),
        }
    }
}

/// Checks every expression in a parameter tree.
///
/// Messages are prefixed with the path of the offending value, e.g.
/// `options.headers[0]: Empty expression found`.
pub fn validate_node_expressions(
    parameters: &Map<String, Value>,
    context: &ExpressionContext,
) -> ExpressionValidationResult {
    let mut result = ExpressionValidationResult::default();
    for (key, value) in parameters {
        walk(value, key, context, &mut result);
    }
    result.valid = result.errors.is_empty();
    result
}

/// Checks a single string.
pub fn validate_expression(expression: &str, context: &ExpressionContext) -> ExpressionValidationResult {
    let mut result = ExpressionValidationResult::default();
    check_string(expression, None, context, &mut result);
    result.valid = result.errors.is_empty();
    result
}

fn walk(value: &Value, path: &str, context: &ExpressionContext, result: &mut ExpressionValidationResult) {
    match value {
        Value::String(s) if is_expression_str(s) => check_string(s, Some(path), context, result),
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                walk(item, &format!("{path}[{index}]"), context, result);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                walk(item, &format!("{path}.{key}"), context, result);
            }
        }
        _ => {}
    }
}

fn check_string(
    text: &str,
    path: Option<&str>,
    context: &ExpressionContext,
    result: &mut ExpressionValidationResult,
) {
    let located = |message: String| match path {
        Some(path) => format!("{path}: {message}"),
        None => message,
    };

    let opens = text.matches("{{").count();
    let closes = text.matches("}}").count();
    if opens != closes {
        result.errors.push(located(format!(
            "Unmatched expression brackets: {opens} opening and {closes} closing"
        )));
    }
    if has_nested_open(text) {
        result
            .errors
            .push(located("Nested expressions are not supported".to_owned()));
    }

    let Some(patterns) = PATTERNS.as_ref() else {
        return;
    };
    if patterns.empty.is_match(text) {
        result.errors.push(located("Empty expression found".to_owned()));
    }

    for capture in patterns.body.captures_iter(text) {
        let Some(body) = capture.get(1).map(|m| m.as_str()) else {
            continue;
        };

        let mut reads_input = false;
        for variable in patterns.variable.captures_iter(body) {
            if let Some(name) = variable.get(1).map(|m| m.as_str()) {
                reads_input |= matches!(name, "json" | "input");
                result.used_variables.insert(format!("${name}"));
            }
        }
        if patterns.selector.is_match(body) {
            result.used_variables.insert("$".to_owned());
        }
        if reads_input && !context.has_input_data {
            result.warnings.push(located(format!(
                "Expression reads input data, but \"{}\" has no input connections",
                context.current_node_name
            )));
        }

        for reference in patterns.node_reference.captures_iter(body) {
            let Some(name) = (1..=3)
                .find_map(|group| reference.get(group))
                .map(|m| m.as_str())
            else {
                continue;
            };
            result.used_nodes.insert(name.to_owned());
            if !context.workflow_nodes.contains(name) {
                result.errors.push(located(format!(
                    "Referenced node \"{name}\" not found in workflow"
                )));
            } else if name != context.current_node_name && !context.available_nodes.contains(name) {
                result.warnings.push(located(format!(
                    "Referenced node \"{name}\" is not upstream of \"{}\"",
                    context.current_node_name
                )));
            }
        }
    }
}

/// Returns whether a `{{` opens before the previous one is closed.
fn has_nested_open(text: &str) -> bool {
    let mut open = false;
    let mut rest = text;
    while let Some(position) = rest.find(['{', '}']) {
        let tail = &rest[position..];
        if tail.starts_with("{{") {
            if open {
                return true;
            }
            open = true;
            rest = &tail[2..];
        } else if tail.starts_with("}}") {
            open = false;
            rest = &tail[2..];
        } else {
            rest = &tail[1..];
        }
    }
    false
}
