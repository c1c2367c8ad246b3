//! Default mode- and profile-aware configuration validator.

use std::sync::LazyLock;

use flowmend_core::Result;
use flowmend_core::property::{PropertyDefinition, PropertyType, display_value, loose_eq};
use regex::Regex;
use serde_json::{Map, Value};

use super::profile::apply_profile;
use super::rules::{NodeRuleRegistry, RuleFindings};
use super::{
    ConfigIssue, ConfigValidationResult, ConfigValidator, IssueKind, ValidationMode,
    ValidationProfile,
};
use crate::TRACING_TARGET_CONFIG;
use crate::expression::is_expression;
use crate::visibility::is_visible;

/// Keys naming the selected resource or operation of a node.
const OPERATION_KEYS: [&str; 3] = ["resource", "operation", "action"];

static SECRET_KEY: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)api[_-]?key|password|secret|token|credential").ok());

/// Validates configurations against their property schema, then applies
/// the matching [`NodeRule`](super::NodeRule).
#[derive(Debug, Clone)]
pub struct ModeAwareConfigValidator {
    rules: NodeRuleRegistry,
}

impl ModeAwareConfigValidator {
    /// Creates a validator with the built-in rules.
    pub fn new() -> Self {
        Self::with_rules(NodeRuleRegistry::with_defaults())
    }

    /// Creates a validator with a custom rule registry.
    pub fn with_rules(rules: NodeRuleRegistry) -> Self {
        Self { rules }
    }

    /// Returns the per-type rule registry.
    pub fn rules(&self) -> &NodeRuleRegistry {
        &self.rules
    }
}

impl Default for ModeAwareConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigValidator for ModeAwareConfigValidator {
    fn validate_with_mode(
        &self,
        node_type: &str,
        config: &Map<String, Value>,
        properties: &[PropertyDefinition],
        mode: ValidationMode,
        profile: ValidationProfile,
    ) -> Result<ConfigValidationResult> {
        let mut result = ConfigValidationResult::new(mode, profile);

        let mut scoped = Vec::new();
        for property in properties {
            let visible = is_visible(property, config);
            if visible {
                result.visible_properties.push(property.name.clone());
            } else {
                result.hidden_properties.push(property.name.clone());
            }
            if in_scope(property, visible, config, mode) {
                scoped.push(property);
            }
        }

        for property in &scoped {
            check_property(property, config, &mut result);
        }
        check_unused(properties, config, &mut result);
        check_secrets(config, &mut result);

        if let Some(rule) = self.rules.find(node_type) {
            let mut findings = RuleFindings::new();
            rule.check(config, &mut findings);
            result.errors.extend(findings.errors);
            result.warnings.extend(findings.warnings);
            result.suggestions.extend(findings.suggestions);
            result.autofix.extend(findings.autofix);
        }

        apply_profile(&mut result, profile);
        result.valid = result.errors.is_empty();

        tracing::trace!(
            target: TRACING_TARGET_CONFIG,
            node_type,
            %mode,
            %profile,
            scoped = scoped.len(),
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            "validated node configuration"
        );
        Ok(result)
    }
}

fn in_scope(
    property: &PropertyDefinition,
    visible: bool,
    config: &Map<String, Value>,
    mode: ValidationMode,
) -> bool {
    match mode {
        ValidationMode::Full => true,
        ValidationMode::Minimal => visible && property.is_required(),
        ValidationMode::Operation => {
            visible
                && OPERATION_KEYS.iter().all(|key| {
                    let Some(value) = config.get(*key) else {
                        return true;
                    };
                    property
                        .conditions()
                        .and_then(|options| options.show_condition(key))
                        .is_none_or(|condition| condition.matches(Some(value)))
                })
        }
    }
}

fn check_property(
    property: &PropertyDefinition,
    config: &Map<String, Value>,
    result: &mut ConfigValidationResult,
) {
    let label = property.label();
    let value = match config.get(&property.name) {
        None | Some(Value::Null) => {
            if property.is_required() && is_visible(property, config) {
                result.errors.push(
                    ConfigIssue::new(
                        IssueKind::MissingRequired,
                        format!("Required property '{label}' is missing"),
                    )
                    .with_property(&property.name)
                    .with_fix(format!("Add a value for '{}'", property.name)),
                );
            }
            return;
        }
        Some(value) => value,
    };

    if is_expression(value) {
        return;
    }

    let expected = match property.property_type {
        PropertyType::String if !value.is_string() => Some("a string"),
        PropertyType::Number if !value.is_number() => Some("a number"),
        PropertyType::Boolean if !value.is_boolean() => Some("a boolean"),
        PropertyType::MultiOptions if !value.is_array() => Some("an array"),
        _ => None,
    };
    if let Some(expected) = expected {
        result.errors.push(
            ConfigIssue::new(
                IssueKind::InvalidType,
                format!(
                    "Property '{label}' must be {expected}, got {}",
                    type_name(value)
                ),
            )
            .with_property(&property.name),
        );
        return;
    }

    let allowed = match property.option_values() {
        Some(values) if !values.is_empty() => values,
        _ => return,
    };
    let offending: Vec<&Value> = match (&property.property_type, value) {
        (PropertyType::Options, value) => vec![value],
        (PropertyType::MultiOptions, Value::Array(members)) => members.iter().collect(),
        _ => return,
    };
    for value in offending {
        if allowed.iter().any(|option| loose_eq(option, value)) {
            continue;
        }
        let choices: Vec<String> = allowed.iter().map(|v| display_value(v)).collect();
        result.errors.push(
            ConfigIssue::new(
                IssueKind::InvalidValue,
                format!(
                    "Invalid value \"{}\" for '{label}'. Must be one of: {}",
                    display_value(value),
                    choices.join(", ")
                ),
            )
            .with_property(&property.name),
        );
    }
}

/// Warns about configured properties the current settings hide.
fn check_unused(
    properties: &[PropertyDefinition],
    config: &Map<String, Value>,
    result: &mut ConfigValidationResult,
) {
    for property in properties {
        if config.contains_key(&property.name) && !is_visible(property, config) {
            result.warnings.push(
                ConfigIssue::new(
                    IssueKind::Inefficient,
                    format!(
                        "Property '{}' is configured but won't be used with the current settings",
                        property.label()
                    ),
                )
                .with_property(&property.name)
                .with_fix(format!("Remove '{}' from the configuration", property.name)),
            );
        }
    }
}

/// Warns about secrets written directly into the configuration.
fn check_secrets(config: &Map<String, Value>, result: &mut ConfigValidationResult) {
    let Some(pattern) = SECRET_KEY.as_ref() else {
        return;
    };
    for (key, value) in config {
        let hardcoded = value
            .as_str()
            .is_some_and(|s| !s.trim().is_empty() && !is_expression(value));
        if hardcoded && pattern.is_match(key) {
            result.warnings.push(
                ConfigIssue::new(
                    IssueKind::Security,
                    format!("Hardcoded secret in '{key}'"),
                )
                .with_property(key)
                .with_fix("Store the value in credentials instead"),
            );
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use flowmend_core::property::DisplayOptions;
    use serde_json::json;

    use super::*;

    fn config(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    fn slack_schema() -> Vec<PropertyDefinition> {
        vec![
            PropertyDefinition::new("resource", PropertyType::Options)
                .with_options([json!("message"), json!("channel")]),
            PropertyDefinition::new("operation", PropertyType::Options)
                .with_options([json!("send"), json!("delete")]),
            PropertyDefinition::new("text", PropertyType::String)
                .with_display_name("Text")
                .required()
                .with_display_options(
                    DisplayOptions::new()
                        .show("resource", vec![json!("message")])
                        .show("operation", vec![json!("send")]),
                ),
            PropertyDefinition::new("channelName", PropertyType::String)
                .required()
                .with_display_options(DisplayOptions::new().show("resource", vec![json!("channel")])),
            PropertyDefinition::new("limit", PropertyType::Number),
        ]
    }

    fn validate(
        config: Map<String, Value>,
        mode: ValidationMode,
        profile: ValidationProfile,
    ) -> ConfigValidationResult {
        ModeAwareConfigValidator::new()
            .validate_with_mode("n8n-nodes-base.slack", &config, &slack_schema(), mode, profile)
            .expect("validation runs")
    }

    #[test]
    fn test_missing_required_visible_property() {
        let result = validate(
            config(json!({ "resource": "message", "operation": "send" })),
            ValidationMode::Operation,
            ValidationProfile::Runtime,
        );

        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].message, "Required property 'Text' is missing");
        assert_eq!(result.hidden_properties, vec!["channelName"]);
    }

    #[test]
    fn test_hidden_required_property_is_not_missing() {
        let result = validate(
            config(json!({ "resource": "message", "operation": "delete" })),
            ValidationMode::Full,
            ValidationProfile::Strict,
        );
        assert!(result.valid);
    }

    #[test]
    fn test_type_and_option_checks() {
        let result = validate(
            config(json!({ "resource": "message", "operation": "archive", "text": "hi", "limit": "ten" })),
            ValidationMode::Full,
            ValidationProfile::Strict,
        );

        let kinds: Vec<IssueKind> = result.errors.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![IssueKind::InvalidValue, IssueKind::InvalidType]
        );
        assert!(result.errors[0].message.contains("Must be one of: send, delete"));
    }

    #[test]
    fn test_expressions_skip_type_checks() {
        let result = validate(
            config(json!({ "resource": "message", "operation": "send", "text": "hi", "limit": "={{ $json.n }}" })),
            ValidationMode::Full,
            ValidationProfile::Strict,
        );
        assert!(result.valid);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_minimal_mode_checks_required_only() {
        let result = validate(
            config(json!({ "resource": "message", "operation": "send", "text": "hi", "limit": "ten" })),
            ValidationMode::Minimal,
            ValidationProfile::Strict,
        );
        assert!(result.valid);
    }

    #[test]
    fn test_unused_property_is_inefficient() {
        let unused = config(json!({
            "resource": "message",
            "operation": "send",
            "text": "hi",
            "channelName": "general"
        }));

        let strict = validate(unused.clone(), ValidationMode::Operation, ValidationProfile::Strict);
        assert!(strict.has_warning(IssueKind::Inefficient));

        let ai = validate(unused, ValidationMode::Operation, ValidationProfile::AiFriendly);
        assert!(!ai.has_warning(IssueKind::Inefficient));
    }

    #[test]
    fn test_hardcoded_secret() {
        let result = validate(
            config(json!({ "resource": "channel", "channelName": "x", "apiKey": "sk-123", "token": "={{ $env.TOKEN }}" })),
            ValidationMode::Operation,
            ValidationProfile::Runtime,
        );
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].property.as_deref(), Some("apiKey"));
    }

    #[test]
    fn test_rules_extend_base_findings() {
        let schema = vec![PropertyDefinition::new("url", PropertyType::String).required()];
        let result = ModeAwareConfigValidator::new()
            .validate_with_mode(
                "n8n-nodes-base.httpRequest",
                &config(json!({ "url": "example.com", "method": "POST" })),
                &schema,
                ValidationMode::Operation,
                ValidationProfile::Strict,
            )
            .expect("validation runs");

        assert!(result.has_error(IssueKind::InvalidValue));
        assert!(result.has_warning(IssueKind::MissingCommon));
        assert_eq!(result.autofix.get("sendBody"), Some(&json!(true)));
    }

    #[test]
    fn test_operation_scope() {
        let schema = vec![
            PropertyDefinition::new("to", PropertyType::String).with_display_options(
                DisplayOptions::new().show("operation", vec![json!("send")]),
            ),
        ];
        let config = config(json!({ "operation": "send", "to": 1 }));

        assert!(in_scope(&schema[0], true, &config, ValidationMode::Operation));
        assert!(!in_scope(&schema[0], false, &config, ValidationMode::Operation));
        assert!(in_scope(&schema[0], false, &config, ValidationMode::Full));
    }
}
