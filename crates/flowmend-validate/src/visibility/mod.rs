//! Conditional visibility of node properties.
//!
//! A property is in scope for a partial configuration when every `show`
//! condition matches and no `hide` condition does. The same compiled
//! conditions drive [`analyze`], which builds the controller → dependent
//! graph for a whole property schema.

mod dependency;

use std::collections::BTreeMap;

pub use dependency::{
    DependencyAnalysis, DependencyCondition, DependencyGraph, PropertyDependency, analyze,
};
use flowmend_core::property::{DisplayCondition, PropertyDefinition, display_value};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Visibility of one property under a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum Visibility {
    Visible,
    /// Hidden, with a human-readable explanation.
    Hidden(String),
}

impl Visibility {
    #[inline]
    pub fn is_visible(&self) -> bool {
        matches!(self, Self::Visible)
    }
}

/// Returns whether the property is in scope for the configuration.
pub fn is_visible(property: &PropertyDefinition, config: &Map<String, Value>) -> bool {
    let Some(options) = property.conditions() else {
        return true;
    };
    let shown = options
        .show_conditions()
        .all(|condition| condition.matches(config.get(&condition.property)));
    shown
        && !options
            .hide_conditions()
            .any(|condition| condition.matches(config.get(&condition.property)))
}

/// Classifies the property and explains why it is hidden, if it is.
///
/// The reason names the first `show` condition that fails, or else the first
/// `hide` condition that matches.
pub fn check_visibility(property: &PropertyDefinition, config: &Map<String, Value>) -> Visibility {
    let Some(options) = property.conditions() else {
        return Visibility::Visible;
    };

    for condition in options.show_conditions() {
        let current = config.get(&condition.property);
        if condition.matches(current) {
            continue;
        }
        let expected = quoted_values(condition, " or ");
        let reason = match current {
            Some(value) => format!(
                "Hidden because {} is \"{}\" (needs to be {expected})",
                condition.property,
                display_value(value)
            ),
            None => format!(
                "Hidden because {} is not set (needs to be {expected})",
                condition.property
            ),
        };
        return Visibility::Hidden(reason);
    }

    for condition in options.hide_conditions() {
        if let Some(value) = config.get(&condition.property)
            && condition.matches(Some(value))
        {
            return Visibility::Hidden(format!(
                "Hidden because {} is \"{}\"",
                condition.property,
                display_value(value)
            ));
        }
    }

    Visibility::Visible
}

/// Partition of a property schema under one configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibilityImpact {
    /// Names of in-scope properties, in schema order.
    pub visible: Vec<String>,
    /// Names of out-of-scope properties, in schema order.
    pub hidden: Vec<String>,
    /// Explanation keyed by hidden property name.
    pub reasons: BTreeMap<String, String>,
}

/// Classifies every property of a schema under the configuration.
pub fn visibility_impact(
    properties: &[PropertyDefinition],
    config: &Map<String, Value>,
) -> VisibilityImpact {
    let mut impact = VisibilityImpact::default();
    for property in properties {
        match check_visibility(property, config) {
            Visibility::Visible => impact.visible.push(property.name.clone()),
            Visibility::Hidden(reason) => {
                impact.hidden.push(property.name.clone());
                impact.reasons.insert(property.name.clone(), reason);
            }
        }
    }
    impact
}

fn quoted_values(condition: &DisplayCondition, separator: &str) -> String {
    condition
        .values
        .iter()
        .map(|value| format!("\"{}\"", display_value(value)))
        .collect::<Vec<_>>()
        .join(separator)
}

#[cfg(test)]
mod tests {
    use flowmend_core::property::{DisplayOptions, PropertyType};
    use serde_json::json;

    use super::*;

    fn config(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    fn guarded() -> PropertyDefinition {
        PropertyDefinition::new("body", PropertyType::String).with_display_options(
            DisplayOptions::new()
                .show("a", vec![json!(1)])
                .hide("b", vec![json!(2)]),
        )
    }

    #[test]
    fn test_and_or_truth_table() {
        let property = guarded();
        assert!(!is_visible(&property, &config(json!({ "a": 1, "b": 2 }))));
        assert!(is_visible(&property, &config(json!({ "a": 1, "b": 3 }))));
        assert!(!is_visible(&property, &config(json!({ "a": 2, "b": 3 }))));
        assert!(!is_visible(&property, &config(json!({}))));
    }

    #[test]
    fn test_show_requires_every_controller() {
        let property = PropertyDefinition::new("channel", PropertyType::String)
            .with_display_options(
                DisplayOptions::new()
                    .show("resource", vec![json!("message")])
                    .show("operation", vec![json!("send"), json!("update")]),
            );

        assert!(is_visible(
            &property,
            &config(json!({ "resource": "message", "operation": "update" }))
        ));
        assert!(!is_visible(
            &property,
            &config(json!({ "resource": "message", "operation": "delete" }))
        ));
    }

    #[test]
    fn test_unconditional_property_is_visible() {
        let property = PropertyDefinition::new("url", PropertyType::String);
        assert!(is_visible(&property, &Map::new()));
        assert_eq!(check_visibility(&property, &Map::new()), Visibility::Visible);
    }

    #[test]
    fn test_hidden_reasons() {
        let property = PropertyDefinition::new("text", PropertyType::String).with_display_options(
            DisplayOptions::new()
                .show("operation", vec![json!("send"), json!("update")])
                .hide("mode", vec![json!("raw")]),
        );

        assert_eq!(
            check_visibility(&property, &config(json!({ "operation": "delete" }))),
            Visibility::Hidden(
                "Hidden because operation is \"delete\" (needs to be \"send\" or \"update\")".into()
            )
        );
        assert_eq!(
            check_visibility(&property, &Map::new()),
            Visibility::Hidden(
                "Hidden because operation is not set (needs to be \"send\" or \"update\")".into()
            )
        );
        assert_eq!(
            check_visibility(&property, &config(json!({ "operation": "send", "mode": "raw" }))),
            Visibility::Hidden("Hidden because mode is \"raw\"".into())
        );
    }

    #[test]
    fn test_visibility_impact() {
        let properties = vec![PropertyDefinition::new("a", PropertyType::Number), guarded()];
        let impact = visibility_impact(&properties, &config(json!({ "a": 1, "b": 2 })));

        assert_eq!(impact.visible, vec!["a"]);
        assert_eq!(impact.hidden, vec!["body"]);
        assert_eq!(impact.reasons["body"], "Hidden because b is \"2\"");
    }
}
