//! Display conditions governing whether a property is in scope.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How a condition's value set is applied to the controlling property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionMode {
    /// From `show`: the controller's value must be one of the values.
    Equals,
    /// From `hide`: the property is hidden when the controller's value is one of the values.
    NotEquals,
}

/// A single compiled display condition.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayCondition {
    /// Name of the controlling sibling property.
    pub property: String,
    /// Whether the condition comes from `show` or `hide`.
    pub mode: ConditionMode,
    /// Values matched against the controller's current value.
    pub values: Vec<Value>,
}

impl DisplayCondition {
    /// Returns whether the controller's value is in the value set.
    ///
    /// An absent value never matches.
    pub fn matches(&self, value: Option<&Value>) -> bool {
        value.is_some_and(|value| self.values.iter().any(|v| loose_eq(v, value)))
    }
}

/// Compiled `displayOptions`, built once when the property schema is loaded.
///
/// Conditions keep their declaration order with every `show` entry ahead of
/// every `hide` entry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "RawDisplayOptions", into = "RawDisplayOptions")]
pub struct DisplayOptions {
    conditions: Vec<DisplayCondition>,
}

impl DisplayOptions {
    /// Creates an empty set of display options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `show` condition.
    pub fn show(mut self, property: impl Into<String>, values: Vec<Value>) -> Self {
        self.push(property.into(), ConditionMode::Equals, values);
        self
    }

    /// Adds a `hide` condition.
    pub fn hide(mut self, property: impl Into<String>, values: Vec<Value>) -> Self {
        self.push(property.into(), ConditionMode::NotEquals, values);
        self
    }

    fn push(&mut self, property: String, mode: ConditionMode, values: Vec<Value>) {
        let condition = DisplayCondition {
            property,
            mode,
            values,
        };
        match mode {
            ConditionMode::Equals => {
                let at = self
                    .conditions
                    .iter()
                    .position(|c| c.mode == ConditionMode::NotEquals)
                    .unwrap_or(self.conditions.len());
                self.conditions.insert(at, condition);
            }
            ConditionMode::NotEquals => self.conditions.push(condition),
        }
    }

    /// Returns all conditions, `show` first.
    pub fn conditions(&self) -> &[DisplayCondition] {
        &self.conditions
    }

    /// Returns the `show` conditions.
    pub fn show_conditions(&self) -> impl Iterator<Item = &DisplayCondition> {
        self.conditions
            .iter()
            .filter(|c| c.mode == ConditionMode::Equals)
    }

    /// Returns the `hide` conditions.
    pub fn hide_conditions(&self) -> impl Iterator<Item = &DisplayCondition> {
        self.conditions
            .iter()
            .filter(|c| c.mode == ConditionMode::NotEquals)
    }

    /// Returns the `show` condition on a given controller.
    pub fn show_condition(&self, property: &str) -> Option<&DisplayCondition> {
        self.show_conditions().find(|c| c.property == property)
    }

    /// Returns whether no conditions are present.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Returns the distinct controlling properties in declaration order.
    pub fn controllers(&self) -> Vec<&str> {
        let mut controllers: Vec<&str> = Vec::new();
        for condition in &self.conditions {
            if !controllers.contains(&condition.property.as_str()) {
                controllers.push(&condition.property);
            }
        }
        controllers
    }
}

/// `displayOptions` as it appears on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RawDisplayOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    show: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hide: Option<Map<String, Value>>,
}

fn into_values(value: Value) -> Vec<Value> {
    match value {
        Value::Array(values) => values,
        other => vec![other],
    }
}

impl From<RawDisplayOptions> for DisplayOptions {
    fn from(raw: RawDisplayOptions) -> Self {
        let show = raw.show.into_iter().flatten().map(|(property, values)| {
            DisplayCondition {
                property,
                mode: ConditionMode::Equals,
                values: into_values(values),
            }
        });
        let hide = raw.hide.into_iter().flatten().map(|(property, values)| {
            DisplayCondition {
                property,
                mode: ConditionMode::NotEquals,
                values: into_values(values),
            }
        });
        Self {
            conditions: show.chain(hide).collect(),
        }
    }
}

impl From<DisplayOptions> for RawDisplayOptions {
    fn from(options: DisplayOptions) -> Self {
        let mut raw = RawDisplayOptions::default();
        for condition in options.conditions {
            let target = match condition.mode {
                ConditionMode::Equals => &mut raw.show,
                ConditionMode::NotEquals => &mut raw.hide,
            };
            target
                .get_or_insert_with(Map::new)
                .insert(condition.property, Value::Array(condition.values));
        }
        raw
    }
}

/// JSON equality where numbers compare by numeric value.
pub fn loose_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => match (l.as_f64(), r.as_f64()) {
            (Some(l), Some(r)) => l == r,
            _ => l == r,
        },
        _ => left == right,
    }
}

/// Renders a value the way it appears in human-readable messages.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
