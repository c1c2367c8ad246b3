//! Dependency analysis over a property schema.

use flowmend_core::property::{ConditionMode, DisplayCondition, PropertyDefinition, display_value};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::TRACING_TARGET_VISIBILITY;
use crate::graph::NameGraph;

const NESTED_NOTE: &str = "This property contains nested properties that may have their own dependencies";
const MULTIPLE_NOTE: &str = "Multiple conditions must all be satisfied for this property to be visible";

/// One controller a property's visibility depends on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyCondition {
    /// Controlling property key.
    pub property: String,
    /// Values the condition is matched against.
    pub values: Vec<Value>,
    /// `equals` for `show`, `not_equals` for `hide`.
    pub condition: ConditionMode,
    pub description: String,
}

/// Visibility dependencies of one property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDependency {
    pub property: String,
    pub display_name: String,
    pub depends_on: Vec<DependencyCondition>,
    /// Properties whose visibility this one controls.
    pub enables_properties: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_when: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide_when: Option<Map<String, Value>>,
    pub notes: Vec<String>,
}

/// Controller → dependents adjacency, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DependencyGraph(Vec<(String, Vec<String>)>);

impl DependencyGraph {
    fn link(&mut self, controller: &str, dependent: &str) {
        let position = self
            .0
            .iter()
            .position(|(name, _)| name == controller)
            .unwrap_or_else(|| {
                self.0.push((controller.to_owned(), Vec::new()));
                self.0.len() - 1
            });
        let dependents = &mut self.0[position].1;
        if !dependents.iter().any(|name| name == dependent) {
            dependents.push(dependent.to_owned());
        }
    }

    /// Returns the dependents of a controller.
    pub fn get(&self, controller: &str) -> Option<&[String]> {
        self.0
            .iter()
            .find(|(name, _)| name == controller)
            .map(|(_, dependents)| dependents.as_slice())
    }

    /// Iterates over controllers and their dependents.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0
            .iter()
            .map(|(name, dependents)| (name.as_str(), dependents.as_slice()))
    }

    /// Returns the number of controllers.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether no property controls another.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for DependencyGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(name, dependents)| (name, dependents)))
    }
}

/// Result of [`analyze`].
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyAnalysis {
    pub total_properties: usize,
    pub properties_with_dependencies: usize,
    pub dependencies: Vec<PropertyDependency>,
    pub dependency_graph: DependencyGraph,
    pub suggestions: Vec<String>,
}

/// Builds the dependency report for a property schema.
///
/// Self-referential and mutually-referential schemas are reported as
/// circular dependencies rather than rejected.
pub fn analyze(properties: &[PropertyDefinition]) -> DependencyAnalysis {
    let mut graph = DependencyGraph::default();
    let mut dependencies = Vec::new();

    for property in properties {
        let Some(options) = property.conditions() else {
            continue;
        };

        let depends_on: Vec<DependencyCondition> = options
            .conditions()
            .iter()
            .map(|condition| DependencyCondition {
                property: condition.property.clone(),
                values: condition.values.clone(),
                condition: condition.mode,
                description: describe(condition, properties),
            })
            .collect();
        for condition in &depends_on {
            graph.link(&condition.property, &property.name);
        }

        let mut notes = Vec::new();
        if property.property_type.is_container() {
            notes.push(NESTED_NOTE.to_owned());
        }
        if options.controllers().len() >= 2 {
            notes.push(MULTIPLE_NOTE.to_owned());
        }

        let wire = serde_json::to_value(options).ok();
        let section = |key: &str| {
            wire.as_ref()
                .and_then(|wire| wire.get(key))
                .and_then(Value::as_object)
                .cloned()
        };

        dependencies.push(PropertyDependency {
            property: property.name.clone(),
            display_name: property.label().to_owned(),
            depends_on,
            enables_properties: Vec::new(),
            show_when: section("show"),
            hide_when: section("hide"),
            notes,
        });
    }

    for dependency in &mut dependencies {
        if let Some(dependents) = graph.get(&dependency.property) {
            dependency.enables_properties = dependents.to_vec();
        }
    }

    let suggestions = suggestions(&graph, &dependencies);
    tracing::debug!(
        target: TRACING_TARGET_VISIBILITY,
        total = properties.len(),
        dependent = dependencies.len(),
        controllers = graph.len(),
        "analyzed property dependencies"
    );

    DependencyAnalysis {
        total_properties: properties.len(),
        properties_with_dependencies: dependencies.len(),
        dependencies,
        dependency_graph: graph,
        suggestions,
    }
}

fn describe(condition: &DisplayCondition, properties: &[PropertyDefinition]) -> String {
    let controller = properties
        .iter()
        .find(|property| property.name == condition.property)
        .map(|property| property.display_name.as_str())
        .filter(|name| !name.is_empty())
        .unwrap_or(&condition.property);

    let verb = match condition.mode {
        ConditionMode::Equals => "Visible",
        ConditionMode::NotEquals => "Hidden",
    };
    let values: Vec<String> = condition
        .values
        .iter()
        .map(|value| format!("\"{}\"", display_value(value)))
        .collect();

    match values.as_slice() {
        [only] => format!("{verb} when {controller} is set to {only}"),
        _ => format!("{verb} when {controller} is one of: {}", values.join(", ")),
    }
}

fn suggestions(graph: &DependencyGraph, dependencies: &[PropertyDependency]) -> Vec<String> {
    let mut suggestions = Vec::new();

    let mut ranked: Vec<(&str, usize)> = graph
        .iter()
        .map(|(controller, dependents)| (controller, dependents.len()))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    if !ranked.is_empty() {
        let top: Vec<&str> = ranked.iter().take(3).map(|(name, _)| *name).collect();
        suggestions.push(format!("Key properties to configure first: {}", top.join(", ")));
    }

    let multiple = dependencies
        .iter()
        .filter(|dependency| dependency.notes.iter().any(|note| note == MULTIPLE_NOTE))
        .count();
    if multiple > 0 {
        suggestions.push(format!(
            "{multiple} properties have multiple dependencies. Check their conditions carefully."
        ));
    }

    let mut name_graph = NameGraph::new();
    for (controller, dependents) in graph.iter() {
        for dependent in dependents {
            name_graph.add_edge(controller, dependent);
        }
    }
    for cycle in name_graph.find_cycles() {
        suggestions.push(format!(
            "Circular dependency detected: {}",
            cycle.join(" -> ")
        ));
    }

    suggestions
}

#[cfg(test)]
mod tests {
    use flowmend_core::property::{DisplayOptions, PropertyType};
    use serde_json::json;

    use super::*;

    fn schema() -> Vec<PropertyDefinition> {
        serde_json::from_value(json!([
            { "name": "resource", "displayName": "Resource", "type": "options" },
            { "name": "operation", "displayName": "Operation", "type": "options",
              "displayOptions": { "show": { "resource": ["message"] } } },
            { "name": "channel", "displayName": "Channel", "type": "string",
              "displayOptions": { "show": { "resource": ["message"], "operation": ["send", "update"] } } },
            { "name": "options", "displayName": "Options", "type": "collection",
              "displayOptions": { "hide": { "mode": "raw" } } }
        ]))
        .expect("valid schema")
    }

    #[test]
    fn test_analysis_counts_and_graph() {
        let analysis = analyze(&schema());

        assert_eq!(analysis.total_properties, 4);
        assert_eq!(analysis.properties_with_dependencies, 3);
        assert_eq!(
            analysis.dependency_graph.get("resource"),
            Some(&["operation".to_string(), "channel".to_string()][..])
        );
        assert_eq!(analysis.dependency_graph.get("mode"), Some(&["options".to_string()][..]));

        let operation = &analysis.dependencies[0];
        assert_eq!(operation.enables_properties, vec!["channel"]);
        assert_eq!(
            operation.show_when.clone().map(Value::Object),
            Some(json!({ "resource": ["message"] }))
        );
    }

    #[test]
    fn test_condition_descriptions() {
        let analysis = analyze(&schema());
        let channel = &analysis.dependencies[1];

        assert_eq!(
            channel.depends_on[0].description,
            "Visible when Resource is set to \"message\""
        );
        assert_eq!(
            channel.depends_on[1].description,
            "Visible when Operation is one of: \"send\", \"update\""
        );
        // `mode` is not part of the schema, so the raw key is used.
        let options = &analysis.dependencies[2];
        assert_eq!(options.depends_on[0].description, "Hidden when mode is set to \"raw\"");
        assert_eq!(options.depends_on[0].condition, ConditionMode::NotEquals);
    }

    #[test]
    fn test_notes_and_suggestions() {
        let analysis = analyze(&schema());

        assert_eq!(analysis.dependencies[1].notes, vec![MULTIPLE_NOTE]);
        assert_eq!(analysis.dependencies[2].notes, vec![NESTED_NOTE]);
        assert_eq!(
            analysis.suggestions,
            vec![
                "Key properties to configure first: resource, operation, mode".to_string(),
                "1 properties have multiple dependencies. Check their conditions carefully.".into(),
            ]
        );
    }

    #[test]
    fn test_mutual_dependency_terminates() {
        let properties = vec![
            PropertyDefinition::new("A", PropertyType::String)
                .with_display_options(DisplayOptions::new().show("B", vec![json!(true)])),
            PropertyDefinition::new("B", PropertyType::String)
                .with_display_options(DisplayOptions::new().show("A", vec![json!(true)])),
        ];
        let analysis = analyze(&properties);

        let circular: Vec<&String> = analysis
            .suggestions
            .iter()
            .filter(|s| s.starts_with("Circular dependency detected"))
            .collect();
        assert_eq!(circular.len(), 1);
        assert!(circular[0].contains('A') && circular[0].contains('B'));
    }

    #[test]
    fn test_self_dependency_terminates() {
        let properties = vec![
            PropertyDefinition::new("loop", PropertyType::Boolean)
                .with_display_options(DisplayOptions::new().show("loop", vec![json!(true)])),
        ];
        let analysis = analyze(&properties);

        assert!(
            analysis
                .suggestions
                .contains(&"Circular dependency detected: loop -> loop".to_string())
        );
    }

    #[test]
    fn test_empty_schema() {
        let analysis = analyze(&[]);
        assert_eq!(analysis.total_properties, 0);
        assert!(analysis.dependency_graph.is_empty());
        assert!(analysis.suggestions.is_empty());
    }

    #[test]
    fn test_graph_serializes_as_ordered_object() {
        let analysis = analyze(&schema());
        let value = serde_json::to_value(&analysis).expect("serialization failed");
        let keys: Vec<&String> = value["dependencyGraph"]
            .as_object()
            .map(|graph| graph.keys().collect())
            .unwrap_or_default();
        assert_eq!(keys, vec!["resource", "operation", "mode"]);
    }
}
