//! Node property schema definitions.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::Display;

use super::display::DisplayOptions;

/// Declared type of a node property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum PropertyType {
    String,
    Number,
    Boolean,
    Options,
    MultiOptions,
    Collection,
    FixedCollection,
    Json,
    DateTime,
    Color,
    Hidden,
    Notice,
    Credentials,
    ResourceLocator,
    /// Any type this crate does not model.
    #[serde(untagged)]
    #[strum(default)]
    Other(String),
}

impl PropertyType {
    /// Returns whether the property contains nested properties.
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Collection | Self::FixedCollection)
    }
}

/// One selectable value of an `options` or `multiOptions` property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyOption {
    /// A named value.
    Named {
        /// Display name.
        name: String,
        /// Stored value.
        value: Value,
        /// Optional description.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    /// A bare value.
    Plain(Value),
}

impl PropertyOption {
    /// Returns the value stored in the configuration when this option is selected.
    pub fn value(&self) -> &Value {
        match self {
            Self::Plain(value) => value,
            Self::Named { value, .. } => value,
        }
    }
}

/// Schema of a single node property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDefinition {
    /// Configuration key.
    pub name: String,
    /// Human-readable label.
    #[serde(default)]
    pub display_name: String,
    /// Declared type.
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Allowed values, for `options` and `multiOptions` properties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<PropertyOption>>,
    /// Show/hide conditions, compiled at deserialization time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_options: Option<DisplayOptions>,
}

impl PropertyDefinition {
    /// Creates a property with the given name and type.
    pub fn new(name: impl Into<String>, property_type: PropertyType) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            name,
            property_type,
            required: None,
            default: None,
            description: None,
            options: None,
            display_options: None,
        }
    }

    /// Sets the display name.
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Marks the property as required.
    pub fn required(mut self) -> Self {
        self.required = Some(true);
        self
    }

    /// Sets the allowed option values.
    pub fn with_options(mut self, values: impl IntoIterator<Item = Value>) -> Self {
        self.options = Some(values.into_iter().map(PropertyOption::Plain).collect());
        self
    }

    /// Sets the display options.
    pub fn with_display_options(mut self, display_options: DisplayOptions) -> Self {
        self.display_options = Some(display_options);
        self
    }

    /// Returns whether the property is declared required.
    #[inline]
    pub fn is_required(&self) -> bool {
        self.required == Some(true)
    }

    /// Returns the label used in messages, falling back to the key.
    pub fn label(&self) -> &str {
        if self.display_name.is_empty() {
            &self.name
        } else {
            &self.display_name
        }
    }

    /// Returns the display options when at least one condition is present.
    pub fn conditions(&self) -> Option<&DisplayOptions> {
        self.display_options
            .as_ref()
            .filter(|options| !options.is_empty())
    }

    /// Returns the option values, if the property declares any.
    pub fn option_values(&self) -> Option<Vec<&Value>> {
        self.options
            .as_ref()
            .map(|options| options.iter().map(PropertyOption::value).collect())
    }
}
