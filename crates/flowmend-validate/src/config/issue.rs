//! Configuration issue and result types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display};

use super::{ValidationMode, ValidationProfile};

/// Category of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(AsRefStr, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum IssueKind {
    MissingRequired,
    InvalidType,
    InvalidValue,
    Security,
    Deprecated,
    Inefficient,
    MissingCommon,
    BestPractice,
}

/// A single configuration error or warning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigIssue {
    #[serde(rename = "type")]
    pub kind: IssueKind,
    /// Offending property key, when the issue concerns one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    pub message: String,
    /// Actionable hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<String>,
}

impl ConfigIssue {
    pub fn new(kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            property: None,
            message: message.into(),
            fix: None,
        }
    }

    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.property = Some(property.into());
        self
    }

    pub fn with_fix(mut self, fix: impl Into<String>) -> Self {
        self.fix = Some(fix.into());
        self
    }
}

/// Outcome of validating one node's configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigValidationResult {
    pub valid: bool,
    pub mode: ValidationMode,
    pub profile: ValidationProfile,
    pub errors: Vec<ConfigIssue>,
    pub warnings: Vec<ConfigIssue>,
    pub suggestions: Vec<String>,
    pub visible_properties: Vec<String>,
    pub hidden_properties: Vec<String>,
    /// Suggested replacement values keyed by property.
    #[serde(default)]
    pub autofix: Map<String, Value>,
}

impl ConfigValidationResult {
    /// Creates an empty, valid result.
    pub fn new(mode: ValidationMode, profile: ValidationProfile) -> Self {
        Self {
            valid: true,
            mode,
            profile,
            errors: Vec::new(),
            warnings: Vec::new(),
            suggestions: Vec::new(),
            visible_properties: Vec::new(),
            hidden_properties: Vec::new(),
            autofix: Map::new(),
        }
    }

    /// Returns whether an error of the given kind was reported.
    pub fn has_error(&self, kind: IssueKind) -> bool {
        self.errors.iter().any(|issue| issue.kind == kind)
    }

    /// Returns whether a warning of the given kind was reported.
    pub fn has_warning(&self, kind: IssueKind) -> bool {
        self.warnings.iter().any(|issue| issue.kind == kind)
    }
}
