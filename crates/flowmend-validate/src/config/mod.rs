//! Field-level node configuration validation.
//!
//! [`ConfigValidator`] is the seam the workflow validator delegates to for
//! each node. [`ModeAwareConfigValidator`] is the default implementation:
//! it scopes the property schema by [`ValidationMode`], runs the
//! type-agnostic base checks, enriches the result with the node type's
//! [`NodeRule`], and finally filters issues through a [`ValidationProfile`].

mod issue;
mod profile;
mod rules;
mod validator;

use flowmend_core::Result;
use flowmend_core::property::PropertyDefinition;
pub use issue::{ConfigIssue, ConfigValidationResult, IssueKind};
pub use rules::{
    CodeRule, HttpRequestRule, NodeRule, NodeRuleRegistry, RuleFindings, SqlRule, WebhookRule,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString, IntoStaticStr};
pub use validator::ModeAwareConfigValidator;

/// Selects which properties are checked.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ValidationMode {
    /// Every property in the schema.
    Full,
    /// Required properties that are currently visible.
    Minimal,
    /// Visible properties relevant to the configured resource and operation.
    #[default]
    Operation,
}

/// Selects which issue kinds survive into the result.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, IntoStaticStr)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ValidationProfile {
    /// Everything, plus hardening suggestions.
    Strict,
    /// Only issues that would break execution.
    #[default]
    Runtime,
    /// Only missing required properties.
    Minimal,
    /// Everything except noise about unused properties.
    AiFriendly,
}

/// Validates one node's configuration against its property schema.
pub trait ConfigValidator: Send + Sync {
    /// Validates `config` for a node of `node_type`.
    ///
    /// # Errors
    ///
    /// Implementations return `Err` only when validation itself could not
    /// run; configuration problems are reported in the result.
    fn validate_with_mode(
        &self,
        node_type: &str,
        config: &Map<String, Value>,
        properties: &[PropertyDefinition],
        mode: ValidationMode,
        profile: ValidationProfile,
    ) -> Result<ConfigValidationResult>;
}
