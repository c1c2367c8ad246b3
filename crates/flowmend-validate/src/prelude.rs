//! Convenient re-exports for common use.

pub use flowmend_core::prelude::*;

pub use crate::config::{
    ConfigIssue, ConfigValidationResult, ConfigValidator, IssueKind, ModeAwareConfigValidator,
    NodeRule, NodeRuleRegistry, ValidationMode, ValidationProfile,
};
pub use crate::expression::{ExpressionContext, ExpressionValidationResult, validate_node_expressions};
pub use crate::lookup::{NodeTypeLookup, NodeTypeRegistry};
pub use crate::visibility::{
    DependencyAnalysis, Visibility, VisibilityImpact, analyze, check_visibility, is_visible,
    visibility_impact,
};
pub use crate::workflow::{
    Finding, FindingCategory, Statistics, ValidationOptions, ValidationResult, WorkflowValidator,
};
