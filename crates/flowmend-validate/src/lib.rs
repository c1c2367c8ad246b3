#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod graph;

pub mod config;
pub mod expression;
pub mod lookup;
pub mod visibility;
pub mod workflow;

#[doc(hidden)]
pub mod prelude;

/// Tracing target for workflow validation.
pub const TRACING_TARGET_WORKFLOW: &str = "flowmend_validate::workflow";

/// Tracing target for per-node configuration validation.
pub const TRACING_TARGET_CONFIG: &str = "flowmend_validate::config";

/// Tracing target for visibility analysis.
pub const TRACING_TARGET_VISIBILITY: &str = "flowmend_validate::visibility";
