//! Workflow validation configuration.

use clap::Args;
use flowmend_validate::config::{ValidationMode, ValidationProfile};
use flowmend_validate::workflow::ValidationOptions;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// Options of the `validate` command.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Filter profile: `strict`, `runtime`, `minimal` or `ai-friendly`.
    #[arg(long, env = "FLOWMEND_PROFILE", default_value = "runtime")]
    #[serde(default)]
    pub profile: ValidationProfile,

    /// Property scope: `full`, `minimal` or `operation`.
    #[arg(long, env = "FLOWMEND_MODE", default_value = "operation")]
    #[serde(default)]
    pub mode: ValidationMode,

    /// Skip per-node type, version and configuration checks.
    #[arg(long)]
    #[serde(default)]
    pub skip_nodes: bool,

    /// Skip connection checks.
    #[arg(long)]
    #[serde(default)]
    pub skip_connections: bool,

    /// Skip expression checks.
    #[arg(long)]
    #[serde(default)]
    pub skip_expressions: bool,
}

impl ValidationConfig {
    /// Builds the validator options.
    pub fn options(&self) -> ValidationOptions {
        ValidationOptions::default()
            .with_profile(self.profile)
            .with_mode(self.mode)
            .with_validate_nodes(!self.skip_nodes)
            .with_validate_connections(!self.skip_connections)
            .with_validate_expressions(!self.skip_expressions)
    }

    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            profile = %self.profile,
            mode = %self.mode,
            skip_nodes = self.skip_nodes,
            skip_connections = self.skip_connections,
            skip_expressions = self.skip_expressions,
            "Validation configuration"
        );
    }
}
