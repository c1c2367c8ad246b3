//! Diff engine configuration.

use anyhow::Context;
use clap::Args;
use flowmend_diff::DiffEngineConfig;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// Options of the `diff` command.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
pub struct DiffConfig {
    /// Check every operation without printing the mutated workflow.
    #[arg(long)]
    #[serde(default)]
    pub validate_only: bool,

    /// Maximum number of operations accepted in one request.
    #[arg(long, default_value_t = 5)]
    pub max_operations: usize,
}

impl DiffConfig {
    /// Builds the engine configuration.
    pub fn engine_config(&self) -> anyhow::Result<DiffEngineConfig> {
        DiffEngineConfig::builder()
            .with_max_operations(self.max_operations)
            .build()
            .context("invalid diff engine configuration")
    }

    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            validate_only = self.validate_only,
            max_operations = self.max_operations,
            "Diff configuration"
        );
    }
}
