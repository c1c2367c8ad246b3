//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── logging: LoggingConfig          # log format (RUST_LOG drives the filter)
//! └── command: Command
//!     ├── validate  NodeTypesConfig + ValidationConfig
//!     ├── diff      DiffConfig
//!     ├── analyze   NodeTypesConfig
//!     └── impact    NodeTypesConfig
//! ```
//!
//! Every option can be provided as an argument or through its environment
//! variable. Use `--help` to see all available options.

mod diff;
mod logging;
mod node_types;
mod validation;

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
pub use diff::DiffConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use node_types::NodeTypesConfig;
use serde::{Deserialize, Serialize};
pub use validation::ValidationConfig;

use crate::TRACING_TARGET_STARTUP;

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "flowmend")]
#[command(about = "Validate, analyze and patch workflow graphs")]
#[command(version)]
pub struct Cli {
    /// Log output configuration.
    #[clap(flatten)]
    pub logging: LoggingConfig,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Clone, Subcommand, Serialize, Deserialize)]
pub enum Command {
    /// Validate a workflow file.
    Validate(ValidateArgs),
    /// Apply a diff request to a workflow file.
    Diff(DiffArgs),
    /// Describe the property dependencies of a node type.
    Analyze(AnalyzeArgs),
    /// Show which properties of a node type a configuration makes visible.
    Impact(ImpactArgs),
}

#[derive(Debug, Clone, Args, Serialize, Deserialize)]
pub struct ValidateArgs {
    /// Path to the workflow JSON document.
    pub workflow: PathBuf,

    #[clap(flatten)]
    pub node_types: NodeTypesConfig,

    #[clap(flatten)]
    pub validation: ValidationConfig,
}

#[derive(Debug, Clone, Args, Serialize, Deserialize)]
pub struct DiffArgs {
    /// Path to the workflow JSON document.
    pub workflow: PathBuf,

    /// Path to the diff request JSON document.
    pub request: PathBuf,

    #[clap(flatten)]
    pub diff: DiffConfig,
}

#[derive(Debug, Clone, Args, Serialize, Deserialize)]
pub struct AnalyzeArgs {
    /// Node type to analyze, e.g. `n8n-nodes-base.slack`.
    pub node_type: String,

    #[clap(flatten)]
    pub node_types: NodeTypesConfig,
}

#[derive(Debug, Clone, Args, Serialize, Deserialize)]
pub struct ImpactArgs {
    /// Node type whose properties are classified.
    pub node_type: String,

    /// Path to a JSON object holding the node configuration.
    pub config: PathBuf,

    #[clap(flatten)]
    pub node_types: NodeTypesConfig,
}

impl Command {
    /// Returns the command name as typed on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Validate(_) => "validate",
            Self::Diff(_) => "diff",
            Self::Analyze(_) => "analyze",
            Self::Impact(_) => "impact",
        }
    }
}

impl Cli {
    /// Logs build information and the selected configuration.
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            command = self.command.name(),
            "Build information"
        );

        self.logging.log();
        match &self.command {
            Command::Validate(args) => {
                args.node_types.log();
                args.validation.log();
            }
            Command::Diff(args) => args.diff.log(),
            Command::Analyze(args) => args.node_types.log(),
            Command::Impact(args) => args.node_types.log(),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use flowmend_validate::config::{ValidationMode, ValidationProfile};

    use super::*;

    #[test]
    fn test_command_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_validate_command() {
        let cli = Cli::try_parse_from([
            "flowmend",
            "validate",
            "workflow.json",
            "--node-types",
            "types.json",
            "--profile",
            "ai-friendly",
            "--mode",
            "full",
            "--skip-expressions",
        ])
        .expect("valid arguments");

        let Command::Validate(args) = cli.command else {
            panic!("expected validate command");
        };
        assert_eq!(args.workflow, PathBuf::from("workflow.json"));
        assert_eq!(args.node_types.node_types, Some(PathBuf::from("types.json")));

        let options = args.validation.options();
        assert_eq!(options.profile, ValidationProfile::AiFriendly);
        assert_eq!(options.mode, ValidationMode::Full);
        assert!(!options.validate_expressions);
        assert!(options.validate_nodes);
    }

    #[test]
    fn test_rejects_unknown_profile() {
        let parsed = Cli::try_parse_from(["flowmend", "validate", "w.json", "--profile", "lenient"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_parses_diff_command() {
        let cli = Cli::try_parse_from([
            "flowmend",
            "--log-format",
            "json",
            "diff",
            "w.json",
            "r.json",
            "--validate-only",
        ])
        .expect("valid arguments");

        assert_eq!(cli.logging.log_format, LogFormat::Json);
        let Command::Diff(args) = cli.command else {
            panic!("expected diff command");
        };
        assert!(args.diff.validate_only);
        assert_eq!(args.diff.max_operations, 5);
    }
}
