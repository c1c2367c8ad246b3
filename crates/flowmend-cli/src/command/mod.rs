//! Command implementations.
//!
//! Each command reads its JSON inputs, calls one library entry point and
//! prints the result as pretty JSON on stdout.

mod analyze;
mod diff;
mod validate;

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::Context;
use flowmend_core::node_type::NodeTypeMetadata;
use flowmend_validate::lookup::{NodeTypeLookup, NodeTypeRegistry};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::Command;

/// Runs a command, returning whether its outcome was positive.
pub fn execute(command: &Command) -> anyhow::Result<bool> {
    match command {
        Command::Validate(args) => validate::run(args),
        Command::Diff(args) => diff::run(args),
        Command::Analyze(args) => analyze::run_analyze(args),
        Command::Impact(args) => analyze::run_impact(args),
    }
}

/// Reads and parses a JSON document.
fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("failed to parse {}", path.display()))
}

/// Writes `value` as pretty JSON to stdout.
fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value).context("failed to serialize output")?;
    writeln!(stdout).context("failed to write output")?;
    Ok(())
}

/// Resolves a node type in the catalog, failing when it is unknown.
fn resolve_type(registry: &NodeTypeRegistry, node_type: &str) -> anyhow::Result<NodeTypeMetadata> {
    let resolved = registry
        .resolve(node_type)
        .with_context(|| format!("failed to look up node type {node_type}"))?;
    match resolved {
        Some((_, metadata)) => Ok(metadata),
        None => anyhow::bail!("unknown node type: {node_type}"),
    }
}
