use anyhow::Context;
use flowmend_validate::workflow::WorkflowValidator;
use serde_json::Value;

use super::{print_json, read_json};
use crate::TRACING_TARGET_COMMAND;
use crate::config::ValidateArgs;

pub fn run(args: &ValidateArgs) -> anyhow::Result<bool> {
    let registry = args.node_types.load()?;
    let workflow: Value = read_json(&args.workflow)?;

    let validator = WorkflowValidator::new(&registry);
    let result = validator
        .validate_value(&workflow, &args.validation.options())
        .with_context(|| format!("cannot validate {}", args.workflow.display()))?;

    tracing::info!(
        target: TRACING_TARGET_COMMAND,
        valid = result.valid,
        errors = result.errors.len(),
        warnings = result.warnings.len(),
        suggestions = result.suggestions.len(),
        "Workflow validated"
    );

    print_json(&result)?;
    Ok(result.valid)
}
