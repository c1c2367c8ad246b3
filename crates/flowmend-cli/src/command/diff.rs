use anyhow::Context;
use flowmend_core::workflow::Workflow;
use flowmend_diff::{DiffEngine, DiffRequest};

use super::{print_json, read_json};
use crate::TRACING_TARGET_COMMAND;
use crate::config::DiffArgs;

pub fn run(args: &DiffArgs) -> anyhow::Result<bool> {
    let workflow = Workflow::from_value(read_json(&args.workflow)?)
        .with_context(|| format!("invalid workflow in {}", args.workflow.display()))?;
    let mut request: DiffRequest = read_json(&args.request)?;
    request.validate_only |= args.diff.validate_only;

    let engine = DiffEngine::with_config(args.diff.engine_config()?);
    let result = engine.apply_diff(&workflow, &request);

    tracing::info!(
        target: TRACING_TARGET_COMMAND,
        success = result.success,
        operations = request.operations.len(),
        validate_only = request.validate_only,
        "Diff applied"
    );

    print_json(&result)?;
    Ok(result.success)
}
