use flowmend_validate::visibility::{analyze, visibility_impact};
use serde_json::{Map, Value};

use super::{print_json, read_json, resolve_type};
use crate::TRACING_TARGET_COMMAND;
use crate::config::{AnalyzeArgs, ImpactArgs};

pub fn run_analyze(args: &AnalyzeArgs) -> anyhow::Result<bool> {
    let registry = args.node_types.load()?;
    let metadata = resolve_type(&registry, &args.node_type)?;
    let analysis = analyze(&metadata.properties);

    tracing::info!(
        target: TRACING_TARGET_COMMAND,
        node_type = %metadata.node_type,
        total_properties = analysis.total_properties,
        properties_with_dependencies = analysis.properties_with_dependencies,
        "Property dependencies analyzed"
    );

    print_json(&analysis)?;
    Ok(true)
}

pub fn run_impact(args: &ImpactArgs) -> anyhow::Result<bool> {
    let registry = args.node_types.load()?;
    let metadata = resolve_type(&registry, &args.node_type)?;
    let config: Map<String, Value> = read_json(&args.config)?;
    let impact = visibility_impact(&metadata.properties, &config);

    tracing::info!(
        target: TRACING_TARGET_COMMAND,
        node_type = %metadata.node_type,
        visible = impact.visible.len(),
        hidden = impact.hidden.len(),
        "Visibility impact computed"
    );

    print_json(&impact)?;
    Ok(true)
}
