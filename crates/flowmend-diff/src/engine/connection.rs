//! Connection pass operations.

use flowmend_core::workflow::{Connection, MAIN, Workflow};

use crate::error::OperationError;
use crate::operation::{ConnectionSpec, UpdateConnection};

/// Resolves a node reference to the node's name, trying the name first.
fn node_name(workflow: &Workflow, reference: &str) -> Option<String> {
    workflow
        .node_by_name(reference)
        .or_else(|| {
            workflow
                .nodes
                .iter()
                .find(|node| !node.id.is_empty() && node.id == reference)
        })
        .map(|node| node.name.clone())
}

fn endpoints(
    workflow: &Workflow,
    spec: &ConnectionSpec,
) -> Result<(String, String), OperationError> {
    let source = node_name(workflow, &spec.source)
        .ok_or_else(|| OperationError::SourceNotFound(spec.source.clone()))?;
    let target = node_name(workflow, &spec.target)
        .ok_or_else(|| OperationError::TargetNotFound(spec.target.clone()))?;
    Ok((source, target))
}

pub(super) fn add_connection(
    workflow: &mut Workflow,
    spec: &ConnectionSpec,
) -> Result<(), OperationError> {
    let (source, target) = endpoints(workflow, spec)?;
    let channel = spec.source_output.as_deref().unwrap_or(MAIN);
    let output_index = spec.source_index.unwrap_or(0);
    let connection = Connection::new(
        target.clone(),
        spec.target_input.as_deref().unwrap_or(MAIN),
        spec.target_index.unwrap_or(0),
    );

    if workflow
        .connections
        .contains_edge(&source, channel, output_index, &connection)
    {
        return Err(OperationError::DuplicateConnection {
            source_node: source,
            channel: channel.to_owned(),
            target_node: target,
        });
    }
    workflow
        .connections
        .connect(source, channel, output_index, connection);
    Ok(())
}

pub(super) fn remove_connection(
    workflow: &mut Workflow,
    spec: &ConnectionSpec,
) -> Result<(), OperationError> {
    let (source, target) = endpoints(workflow, spec)?;
    let channel = spec.source_output.as_deref().unwrap_or(MAIN);

    let Some(channels) = workflow.connections.get(&source) else {
        return Err(OperationError::NoConnections(source));
    };
    let removed = if channels.contains_key(channel) {
        workflow
            .connections
            .disconnect(&source, channel, spec.source_index, &target)
    } else {
        0
    };

    if removed == 0 {
        return Err(OperationError::ConnectionNotFound {
            source_node: source,
            channel: channel.to_owned(),
            target_node: target,
        });
    }
    Ok(())
}

/// Replaces an edge: removes the current one, then adds it with the overrides.
pub(super) fn update_connection(
    workflow: &mut Workflow,
    update: &UpdateConnection,
) -> Result<(), OperationError> {
    remove_connection(workflow, &update.connection)?;
    add_connection(workflow, &update.replacement())
}
