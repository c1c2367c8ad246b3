//! Node pass operations.

use flowmend_core::node_type::normalize::{BASE_PREFIX, deprecated_alias, has_package_prefix};
use flowmend_core::workflow::{Node, Workflow};
use serde_json::{Map, Value};

use crate::error::OperationError;
use crate::id::IdGenerator;
use crate::operation::{MoveNode, NodeSelector, OperationKind, UpdateNode};

/// Returns the position of the selected node, trying the id before the name.
fn locate(
    workflow: &Workflow,
    selector: &NodeSelector,
    kind: OperationKind,
) -> Result<usize, OperationError> {
    let by_name = |name: &str| workflow.nodes.iter().position(|node| node.name == name);
    let found = match (selector.node_id.as_deref(), selector.node_name.as_deref()) {
        (None, None) => return Err(OperationError::MissingSelector(kind)),
        (Some(id), name) => workflow
            .find_node_index(id)
            .or_else(|| name.and_then(by_name)),
        (None, Some(name)) => by_name(name),
    };
    found.ok_or_else(|| OperationError::NodeNotFound(selector.label().to_owned()))
}

pub(super) fn add_node(
    workflow: &mut Workflow,
    node: &Node,
    ids: &dyn IdGenerator,
) -> Result<(), OperationError> {
    if workflow.node_by_name(&node.name).is_some() {
        return Err(OperationError::DuplicateNodeName(node.name.clone()));
    }
    if !has_package_prefix(&node.node_type) {
        return Err(OperationError::MissingPackagePrefix {
            node_type: node.node_type.clone(),
            suggestion: format!("{BASE_PREFIX}{}", node.node_type),
        });
    }
    if let Some(canonical) = deprecated_alias(&node.node_type) {
        return Err(OperationError::DeprecatedPrefix {
            node_type: node.node_type.clone(),
            canonical,
        });
    }

    let mut node = node.clone();
    if node.id.is_empty() {
        node.id = ids.generate();
    }
    node.type_version.get_or_insert(1.0);
    workflow.nodes.push(node);
    Ok(())
}

pub(super) fn remove_node(
    workflow: &mut Workflow,
    selector: &NodeSelector,
) -> Result<(), OperationError> {
    let index = locate(workflow, selector, OperationKind::RemoveNode)?;
    let removed = workflow.nodes.remove(index);
    workflow.connections.remove_node(&removed.name);
    Ok(())
}

/// Applies dot-separated path updates to the node's JSON form.
///
/// A changed `name` is carried over into every connection reference.
pub(super) fn update_node(
    workflow: &mut Workflow,
    update: &UpdateNode,
) -> Result<(), OperationError> {
    let index = locate(workflow, &update.selector, OperationKind::UpdateNode)?;
    let old_name = workflow.nodes[index].name.clone();

    let mut value = serde_json::to_value(&workflow.nodes[index])
        .map_err(|error| invalid_update(&old_name, error))?;
    for (path, new_value) in &update.updates {
        set_path(&mut value, path, new_value.clone())?;
    }
    let updated: Node = serde_json::from_value(value).map_err(|error| {
        let paths: Vec<&str> = update.updates.keys().map(String::as_str).collect();
        invalid_update(&paths.join(", "), error)
    })?;

    if updated.name != old_name {
        let clash = workflow
            .nodes
            .iter()
            .enumerate()
            .any(|(position, node)| position != index && node.name == updated.name);
        if clash {
            return Err(OperationError::DuplicateNodeName(updated.name));
        }
        workflow.connections.rename_node(&old_name, &updated.name);
    }

    workflow.nodes[index] = updated;
    Ok(())
}

pub(super) fn move_node(workflow: &mut Workflow, update: &MoveNode) -> Result<(), OperationError> {
    let index = locate(workflow, &update.selector, OperationKind::MoveNode)?;
    workflow.nodes[index].position = update.position;
    Ok(())
}

pub(super) fn set_disabled(
    workflow: &mut Workflow,
    selector: &NodeSelector,
    disabled: bool,
    kind: OperationKind,
) -> Result<(), OperationError> {
    let index = locate(workflow, selector, kind)?;
    workflow.nodes[index].disabled = Some(disabled);
    Ok(())
}

fn invalid_update(path: &str, reason: impl ToString) -> OperationError {
    OperationError::InvalidUpdate {
        path: path.to_owned(),
        reason: reason.to_string(),
    }
}

/// Sets `path` inside `value`, replacing non-object intermediates with objects.
fn set_path(value: &mut Value, path: &str, new_value: Value) -> Result<(), OperationError> {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(invalid_update(path, "empty path segment"));
    }
    let Some((last, parents)) = segments.split_last() else {
        return Err(invalid_update(path, "empty path"));
    };

    let mut current = value;
    for segment in parents {
        current = object_at(current, path)?
            .entry((*segment).to_owned())
            .or_insert(Value::Null);
    }
    object_at(current, path)?.insert((*last).to_owned(), new_value);
    Ok(())
}

fn object_at<'a>(
    value: &'a mut Value,
    path: &str,
) -> Result<&'a mut Map<String, Value>, OperationError> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    value
        .as_object_mut()
        .ok_or_else(|| invalid_update(path, "not an object"))
}
