//! Diff request and result types.

use flowmend_core::workflow::Workflow;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::operation::RequestedOperation;

/// A batch of operations to apply to one workflow.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffRequest {
    /// Operations in caller order.
    pub operations: Vec<RequestedOperation>,
    /// Checks every operation without returning the mutated workflow.
    #[serde(default)]
    pub validate_only: bool,
}

impl DiffRequest {
    /// Creates a request from the given operations.
    pub fn new<I, O>(operations: I) -> Self
    where
        I: IntoIterator<Item = O>,
        O: Into<RequestedOperation>,
    {
        Self {
            operations: operations.into_iter().map(Into::into).collect(),
            validate_only: false,
        }
    }

    /// Switches the request to validate-only mode.
    pub fn validate_only(mut self) -> Self {
        self.validate_only = true;
        self
    }
}

/// A rejected request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffError {
    /// Position of the failing operation in the caller's array, `None` for
    /// request-level failures.
    pub operation: Option<usize>,
    pub message: String,
    /// The failing operation's payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl DiffError {
    /// Creates an error not tied to a single operation.
    pub fn request(message: impl Into<String>) -> Self {
        Self {
            operation: None,
            message: message.into(),
            details: None,
        }
    }

    /// Creates an error for the operation at `index`.
    pub fn at(index: usize, message: impl Into<String>) -> Self {
        Self {
            operation: Some(index),
            message: message.into(),
            details: None,
        }
    }

    /// Attaches the failing payload.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Outcome of a diff request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffResult {
    pub success: bool,
    /// The mutated workflow; absent on failure and in validate-only mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow: Option<Workflow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operations_applied: Option<usize>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<DiffError>,
}

impl DiffResult {
    pub(crate) fn applied(workflow: Workflow, operations_applied: usize, message: String) -> Self {
        Self {
            success: true,
            workflow: Some(workflow),
            operations_applied: Some(operations_applied),
            message,
            errors: Vec::new(),
        }
    }

    pub(crate) fn validated() -> Self {
        Self {
            success: true,
            workflow: None,
            operations_applied: None,
            message: "Validation successful. All operations are valid but were not applied"
                .to_string(),
            errors: Vec::new(),
        }
    }

    pub(crate) fn rejected(message: impl Into<String>, error: DiffError) -> Self {
        Self {
            success: false,
            workflow: None,
            operations_applied: None,
            message: message.into(),
            errors: vec![error],
        }
    }

    /// Returns the first error, if any.
    pub fn first_error(&self) -> Option<&DiffError> {
        self.errors.first()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_request_deserialization() {
        let request: DiffRequest = serde_json::from_value(json!({
            "operations": [
                { "type": "updateName", "name": "renamed" },
                { "type": "teleport" }
            ],
            "validateOnly": true
        }))
        .expect("deserialization failed");

        assert!(request.validate_only);
        assert!(matches!(request.operations[0], RequestedOperation::Parsed(_)));
        assert!(matches!(request.operations[1], RequestedOperation::Unparsed { .. }));
    }

    #[test]
    fn test_rejected_result_shape() {
        let result = DiffResult::rejected(
            "Too many operations",
            DiffError::request("Too many operations. Maximum allowed is 5, received 6"),
        );
        let value = serde_json::to_value(&result).expect("serialization failed");

        assert_eq!(value["success"], json!(false));
        assert!(value.get("workflow").is_none());
        assert!(value.get("operationsApplied").is_none());
        assert_eq!(value["errors"][0]["operation"], Value::Null);
    }
}
