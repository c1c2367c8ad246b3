//! Whole-workflow validation.
//!
//! [`WorkflowValidator`] runs an ordered checklist over a workflow:
//!
//! 1. structural preconditions
//! 2. trigger classification
//! 3. connection validation
//! 4. cycle detection
//! 5. per-node type, version and configuration checks
//! 6. expression checks
//! 7. best-practice patterns
//! 8. summary suggestions
//!
//! Every phase appends to one accumulator, so a run reports all problems at
//! once. Only the structural preconditions stop the run early.

mod index;
mod options;
mod patterns;
mod raw;
mod result;
mod validator;

pub use options::ValidationOptions;
pub use result::{Finding, FindingCategory, Statistics, ValidationResult};
pub use validator::WorkflowValidator;
