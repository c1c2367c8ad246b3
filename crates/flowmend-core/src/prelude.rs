//! Convenient re-exports for common use.

pub use crate::error::{BoxedError, Error, ErrorKind, Result};
pub use crate::node_type::{NodeTypeMetadata, is_trigger_type};
pub use crate::property::{
    ConditionMode, DisplayCondition, DisplayOptions, PropertyDefinition, PropertyType,
};
pub use crate::workflow::{Connection, Connections, Node, Position, Workflow};
