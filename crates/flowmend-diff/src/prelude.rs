//! Convenient re-exports for common use.

pub use flowmend_core::prelude::*;

pub use crate::{
    DiffEngine, DiffEngineConfig, DiffError, DiffOperation, DiffRequest, DiffResult, IdGenerator,
    OperationKind, RequestedOperation, UuidGenerator,
};
