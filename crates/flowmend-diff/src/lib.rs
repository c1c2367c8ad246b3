#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod engine;
mod error;
mod id;
mod operation;
mod request;

#[doc(hidden)]
pub mod prelude;

pub use config::{DiffEngineConfig, DiffEngineConfigBuilder, DiffEngineConfigBuilderError};
pub use engine::DiffEngine;
pub use error::OperationError;
pub use id::{IdGenerator, UuidGenerator};
pub use operation::{
    ConnectionSpec, ConnectionUpdates, DiffOperation, MoveNode, NodeSelector, OperationKind,
    OperationPhase, RequestedOperation, UpdateConnection, UpdateNode,
};
pub use request::{DiffError, DiffRequest, DiffResult};

/// Tracing target for diff application.
pub const TRACING_TARGET: &str = "flowmend_diff::engine";
