#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod error;

pub mod node_type;
pub mod property;
pub mod workflow;

#[doc(hidden)]
pub mod prelude;

pub use error::{BoxedError, Error, ErrorKind, Result};

/// Tracing target for core model operations.
pub const TRACING_TARGET: &str = "flowmend_core";
