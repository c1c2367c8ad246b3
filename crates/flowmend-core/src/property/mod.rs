//! Property schema types.
//!
//! - [`PropertyDefinition`]: schema of one node property
//! - [`DisplayOptions`]: compiled show/hide conditions
//! - [`DisplayCondition`]: one controller with its value set

mod definition;
mod display;

pub use definition::{PropertyDefinition, PropertyOption, PropertyType};
pub use display::{ConditionMode, DisplayCondition, DisplayOptions, display_value, loose_eq};
