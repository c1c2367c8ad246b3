//! Node-type metadata and identifier rules.

mod metadata;
pub mod normalize;
mod trigger;

pub use metadata::NodeTypeMetadata;
pub use trigger::{is_agent_type, is_trigger_type, is_webhook_type};
