//! Diff engine configuration.

use derive_builder::Builder;

/// Default upper bound on operations per request.
pub const DEFAULT_MAX_OPERATIONS: usize = 5;

/// Limits applied to every diff request.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[builder(
    name = "DiffEngineConfigBuilder",
    pattern = "owned",
    setter(into, prefix = "with"),
    build_fn(validate = "Self::validate_config")
)]
pub struct DiffEngineConfig {
    /// Maximum number of operations in one request.
    #[builder(default = "DEFAULT_MAX_OPERATIONS")]
    pub max_operations: usize,
}

impl Default for DiffEngineConfig {
    fn default() -> Self {
        Self {
            max_operations: DEFAULT_MAX_OPERATIONS,
        }
    }
}

impl DiffEngineConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> DiffEngineConfigBuilder {
        DiffEngineConfigBuilder::default()
    }
}

impl DiffEngineConfigBuilder {
    fn validate_config(&self) -> Result<(), String> {
        if self.max_operations == Some(0) {
            return Err("Max operations must be greater than 0".to_string());
        }
        Ok(())
    }
}
