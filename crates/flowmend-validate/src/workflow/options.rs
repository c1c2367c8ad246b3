//! Workflow validation options.

use serde::{Deserialize, Serialize};

use crate::config::{ValidationMode, ValidationProfile};

/// Selects the phases and the configuration scope of a validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidationOptions {
    /// Run per-node type, version and configuration checks.
    pub validate_nodes: bool,
    /// Run connection checks.
    pub validate_connections: bool,
    /// Run expression checks.
    pub validate_expressions: bool,
    /// Issue filter handed to the configuration validator.
    pub profile: ValidationProfile,
    /// Property scope handed to the configuration validator.
    pub mode: ValidationMode,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            validate_nodes: true,
            validate_connections: true,
            validate_expressions: true,
            profile: ValidationProfile::default(),
            mode: ValidationMode::default(),
        }
    }
}

impl ValidationOptions {
    pub fn with_validate_nodes(mut self, enabled: bool) -> Self {
        self.validate_nodes = enabled;
        self
    }

    pub fn with_validate_connections(mut self, enabled: bool) -> Self {
        self.validate_connections = enabled;
        self
    }

    pub fn with_validate_expressions(mut self, enabled: bool) -> Self {
        self.validate_expressions = enabled;
        self
    }

    pub fn with_profile(mut self, profile: ValidationProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let options: ValidationOptions =
            serde_json::from_value(json!({ "validateExpressions": false, "profile": "strict" }))
                .expect("deserialization failed");

        assert!(options.validate_nodes);
        assert!(options.validate_connections);
        assert!(!options.validate_expressions);
        assert_eq!(options.profile, ValidationProfile::Strict);
        assert_eq!(options.mode, ValidationMode::Operation);
    }
}
