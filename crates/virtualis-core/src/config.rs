//! Orchestrator configuration.
//!
//! Loaded from TOML. Every field has a default, so an empty document is a
//! valid configuration:
//!
//! ```toml
//! analysis_timeout_ms = 3000
//! default_specialty = "Internal Medicine"
//! fallback_critical_floor = 80
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use virtualis_contracts::error::{VirtualisError, VirtualisResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Upper bound on one external analysis call.
    pub analysis_timeout_ms: u64,

    /// Specialty used for routing when the recommender finds nothing.
    pub default_specialty: String,

    /// Minimum priority of a critical result on the fallback path.
    pub fallback_critical_floor: u8,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            analysis_timeout_ms: 3_000,
            default_specialty: "Internal Medicine".to_string(),
            fallback_critical_floor: 80,
        }
    }
}

impl OrchestratorConfig {
    /// Parse `s` as TOML.
    ///
    /// Returns `VirtualisError::ConfigError` when the TOML is malformed or a
    /// value is out of range.
    pub fn from_toml_str(s: &str) -> VirtualisResult<Self> {
        let config: OrchestratorConfig = toml::from_str(s).map_err(|e| VirtualisError::ConfigError {
            reason: format!("failed to parse orchestrator TOML: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read the file at `path` and parse it as TOML.
    pub fn from_file(path: &Path) -> VirtualisResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| VirtualisError::ConfigError {
            reason: format!("failed to read orchestrator config '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn analysis_timeout(&self) -> Duration {
        Duration::from_millis(self.analysis_timeout_ms)
    }

    fn validate(&self) -> VirtualisResult<()> {
        if self.analysis_timeout_ms == 0 {
            return Err(VirtualisError::ConfigError {
                reason: "analysis_timeout_ms must be greater than zero".to_string(),
            });
        }
        if self.default_specialty.trim().is_empty() {
            return Err(VirtualisError::ConfigError {
                reason: "default_specialty must not be empty".to_string(),
            });
        }
        if self.fallback_critical_floor > 100 {
            return Err(VirtualisError::ConfigError {
                reason: format!(
                    "fallback_critical_floor {} exceeds 100",
                    self.fallback_critical_floor
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use virtualis_contracts::error::VirtualisError;

    use super::OrchestratorConfig;

    #[test]
    fn empty_document_uses_defaults() {
        let config = OrchestratorConfig::from_toml_str("").unwrap();
        assert_eq!(config, OrchestratorConfig::default());
        assert_eq!(config.analysis_timeout().as_millis(), 3_000);
    }

    #[test]
    fn partial_document_overrides_named_fields() {
        let config = OrchestratorConfig::from_toml_str(
            r#"
            analysis_timeout_ms = 750
            default_specialty = "Hospital Medicine"
            "#,
        )
        .unwrap();
        assert_eq!(config.analysis_timeout_ms, 750);
        assert_eq!(config.default_specialty, "Hospital Medicine");
        assert_eq!(config.fallback_critical_floor, 80);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        match OrchestratorConfig::from_toml_str("analysis_timeout_ms = 0") {
            Err(VirtualisError::ConfigError { reason }) => {
                assert!(reason.contains("analysis_timeout_ms"));
            }
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn floor_above_100_is_rejected() {
        assert!(OrchestratorConfig::from_toml_str("fallback_critical_floor = 120").is_err());
    }

    #[test]
    fn malformed_toml_is_config_error() {
        match OrchestratorConfig::from_toml_str("analysis_timeout_ms = ][") {
            Err(VirtualisError::ConfigError { reason }) => {
                assert!(reason.contains("failed to parse orchestrator TOML"));
            }
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }
}
