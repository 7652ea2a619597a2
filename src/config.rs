//! Compiler configuration, loadable from a `lego.toml` file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How the batch driver reacts to an assertion that fails to compile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Log the failure, record it, and keep compiling the remaining assertions.
    #[default]
    Skip,
    /// Discard the whole pass on the first failure.
    Abort,
}

impl std::fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Skip => write!(f, "skip"),
            Self::Abort => write!(f, "abort"),
        }
    }
}

/// Configuration for the expression compiler and batch driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Prefix hashed together with a coded identifier to derive its identity.
    pub snomed_namespace: String,
    /// Identity of the shared anonymous grouping role.
    pub role_group: String,
    /// Feature used to validate bare measurement values of assertions.
    pub value_feature: String,
    /// Feature used to validate timing measurements.
    pub timing_feature: String,
    /// Wrap measurement-valued relations in an existential over the relation
    /// type's role, instead of using the datatype restriction directly.
    pub wrap_measurement_relations: bool,
    /// What to do when an assertion fails to compile.
    pub error_policy: ErrorPolicy,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            snomed_namespace: "org.snomed.".into(),
            role_group: "RoleGroup".into(),
            value_feature: "Value".into(),
            timing_feature: "Timing".into(),
            wrap_measurement_relations: true,
            error_policy: ErrorPolicy::Skip,
        }
    }
}

impl CompilerConfig {
    /// Parse a configuration from TOML. Missing fields take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a configuration file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check that every name is usable as an identity.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let names = [
            ("role_group", &self.role_group),
            ("value_feature", &self.value_feature),
            ("timing_feature", &self.timing_feature),
        ];
        for (field, value) in names {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    message: format!("`{field}` must not be empty"),
                });
            }
        }
        if self.snomed_namespace.chars().any(|c| u32::from(c) > 0xFF) {
            return Err(ConfigError::Invalid {
                message: "`snomed_namespace` must be ISO-8859-1 text".into(),
            });
        }
        Ok(())
    }
}
