//! # Validation Configuration
//!
//! One [`ValidationConfig`] is fixed per [`ValidatorFactory`](crate::ValidatorFactory)
//! and applies uniformly to syntax checking, keyword validation, container
//! descent and format validation.
//!
//! Configuration can be built in code (`ValidationConfig::default()
//! .with_feature(ValidationFeature::FailFast)`) or loaded from a YAML or JSON
//! file:
//!
//! ```yaml
//! fail_fast: true
//! skip_schema_check: false
//! max_depth: 64
//! max_subschema_chain: 32
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default bound on instance nesting depth (container descent).
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Default bound on consecutive subschema applications (`$ref`, `allOf`,
/// `not` and the rest) without descending into the instance.
pub const DEFAULT_MAX_SUBSCHEMA_CHAIN: usize = 128;

/// Boolean switches recognized by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationFeature {
    /// Bypass all schema syntax checking; every schema counts as validated.
    SkipSchemaCheck,
    /// Abort on the first violation instead of collecting a full report.
    FailFast,
}

impl std::fmt::Display for ValidationFeature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SkipSchemaCheck => f.write_str("SKIP_SCHEMA_CHECK"),
            Self::FailFast => f.write_str("FAIL_FAST"),
        }
    }
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationConfig {
    /// Treat every schema as pre-validated.
    pub skip_schema_check: bool,
    /// Abort on the first violation.
    pub fail_fast: bool,
    /// Maximum instance nesting depth before validation fails.
    pub max_depth: usize,
    /// Maximum number of subschema applications in a row on one instance
    /// node. Only a cyclic schema reaches it.
    pub max_subschema_chain: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            skip_schema_check: false,
            fail_fast: false,
            max_depth: DEFAULT_MAX_DEPTH,
            max_subschema_chain: DEFAULT_MAX_SUBSCHEMA_CHAIN,
        }
    }
}

/// Error while loading or checking a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read config '{path}': {source}")]
    Io {
        /// Path to the configuration file.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration text could not be parsed.
    #[error("invalid config '{path}': {reason}")]
    Parse {
        /// Path (or `<inline>`) of the configuration.
        path: String,
        /// Parser message.
        reason: String,
    },

    /// The configuration parsed but holds an unusable value.
    #[error("invalid config value: {0}")]
    Invalid(String),
}

impl ValidationConfig {
    /// Enable a feature.
    #[must_use]
    pub fn with_feature(mut self, feature: ValidationFeature) -> Self {
        match feature {
            ValidationFeature::SkipSchemaCheck => self.skip_schema_check = true,
            ValidationFeature::FailFast => self.fail_fast = true,
        }
        self
    }

    /// Enable several features.
    #[must_use]
    pub fn with_features(self, features: impl IntoIterator<Item = ValidationFeature>) -> Self {
        features.into_iter().fold(self, Self::with_feature)
    }

    /// Override the depth bound.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Override the subschema chain bound.
    #[must_use]
    pub fn with_max_subschema_chain(mut self, max_subschema_chain: usize) -> Self {
        self.max_subschema_chain = max_subschema_chain;
        self
    }

    /// Whether a feature is enabled.
    pub fn has_feature(&self, feature: ValidationFeature) -> bool {
        match feature {
            ValidationFeature::SkipSchemaCheck => self.skip_schema_check,
            ValidationFeature::FailFast => self.fail_fast,
        }
    }

    /// Reject configurations the engine cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `max_depth` or
    /// `max_subschema_chain` is zero.
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid("max_depth must be at least 1".to_string()));
        }
        if self.max_subschema_chain == 0 {
            return Err(ConfigError::Invalid(
                "max_subschema_chain must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse a YAML configuration (JSON is valid YAML).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed text or unknown fields and
    /// [`ConfigError::Invalid`] if the values fail [`ValidationConfig::check`].
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text).map_err(|e| ConfigError::Parse {
            path: "<inline>".to_string(),
            reason: e.to_string(),
        })?;
        config.check()?;
        Ok(config)
    }

    /// Load a configuration file. `.json` files are parsed as JSON, anything
    /// else as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`ValidationConfig::from_yaml_str`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let is_json = path.extension().and_then(|e| e.to_str()) == Some("json");
        let parsed: Result<Self, String> = if is_json {
            serde_json::from_str(&text).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str(&text).map_err(|e| e.to_string())
        };
        let config = parsed.map_err(|reason| ConfigError::Parse {
            path: path.display().to_string(),
            reason,
        })?;
        config.check()?;
        tracing::debug!(path = %path.display(), ?config, "loaded validation config");
        Ok(config)
    }
}
