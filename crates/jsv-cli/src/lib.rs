//! # jsv-cli — Command Line Interface
//!
//! Provides the `jsv` binary on top of `jsv-schema`.
//!
//! ## Subcommands
//!
//! - `jsv validate`: validate instance documents against a schema.
//! - `jsv check-schema`: syntax-check a schema without validating anything.
//! - `jsv digest`: print the content digest the validator cache keys a
//!   schema by.
//!
//! ```bash
//! jsv validate --schema person.schema.json alice.json bob.yaml
//! jsv validate --schema person.schema.json --fail-fast --json alice.json
//! jsv check-schema person.schema.json
//! jsv digest person.schema.json
//! ```
//!
//! ## Exit Codes
//!
//! `0` when everything passed, `1` when any document failed, `2` on an
//! operational error (unreadable file, bad configuration).

pub mod schema;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};

use jsv_schema::{ValidationConfig, ValidationFeature};

/// Command-line overrides applied on top of a configuration file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// `--fail-fast`
    pub fail_fast: bool,
    /// `--skip-schema-check`
    pub skip_schema_check: bool,
    /// `--max-depth`
    pub max_depth: Option<usize>,
}

/// Load the configuration file (if any) and apply command-line overrides.
/// Flags can only switch features on.
pub fn resolve_config(path: Option<&Path>, overrides: ConfigOverrides) -> Result<ValidationConfig> {
    let mut config = match path {
        Some(path) => ValidationConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ValidationConfig::default(),
    };
    if overrides.fail_fast {
        config = config.with_feature(ValidationFeature::FailFast);
    }
    if overrides.skip_schema_check {
        config = config.with_feature(ValidationFeature::SkipSchemaCheck);
    }
    if let Some(max_depth) = overrides.max_depth {
        config = config.with_max_depth(max_depth);
    }
    config.check().context("invalid configuration")?;
    tracing::debug!(?config, "resolved validation config");
    Ok(config)
}
