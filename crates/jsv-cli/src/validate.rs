//! # Validate Subcommand
//!
//! Validates one or more instance documents against a schema. All
//! documents share one factory, so subschemas common to several instances
//! are syntax-checked and compiled once.
//!
//! Text output prints `OK:` or `FAIL:` per instance followed by one line per
//! violation. `--json` prints a JSON array with one object per instance.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use jsv_core::Message;
use jsv_schema::{load_document, JsonValidator, ValidatorFactory};

use crate::{resolve_config, ConfigOverrides};

/// Arguments for the `jsv validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Schema document (JSON, or YAML by `.yaml`/`.yml` extension).
    #[arg(long, short = 's', value_name = "SCHEMA")]
    pub schema: PathBuf,

    /// Validation config file (YAML or JSON).
    #[arg(long, value_name = "CONFIG")]
    pub config: Option<PathBuf>,

    /// Validate against the subschema at this JSON Pointer instead of the root.
    #[arg(long, value_name = "POINTER")]
    pub at: Option<String>,

    /// Stop at the first violation.
    #[arg(long)]
    pub fail_fast: bool,

    /// Do not syntax-check schemas.
    #[arg(long)]
    pub skip_schema_check: bool,

    /// Maximum nesting depth.
    #[arg(long, value_name = "N")]
    pub max_depth: Option<usize>,

    /// Print results as JSON.
    #[arg(long)]
    pub json: bool,

    /// Instance documents to validate.
    #[arg(value_name = "INSTANCE", required = true)]
    pub instances: Vec<PathBuf>,
}

/// Result for one instance, as printed by `--json`.
#[derive(Debug, Serialize)]
pub struct InstanceOutcome {
    /// Instance path as given.
    pub instance: String,
    /// Whether the instance passed.
    pub success: bool,
    /// Whether validation stopped at the first violation.
    pub aborted: bool,
    /// Violations, in report order.
    pub messages: Vec<Message>,
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 when every instance passed, 1 when any failed.
/// Operational errors are returned as `Err`.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let config = resolve_config(
        args.config.as_deref(),
        ConfigOverrides {
            fail_fast: args.fail_fast,
            skip_schema_check: args.skip_schema_check,
            max_depth: args.max_depth,
        },
    )?;
    let schema = load_document(&args.schema)
        .with_context(|| format!("failed to load schema {}", args.schema.display()))?;

    let factory = Arc::new(ValidatorFactory::draft4(config));
    let validator = JsonValidator::new(factory, schema);
    tracing::info!(
        schema = %args.schema.display(),
        digest = %validator.schema_digest().short(),
        instances = args.instances.len(),
        "validating"
    );

    let outcomes = args
        .instances
        .iter()
        .map(|path| validate_instance(&validator, args.at.as_deref(), path))
        .collect::<Result<Vec<_>>>()?;

    let stats = validator.factory().cache_stats();
    tracing::info!(
        hits = stats.hits,
        misses = stats.misses,
        entries = stats.entries,
        validated_schemas = validator.factory().validated_schema_count(),
        "validator cache"
    );

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&outcomes).context("failed to serialize results")?
        );
    } else {
        for outcome in &outcomes {
            print_outcome(outcome);
        }
    }

    Ok(if outcomes.iter().all(|o| o.success) { 0 } else { 1 })
}

/// Validate a single instance file.
fn validate_instance(
    validator: &JsonValidator,
    at: Option<&str>,
    path: &Path,
) -> Result<InstanceOutcome> {
    let instance = load_document(path)
        .with_context(|| format!("failed to load instance {}", path.display()))?;

    let result = match at {
        Some(pointer) => validator.validate_at(pointer, &instance).map_err(|e| match e {
            jsv_schema::JsvError::Validation(failure) => Ok(failure),
            other => Err(other),
        }),
        None => validator.validate(&instance).map_err(Ok),
    };

    let (success, aborted, messages) = match result {
        Ok(report) => (report.is_success(), false, report.into_messages()),
        Err(Ok(failure)) => (false, true, vec![failure.message]),
        Err(Err(e)) => {
            return Err(e).with_context(|| format!("cannot validate {}", path.display()))
        }
    };

    tracing::debug!(instance = %path.display(), success, aborted, "validated instance");
    Ok(InstanceOutcome {
        instance: path.display().to_string(),
        success,
        aborted,
        messages,
    })
}

fn print_outcome(outcome: &InstanceOutcome) {
    if outcome.success {
        println!("OK: {}", outcome.instance);
        return;
    }
    let suffix = if outcome.aborted { " (stopped at first violation)" } else { "" };
    println!("FAIL: {}{suffix}", outcome.instance);
    for message in &outcome.messages {
        println!("  {message}");
    }
}
