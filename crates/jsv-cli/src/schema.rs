//! # Schema Subcommands
//!
//! `check-schema` syntax-checks schema documents against the draft-04
//! keyword rules. `digest` prints the content digest a schema is cached
//! under, which is stable across key order and formatting.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use jsv_core::SchemaDigest;
use jsv_schema::{load_document, JsonValidator, ValidationConfig, ValidatorFactory};

/// Arguments for the `jsv check-schema` subcommand.
#[derive(Args, Debug)]
pub struct CheckSchemaArgs {
    /// Schema documents to check.
    #[arg(value_name = "SCHEMA", required = true)]
    pub schemas: Vec<PathBuf>,
}

/// Arguments for the `jsv digest` subcommand.
#[derive(Args, Debug)]
pub struct DigestArgs {
    /// Documents to digest.
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,
}

/// Execute the check-schema subcommand. Every subschema nested in each
/// document is checked; `$ref` targets are checked where they are defined.
pub fn run_check_schema(args: &CheckSchemaArgs) -> Result<u8> {
    let factory = Arc::new(ValidatorFactory::draft4(ValidationConfig::default()));
    let mut failed = 0usize;

    for path in &args.schemas {
        let schema = load_document(path)
            .with_context(|| format!("failed to load schema {}", path.display()))?;
        let validator = JsonValidator::new(Arc::clone(&factory), schema);
        let report = match validator.validate_schema_tree() {
            Ok(report) => report,
            Err(failure) => failure.into_report(),
        };
        if report.is_success() {
            println!("OK: {}", path.display());
        } else {
            failed += 1;
            println!("FAIL: {}", path.display());
            for message in report.messages() {
                println!("  {message}");
            }
        }
    }

    tracing::info!(checked = args.schemas.len(), failed, "schema check complete");
    Ok(if failed == 0 { 0 } else { 1 })
}

/// Execute the digest subcommand.
pub fn run_digest(args: &DigestArgs) -> Result<u8> {
    for path in &args.files {
        let document = load_document(path)
            .with_context(|| format!("failed to load {}", path.display()))?;
        println!("sha256:{}  {}", SchemaDigest::of(&document).to_hex(), path.display());
    }
    Ok(0)
}
