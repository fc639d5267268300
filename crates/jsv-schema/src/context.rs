//! # Validation Context
//!
//! A [`ValidationContext`] carries everything a validator needs while it
//! runs: a handle to the owning [`ValidatorFactory`] (and through it the
//! configuration), the root schema document, the schema that applies at the
//! current position, and the instance/schema paths used in diagnostics.
//!
//! Contexts are immutable. Descending into a child value or applying a
//! subschema creates a new context; the parent is never touched.
//!
//! ## Failure Channel
//!
//! [`ValidationContext::fail`] is the single place where a violation enters
//! the system. In soft mode it returns `Ok(Report::failure(..))`; in
//! fail-fast mode it returns `Err(ValidationFailure)` with the same
//! [`Message`] plus the offending schema fragment.
//!
//! ## Recursion Bounds
//!
//! Two counters travel with the context. `depth` counts descents into the
//! instance. `chain` counts subschema applications since the last descent
//! and resets on every descent, so only a schema that applies itself
//! without consuming the instance can grow it without bound.
//! [`ValidationContext::limit`] raises the failure for either bound; it is
//! a hard abort in both modes.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

use jsv_core::{JsonPointer, Message, Report};

use crate::config::ValidationConfig;
use crate::factory::ValidatorFactory;

/// Outcome of running a validator.
pub type ValidationResult = Result<Report, ValidationFailure>;

/// Why a validation run aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// A violation under fail-fast mode.
    Violation,
    /// A recursion bound was exceeded. Raised in both modes.
    Limit,
}

/// Hard abort: a fail-fast violation or an exceeded recursion bound.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("validation aborted at '{}' (schema '{}'): [{}] {}",
    message.instance_path, message.schema_path, message.keyword, message.message)]
pub struct ValidationFailure {
    /// The diagnostic that caused the abort.
    pub message: Message,
    /// The schema fragment that produced it.
    pub schema: Value,
    /// Why validation stopped.
    pub kind: FailureKind,
}

impl ValidationFailure {
    /// Whether a recursion bound caused the abort.
    pub fn is_limit(&self) -> bool {
        self.kind == FailureKind::Limit
    }

    /// Convert the abort into the equivalent soft report.
    pub fn into_report(self) -> Report {
        Report::failure(self.message)
    }
}

/// Immutable per-position validation state.
#[derive(Clone)]
pub struct ValidationContext<'a> {
    factory: &'a ValidatorFactory,
    root: &'a Value,
    schema: &'a Value,
    instance_path: JsonPointer,
    schema_path: JsonPointer,
    depth: usize,
    chain: usize,
}

impl fmt::Debug for ValidationContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationContext")
            .field("instance_path", &self.instance_path.to_string())
            .field("schema_path", &self.schema_path.to_string())
            .field("depth", &self.depth)
            .field("chain", &self.chain)
            .finish_non_exhaustive()
    }
}

impl<'a> ValidationContext<'a> {
    /// Context for validating against a whole schema document.
    pub fn new(factory: &'a ValidatorFactory, schema: &'a Value) -> Self {
        Self {
            factory,
            root: schema,
            schema,
            instance_path: JsonPointer::root(),
            schema_path: JsonPointer::root(),
            depth: 0,
            chain: 0,
        }
    }

    /// Context for validating against the subschema at `schema_path` inside
    /// `root`. Local `$ref`s still resolve against `root`.
    pub fn at(
        factory: &'a ValidatorFactory,
        root: &'a Value,
        schema: &'a Value,
        schema_path: JsonPointer,
    ) -> Self {
        Self {
            factory,
            root,
            schema,
            instance_path: JsonPointer::root(),
            schema_path,
            depth: 0,
            chain: 0,
        }
    }

    /// The owning factory.
    pub fn factory(&self) -> &'a ValidatorFactory {
        self.factory
    }

    /// The factory's configuration.
    pub fn config(&self) -> &'a ValidationConfig {
        self.factory.config()
    }

    /// Whether violations abort immediately.
    pub fn is_fail_fast(&self) -> bool {
        self.factory.config().fail_fast
    }

    /// The root schema document.
    pub fn root(&self) -> &'a Value {
        self.root
    }

    /// The schema that applies at this position.
    pub fn schema(&self) -> &'a Value {
        self.schema
    }

    /// Path of the current instance node.
    pub fn instance_path(&self) -> &JsonPointer {
        &self.instance_path
    }

    /// Path of the current schema.
    pub fn schema_path(&self) -> &JsonPointer {
        &self.schema_path
    }

    /// Instance nesting depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Subschema applications since the last descent.
    pub fn chain(&self) -> usize {
        self.chain
    }

    /// Whether this is the context a run started from.
    pub fn is_entry(&self) -> bool {
        self.depth == 0 && self.chain == 0
    }

    /// Context for a child value (array element or object member).
    pub fn descend(
        &self,
        token: impl Into<String>,
        schema: &'a Value,
        schema_path: JsonPointer,
    ) -> Self {
        Self {
            factory: self.factory,
            root: self.root,
            schema,
            instance_path: self.instance_path.push(token),
            schema_path,
            depth: self.depth + 1,
            chain: 0,
        }
    }

    /// Context applying another schema to the same instance (`$ref`,
    /// `allOf`, `not`, schema dependencies).
    pub fn with_schema(&self, schema: &'a Value, schema_path: JsonPointer) -> Self {
        Self {
            factory: self.factory,
            root: self.root,
            schema,
            instance_path: self.instance_path.clone(),
            schema_path,
            depth: self.depth,
            chain: self.chain + 1,
        }
    }

    /// Context used while checking the schema itself: the "instance" is the
    /// schema node, so its instance path is the schema path.
    pub fn for_schema_check(&self) -> Self {
        Self {
            instance_path: self.schema_path.clone(),
            ..self.clone()
        }
    }

    /// Build a diagnostic for `keyword` at this position.
    pub fn message(&self, keyword: &str, text: impl Into<String>) -> Message {
        Message::new(
            self.instance_path.to_string(),
            self.schema_path.push(keyword).to_string(),
            keyword,
            text,
        )
    }

    /// Build the hard-abort payload for `keyword` at this position.
    pub fn abort(&self, keyword: &str, text: impl Into<String>) -> ValidationFailure {
        ValidationFailure {
            message: self.message(keyword, text),
            schema: self
                .schema
                .get(keyword)
                .cloned()
                .unwrap_or_else(|| self.schema.clone()),
            kind: FailureKind::Violation,
        }
    }

    /// Abort because a recursion bound was exceeded, in either mode.
    pub fn limit(&self, text: impl Into<String>) -> ValidationResult {
        Err(ValidationFailure {
            message: self.message("depth", text),
            schema: self.schema.clone(),
            kind: FailureKind::Limit,
        })
    }

    /// Record a violation of `keyword`, honoring the failure mode.
    pub fn fail(&self, keyword: &str, text: impl Into<String>) -> ValidationResult {
        if self.is_fail_fast() {
            Err(self.abort(keyword, text))
        } else {
            Ok(Report::failure(self.message(keyword, text)))
        }
    }

    /// Validate `instance` against this context's schema through the
    /// factory (syntax check if needed, cached validator, execution).
    pub fn validate(&self, instance: &Value) -> ValidationResult {
        self.factory.validate(self, instance)
    }

    /// Whether `instance` passes this context's schema. A fail-fast abort
    /// counts as a non-match. Used by `anyOf`, `oneOf` and `not`.
    ///
    /// # Errors
    ///
    /// A limit failure is returned as is, so a cycle under `not` cannot pass.
    pub fn passes(&self, instance: &Value) -> Result<bool, ValidationFailure> {
        match self.validate(instance) {
            Ok(report) => Ok(report.is_success()),
            Err(failure) if failure.is_limit() => Err(failure),
            Err(_) => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidationFeature;
    use serde_json::json;

    #[test]
    fn test_descend_extends_paths_without_touching_parent() {
        let factory = ValidatorFactory::draft4(ValidationConfig::default());
        let schema = json!({"items": {"type": "string"}});
        let ctx = ValidationContext::new(&factory, &schema);
        let child = ctx.descend("3", &schema["items"], ctx.schema_path().push("items"));

        assert_eq!(ctx.instance_path().to_string(), "");
        assert_eq!(ctx.depth(), 0);
        assert_eq!(child.instance_path().to_string(), "/3");
        assert_eq!(child.schema_path().to_string(), "/items");
        assert_eq!(child.depth(), 1);
        assert_eq!(child.schema(), &json!({"type": "string"}));
        assert_eq!(child.root(), &schema);
    }

    #[test]
    fn test_fail_is_soft_by_default() {
        let factory = ValidatorFactory::draft4(ValidationConfig::default());
        let schema = json!({"minimum": 3});
        let ctx = ValidationContext::new(&factory, &schema);
        let report = ctx.fail("minimum", "too small").unwrap();
        assert!(!report.is_success());
        assert_eq!(report.messages()[0].schema_path, "/minimum");
    }

    #[test]
    fn test_fail_aborts_in_fail_fast_mode() {
        let config = ValidationConfig::default().with_feature(ValidationFeature::FailFast);
        let factory = ValidatorFactory::draft4(config);
        let schema = json!({"minimum": 3});
        let ctx = ValidationContext::new(&factory, &schema);
        let failure = ctx.fail("minimum", "too small").unwrap_err();
        assert_eq!(failure.schema, json!(3));
        assert_eq!(failure.message.keyword, "minimum");
        assert!(failure.to_string().contains("too small"));
    }

    #[test]
    fn test_abort_and_report_carry_same_message() {
        let factory = ValidatorFactory::draft4(ValidationConfig::default());
        let schema = json!({});
        let ctx = ValidationContext::new(&factory, &schema);
        let soft = ctx.fail("required", "missing").unwrap();
        let hard = ctx.abort("required", "missing").into_report();
        assert_eq!(soft, hard);
    }

    #[test]
    fn test_schema_check_context_points_at_schema() {
        let factory = ValidatorFactory::draft4(ValidationConfig::default());
        let schema = json!({"properties": {"a": {"type": 5}}});
        let ctx = ValidationContext::new(&factory, &schema);
        let child = ctx.descend("a", &schema["properties"]["a"], JsonPointer::parse("/properties/a").unwrap());
        let check = child.for_schema_check();
        assert_eq!(check.instance_path().to_string(), "/properties/a");
    }

    #[test]
    fn test_chain_counts_applications_and_resets_on_descent() {
        let factory = ValidatorFactory::draft4(ValidationConfig::default());
        let schema = json!({"allOf": [{"items": {}}]});
        let ctx = ValidationContext::new(&factory, &schema);
        assert!(ctx.is_entry());

        let applied = ctx.with_schema(&schema["allOf"][0], JsonPointer::parse("/allOf/0").unwrap());
        assert_eq!(applied.chain(), 1);
        assert_eq!(applied.depth(), 0);
        assert!(!applied.is_entry());

        let again = applied.with_schema(&schema, JsonPointer::root());
        assert_eq!(again.chain(), 2);

        let child = again.descend("0", &schema["allOf"][0]["items"], JsonPointer::parse("/allOf/0/items").unwrap());
        assert_eq!(child.chain(), 0);
        assert_eq!(child.depth(), 1);
    }

    #[test]
    fn test_limit_aborts_in_soft_mode() {
        let factory = ValidatorFactory::draft4(ValidationConfig::default());
        let schema = json!({"$ref": "#"});
        let ctx = ValidationContext::new(&factory, &schema);
        let failure = ctx.limit("too deep").unwrap_err();
        assert!(failure.is_limit());
        assert_eq!(failure.message.keyword, "depth");
        assert!(!ctx.abort("required", "missing").is_limit());
    }
}
