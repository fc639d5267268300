//! # Schema Syntax Checking
//!
//! Before a schema is used to validate instances it must itself be well
//! formed: `minLength` must be a non-negative integer, `required` an array
//! of unique strings, and so on. The [`SyntaxRegistry`] maps keywords to
//! checks that run on the schema node; the [`SyntaxChecker`] runs them and
//! remembers every schema that passed.
//!
//! ## Validated Set
//!
//! The set is keyed by schema content and only grows. A schema equal to one
//! already checked is never checked again. With `skip_schema_check` every
//! schema counts as validated and the set stays empty.
//!
//! Only the schema's own keywords are checked. Subschemas (under
//! `properties`, `items`, `allOf` and the rest) are checked the first time
//! validation reaches them, or all at once through [`subschemas`] and
//! [`ValidatorFactory::validate_schema_tree`](crate::ValidatorFactory::validate_schema_tree).

mod rules;

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use jsv_core::{JsonPointer, NodeType, Report, SchemaDigest};

use crate::cache::ContentIndex;
use crate::context::{ValidationContext, ValidationResult};
use crate::validator::{KeywordValidator, Validator};

pub use rules::draft4_rules;

/// A syntax check for one keyword.
///
/// `check` receives the keyword's value and the whole schema (for rules
/// that depend on siblings, such as `exclusiveMinimum`).
#[derive(Clone, Copy)]
pub struct SyntaxRule {
    keyword: &'static str,
    check: fn(&Value, &Value) -> Result<(), String>,
}

impl SyntaxRule {
    /// A rule checking `keyword` with `check`.
    pub const fn new(keyword: &'static str, check: fn(&Value, &Value) -> Result<(), String>) -> Self {
        Self { keyword, check }
    }

    /// The keyword this rule checks.
    pub fn keyword(&self) -> &'static str {
        self.keyword
    }
}

impl fmt::Debug for SyntaxRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxRule").field("keyword", &self.keyword).finish()
    }
}

impl KeywordValidator for SyntaxRule {
    fn validate(&self, ctx: &ValidationContext<'_>, schema: &Value) -> ValidationResult {
        let Some(value) = schema.get(self.keyword) else {
            return Ok(Report::success());
        };
        match (self.check)(value, schema) {
            Ok(()) => Ok(Report::success()),
            Err(reason) => ctx.fail(self.keyword, reason),
        }
    }
}

/// Ordered keyword → syntax check table.
#[derive(Debug, Clone, Default)]
pub struct SyntaxRegistry {
    entries: Vec<(String, Arc<dyn KeywordValidator>)>,
}

impl SyntaxRegistry {
    /// An empty registry: every object schema passes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Syntax rules for the draft-04 vocabulary.
    pub fn draft4() -> Self {
        let mut registry = Self::new();
        for rule in draft4_rules() {
            registry.register(rule.keyword(), Arc::new(rule));
        }
        registry
    }

    /// Register a check for `keyword`, replacing any existing one in place.
    pub fn register(&mut self, keyword: impl Into<String>, check: Arc<dyn KeywordValidator>) {
        let keyword = keyword.into();
        match self.entries.iter_mut().find(|(k, _)| *k == keyword) {
            Some(entry) => entry.1 = check,
            None => self.entries.push((keyword, check)),
        }
    }

    /// Whether `keyword` has a check.
    pub fn contains(&self, keyword: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == keyword)
    }

    /// Build the validator for the keywords present in `schema`.
    pub fn syntax_validator_for(&self, schema: &Value) -> Validator {
        let Value::Object(members) = schema else {
            return Validator::AlwaysTrue;
        };
        Validator::compose(
            self.entries
                .iter()
                .filter(|(keyword, _)| members.contains_key(keyword.as_str()))
                .map(|(_, check)| Arc::clone(check))
                .collect(),
        )
    }
}

/// Runs syntax checks and tracks which schemas passed.
#[derive(Debug)]
pub struct SyntaxChecker {
    registry: SyntaxRegistry,
    skip: bool,
    validated: RwLock<ContentIndex<SchemaDigest, ()>>,
}

impl SyntaxChecker {
    /// A checker over `registry`. With `skip` set no schema is ever checked.
    pub fn new(registry: SyntaxRegistry, skip: bool) -> Self {
        Self {
            registry,
            skip,
            validated: RwLock::new(ContentIndex::default()),
        }
    }

    /// The underlying registry.
    pub fn registry(&self) -> &SyntaxRegistry {
        &self.registry
    }

    /// Whether schema checking is switched off.
    pub fn is_skipped(&self) -> bool {
        self.skip
    }

    /// Whether `schema`, whose digest is `digest`, needs no further checking.
    pub fn is_validated_with(&self, digest: &SchemaDigest, schema: &Value) -> bool {
        self.skip || self.validated.read().contains(digest, schema)
    }

    /// Check the schema in `ctx`, whose digest is `digest`. On success its
    /// content joins the validated set.
    pub fn check_with(&self, ctx: &ValidationContext<'_>, digest: SchemaDigest) -> ValidationResult {
        let schema = ctx.schema();
        let check_ctx = ctx.for_schema_check();
        if !schema.is_object() {
            return check_ctx.fail(
                "schema",
                format!("schema must be an object, found {}", NodeType::of(schema)),
            );
        }

        let report = self
            .registry
            .syntax_validator_for(schema)
            .validate(&check_ctx, schema)?;

        if report.is_success() {
            let inserted = self.validated.write().insert(digest, schema, ());
            tracing::debug!(digest = %digest.short(), inserted, "schema syntax validated");
        } else {
            tracing::debug!(
                schema_path = %ctx.schema_path(),
                violations = report.messages().len(),
                "schema syntax check failed"
            );
        }
        Ok(report)
    }

    /// Number of distinct schemas recorded as validated.
    pub fn validated_count(&self) -> usize {
        self.validated.read().len()
    }
}

/// The object subschemas directly nested in `schema`, with their schema
/// paths, in document order. `$ref` targets are not followed and values of
/// the wrong shape are skipped (their own keyword check reports them).
pub fn subschemas<'a>(schema: &'a Value, base: &JsonPointer) -> Vec<(&'a Value, JsonPointer)> {
    let Value::Object(members) = schema else {
        return Vec::new();
    };
    let mut found = Vec::new();
    for (keyword, value) in members {
        let path = base.push(keyword.as_str());
        match (keyword.as_str(), value) {
            ("items" | "allOf" | "anyOf" | "oneOf", Value::Array(tuple)) => {
                found.extend(
                    tuple
                        .iter()
                        .enumerate()
                        .filter(|(_, sub)| sub.is_object())
                        .map(|(i, sub)| (sub, path.push_index(i))),
                );
            }
            ("items" | "additionalItems" | "additionalProperties" | "not", sub @ Value::Object(_)) => {
                found.push((sub, path));
            }
            ("properties" | "patternProperties" | "definitions" | "dependencies", Value::Object(map)) => {
                found.extend(
                    map.iter()
                        .filter(|(_, sub)| sub.is_object())
                        .map(|(name, sub)| (sub, path.push(name.as_str()))),
                );
            }
            _ => {}
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ValidationConfig, ValidationFeature};
    use crate::factory::ValidatorFactory;
    use serde_json::json;

    fn check(factory: &ValidatorFactory, schema: &Value) -> ValidationResult {
        factory.validate_schema(&ValidationContext::new(factory, schema))
    }

    #[test]
    fn test_well_formed_schema_is_recorded() {
        let factory = ValidatorFactory::draft4(ValidationConfig::default());
        let schema = json!({"type": "object", "required": ["a"]});
        assert!(!factory.is_validated(&schema));
        assert!(check(&factory, &schema).unwrap().is_success());
        assert!(factory.is_validated(&schema));
        assert_eq!(factory.validated_schema_count(), 1);
    }

    #[test]
    fn test_non_object_schema_fails() {
        let factory = ValidatorFactory::draft4(ValidationConfig::default());
        let report = check(&factory, &json!([1, 2])).unwrap();
        assert!(!report.is_success());
        assert_eq!(report.messages()[0].keyword, "schema");
        assert!(!factory.is_validated(&json!([1, 2])));
    }

    #[test]
    fn test_malformed_schema_is_not_recorded() {
        let factory = ValidatorFactory::draft4(ValidationConfig::default());
        let schema = json!({"minLength": -1, "required": []});
        let report = check(&factory, &schema).unwrap();
        assert_eq!(report.messages().len(), 2);
        assert_eq!(report.messages()[0].instance_path, "");
        assert!(!factory.is_validated(&schema));
    }

    #[test]
    fn test_fail_fast_syntax_violation_aborts() {
        let config = ValidationConfig::default().with_feature(ValidationFeature::FailFast);
        let factory = ValidatorFactory::draft4(config);
        let failure = check(&factory, &json!({"type": "nope"})).unwrap_err();
        assert_eq!(failure.message.keyword, "type");
        assert_eq!(failure.schema, json!("nope"));
    }

    #[test]
    fn test_skip_treats_everything_as_validated() {
        let config = ValidationConfig::default().with_feature(ValidationFeature::SkipSchemaCheck);
        let factory = ValidatorFactory::draft4(config);
        assert!(factory.is_validated(&json!({"minLength": "bogus"})));
        assert!(check(&factory, &json!({"minLength": "bogus"})).unwrap().is_success());
        assert_eq!(factory.validated_schema_count(), 0);
    }

    #[test]
    fn test_register_replaces_in_place() {
        let mut registry = SyntaxRegistry::draft4();
        let before = registry.entries.len();
        registry.register("type", Arc::new(SyntaxRule::new("type", |_, _| Ok(()))));
        assert_eq!(registry.entries.len(), before);
        assert!(registry.contains("type"));
    }

    #[test]
    fn test_syntax_validator_only_covers_present_keywords() {
        let registry = SyntaxRegistry::draft4();
        assert!(matches!(registry.syntax_validator_for(&json!({})), Validator::AlwaysTrue));
        assert!(matches!(
            registry.syntax_validator_for(&json!({"type": "string", "title": "x"})),
            Validator::Single(_)
        ));
        assert_eq!(
            registry
                .syntax_validator_for(&json!({"type": "string", "minLength": 1}))
                .delegate_count(),
            2
        );
    }

    #[test]
    fn test_subschemas_lists_nested_schemas_only() {
        let schema = json!({
            "items": [{"type": "string"}, 3],
            "properties": {"a": {}, "b": true},
            "dependencies": {"x": ["y"], "z": {"required": ["w"]}},
            "not": {"$ref": "#"},
            "additionalProperties": false
        });
        let mut paths: Vec<_> = subschemas(&schema, &JsonPointer::root())
            .into_iter()
            .map(|(_, path)| path.to_string())
            .collect();
        paths.sort();
        assert_eq!(paths, ["/dependencies/z", "/items/0", "/not", "/properties/a"]);
        assert!(subschemas(&json!(5), &JsonPointer::root()).is_empty());
    }
}
