//! # Validator Factory
//!
//! The orchestrator. Owns the registries, the validator cache, the
//! validated-schema set and the compiled-pattern cache, and drives every
//! validation step:
//!
//! ```text
//! validate(ctx, instance)
//!   1. recursion guards     ctx.depth() > max_depth            ─▶ limit("depth")
//!                           ctx.chain() > max_subschema_chain  ─▶ limit("depth")
//!   2. digest               SchemaDigest::of(schema), once per call
//!   3. syntax check         schema not yet validated ─▶ validate_schema(ctx)
//!                           failing syntax report    ─▶ returned as is
//!   4. build                get_instance_validator(ctx, instance)
//!   5. run                  validator.validate(ctx, instance)
//! ```
//!
//! A limit failure aborts the whole run. At the entry context it becomes a
//! failing report unless fail-fast is on.
//!
//! Building (step 3) never fails and never touches the instance beyond its
//! structural kind, so it can be cached per (kind, schema content).
//!
//! ## Sharing
//!
//! A factory is `Send + Sync`. Wrap it in an `Arc` and hand it to every
//! thread; caches are internally locked.

use std::sync::Arc;

use regex::Regex;
use serde_json::Value;

use jsv_core::{NodeType, Report, SchemaDigest};

use crate::bundle::ValidatorBundle;
use crate::cache::{CacheKey, CacheStats, ValidatorCache};
use crate::config::ValidationConfig;
use crate::context::{ValidationContext, ValidationFailure, ValidationResult};
use crate::format::FormatRegistry;
use crate::keyword::KeywordRegistry;
use crate::patterns::PatternCache;
use crate::syntax::{subschemas, SyntaxChecker};
use crate::validator::{Unsatisfiable, Validator};

/// Builds, caches and runs validators under one configuration.
#[derive(Debug)]
pub struct ValidatorFactory {
    config: ValidationConfig,
    keywords: KeywordRegistry,
    formats: FormatRegistry,
    syntax: SyntaxChecker,
    cache: ValidatorCache,
    patterns: PatternCache,
}

impl ValidatorFactory {
    /// A factory over `bundle` with `config`.
    pub fn new(bundle: ValidatorBundle, config: ValidationConfig) -> Self {
        let (syntax, keywords, formats) = bundle.into_parts();
        tracing::debug!(
            skip_schema_check = config.skip_schema_check,
            fail_fast = config.fail_fast,
            max_depth = config.max_depth,
            max_subschema_chain = config.max_subschema_chain,
            "created validator factory"
        );
        Self {
            syntax: SyntaxChecker::new(syntax, config.skip_schema_check),
            config,
            keywords,
            formats,
            cache: ValidatorCache::new(),
            patterns: PatternCache::new(),
        }
    }

    /// A factory with the draft-04 vocabulary.
    pub fn draft4(config: ValidationConfig) -> Self {
        Self::new(ValidatorBundle::draft4(), config)
    }

    /// The configuration.
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    // -- Schema syntax -------------------------------------------------------

    /// Check the context's schema unless it is already known to be well
    /// formed.
    pub fn validate_schema(&self, ctx: &ValidationContext<'_>) -> ValidationResult {
        if self.syntax.is_skipped() {
            return Ok(Report::success());
        }
        self.validate_schema_with(ctx, SchemaDigest::of(ctx.schema()))
    }

    fn validate_schema_with(
        &self,
        ctx: &ValidationContext<'_>,
        digest: SchemaDigest,
    ) -> ValidationResult {
        if self.syntax.is_validated_with(&digest, ctx.schema()) {
            return Ok(Report::success());
        }
        self.syntax.check_with(ctx, digest)
    }

    /// Check the context's schema and every subschema nested in it
    /// (`properties`, `items`, `definitions`, combinator branches and the
    /// rest), without following `$ref`. Reports are merged in document
    /// order.
    pub fn validate_schema_tree(&self, ctx: &ValidationContext<'_>) -> ValidationResult {
        let mut report = self.validate_schema(ctx)?;
        for (sub, path) in subschemas(ctx.schema(), ctx.schema_path()) {
            let sub_ctx = ValidationContext::at(self, ctx.root(), sub, path);
            report.merge_from(self.validate_schema_tree(&sub_ctx)?);
        }
        Ok(report)
    }

    /// Whether `schema` needs no syntax check.
    pub fn is_validated(&self, schema: &Value) -> bool {
        self.syntax.is_skipped()
            || self.syntax.is_validated_with(&SchemaDigest::of(schema), schema)
    }

    /// Distinct schemas recorded as well formed.
    pub fn validated_schema_count(&self) -> usize {
        self.syntax.validated_count()
    }

    // -- Instance validators -------------------------------------------------

    /// The validator for `instance`'s kind against the context's schema,
    /// from the cache or freshly built.
    pub fn get_instance_validator(
        &self,
        ctx: &ValidationContext<'_>,
        instance: &Value,
    ) -> Arc<Validator> {
        self.instance_validator_with(ctx, instance, SchemaDigest::of(ctx.schema()))
    }

    fn instance_validator_with(
        &self,
        ctx: &ValidationContext<'_>,
        instance: &Value,
        digest: SchemaDigest,
    ) -> Arc<Validator> {
        let kind = NodeType::of(instance);
        let schema = ctx.schema();
        let key = CacheKey::from_digest(kind, digest);

        if let Some(validator) = self.cache.lookup(&key, schema) {
            tracing::debug!(%kind, digest = %key.digest.short(), "validator cache hit");
            return validator;
        }
        tracing::debug!(%kind, digest = %key.digest.short(), "validator cache miss");

        let composed = Validator::compose(self.keywords.keyword_validators_for(ctx, instance));
        let validator = Arc::new(Validator::wrap(kind, composed));
        self.cache.store(key, schema, Arc::clone(&validator));
        validator
    }

    /// The validator for format `name` against `instance`.
    ///
    /// # Errors
    ///
    /// An unknown format aborts with [`ValidationFailure`] in fail-fast mode.
    /// In soft mode it yields a validator that always fails instead.
    pub fn get_format_validator(
        &self,
        ctx: &ValidationContext<'_>,
        name: &str,
        instance: &Value,
    ) -> Result<Validator, ValidationFailure> {
        if let Some(validator) = self.formats.format_validator_for(name, instance) {
            return Ok(validator);
        }
        tracing::warn!(format = name, schema_path = %ctx.schema_path(), "no validator for format");
        let text = format!("no validator for format '{name}'");
        if ctx.is_fail_fast() {
            Err(ctx.abort("format", text))
        } else {
            Ok(Validator::Single(Arc::new(Unsatisfiable::new("format", text))))
        }
    }

    // -- Execution -----------------------------------------------------------

    /// Validate `instance` against the context's schema.
    pub fn validate(&self, ctx: &ValidationContext<'_>, instance: &Value) -> ValidationResult {
        match self.run(ctx, instance) {
            Err(failure) if failure.is_limit() && ctx.is_entry() && !ctx.is_fail_fast() => {
                Ok(failure.into_report())
            }
            result => result,
        }
    }

    fn run(&self, ctx: &ValidationContext<'_>, instance: &Value) -> ValidationResult {
        self.check_bounds(ctx)?;

        let digest = SchemaDigest::of(ctx.schema());
        if !self.syntax.is_skipped() {
            let report = self.validate_schema_with(ctx, digest)?;
            if !report.is_success() {
                return Ok(report);
            }
        }

        self.instance_validator_with(ctx, instance, digest)
            .validate(ctx, instance)
    }

    fn check_bounds(&self, ctx: &ValidationContext<'_>) -> Result<(), ValidationFailure> {
        let text = if ctx.depth() > self.config.max_depth {
            format!("maximum validation depth {} exceeded", self.config.max_depth)
        } else if ctx.chain() > self.config.max_subschema_chain {
            format!(
                "more than {} subschemas applied without descending (cyclic schema?)",
                self.config.max_subschema_chain
            )
        } else {
            return Ok(());
        };
        tracing::warn!(
            depth = ctx.depth(),
            chain = ctx.chain(),
            instance_path = %ctx.instance_path(),
            schema_path = %ctx.schema_path(),
            "validation recursion limit exceeded"
        );
        ctx.limit(text).map(|_| ())
    }

    // -- Observability -------------------------------------------------------

    /// Cache counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// The compiled regex for `pattern`, shared across validations.
    pub fn pattern(&self, pattern: &str) -> Option<Arc<Regex>> {
        self.patterns.get(pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidationFeature;
    use serde_json::json;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_factory_is_send_sync() {
        assert_send_sync::<ValidatorFactory>();
        assert_send_sync::<Validator>();
    }

    #[test]
    fn test_validator_is_built_once_per_kind_and_schema() {
        let factory = ValidatorFactory::draft4(ValidationConfig::default());
        let schema = json!({"type": "string", "minLength": 2});
        let ctx = ValidationContext::new(&factory, &schema);

        let a = factory.get_instance_validator(&ctx, &json!("x"));
        let b = factory.get_instance_validator(&ctx, &json!("yy"));
        let c = factory.get_instance_validator(&ctx, &json!(5));
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));

        let stats = factory.cache_stats();
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
    }

    #[test]
    fn test_containers_are_wrapped() {
        let factory = ValidatorFactory::draft4(ValidationConfig::default());
        let schema = json!({});
        let ctx = ValidationContext::new(&factory, &schema);
        assert!(matches!(
            *factory.get_instance_validator(&ctx, &json!([])),
            Validator::ArrayContainer(_)
        ));
        assert!(matches!(
            *factory.get_instance_validator(&ctx, &json!({})),
            Validator::ObjectContainer(_)
        ));
        assert!(matches!(
            *factory.get_instance_validator(&ctx, &json!(true)),
            Validator::AlwaysTrue
        ));
    }

    #[test]
    fn test_invalid_schema_short_circuits_instance_validation() {
        let factory = ValidatorFactory::draft4(ValidationConfig::default());
        let schema = json!({"type": "string", "minLength": "three"});
        let report = ValidationContext::new(&factory, &schema).validate(&json!(12)).unwrap();
        assert_eq!(report.messages().len(), 1);
        assert_eq!(report.messages()[0].keyword, "minLength");
        assert_eq!(factory.cache_stats().entries, 0);
    }

    #[test]
    fn test_skip_schema_check_compiles_malformed_keyword_as_failure() {
        let config = ValidationConfig::default().with_feature(ValidationFeature::SkipSchemaCheck);
        let factory = ValidatorFactory::draft4(config);
        let schema = json!({"minLength": "three"});
        let report = ValidationContext::new(&factory, &schema).validate(&json!("abcd")).unwrap();
        assert!(!report.is_success());
        assert!(report.messages()[0].message.contains("non-negative integer"));
    }

    #[test]
    fn test_depth_limit_is_failure_not_overflow() {
        let config = ValidationConfig::default()
            .with_feature(ValidationFeature::FailFast)
            .with_max_subschema_chain(8);
        let factory = ValidatorFactory::draft4(config);
        let schema = json!({"definitions": {"a": {"$ref": "#/definitions/b"}, "b": {"$ref": "#/definitions/a"}}, "$ref": "#/definitions/a"});
        let failure = ValidationContext::new(&factory, &schema)
            .validate(&json!(null))
            .unwrap_err();
        assert_eq!(failure.message.keyword, "depth");
    }

    fn nested_arrays(levels: usize) -> Value {
        (0..levels).fold(json!([]), |inner, _| json!([inner]))
    }

    #[test]
    fn test_recursive_items_ref_accepts_nesting_up_to_max_depth() {
        let factory = ValidatorFactory::draft4(ValidationConfig::default());
        let schema = json!({"items": {"$ref": "#"}});
        let ctx = ValidationContext::new(&factory, &schema);

        assert!(ctx.validate(&nested_arrays(100)).unwrap().is_success());

        let report = ctx.validate(&nested_arrays(200)).unwrap();
        assert!(!report.is_success());
        assert_eq!(report.messages().len(), 1);
        assert_eq!(report.messages()[0].keyword, "depth");
        assert!(report.messages()[0].message.contains("depth 128"));
    }

    #[test]
    fn test_subschema_chain_bound_is_independent_of_depth() {
        let config = ValidationConfig::default().with_max_depth(4);
        let factory = ValidatorFactory::draft4(config);
        let schema = json!({
            "definitions": {
                "a": {"$ref": "#/definitions/b"},
                "b": {"$ref": "#/definitions/c"},
                "c": {"$ref": "#/definitions/d"},
                "d": {"allOf": [{"type": "integer"}]}
            },
            "$ref": "#/definitions/a"
        });
        let ctx = ValidationContext::new(&factory, &schema);
        assert!(ctx.validate(&json!(3)).unwrap().is_success());
    }

    #[test]
    fn test_limit_report_in_soft_mode_is_ok() {
        let factory = ValidatorFactory::draft4(ValidationConfig::default().with_max_subschema_chain(4));
        let schema = json!({"properties": {"a": {"minimum": 5}}, "allOf": [{"$ref": "#"}]});
        let report = ValidationContext::new(&factory, &schema).validate(&json!({"a": 1})).unwrap();
        assert!(!report.is_success());
        assert!(report.messages().iter().all(|m| m.keyword == "depth"));
    }

    #[test]
    fn test_validate_hits_cache_once_per_call() {
        let factory = ValidatorFactory::draft4(ValidationConfig::default());
        let schema = json!({"type": "integer"});
        let ctx = ValidationContext::new(&factory, &schema);
        ctx.validate(&json!(1)).unwrap();
        ctx.validate(&json!(2)).unwrap();
        let stats = factory.cache_stats();
        assert_eq!((stats.misses, stats.hits), (1, 1));
        assert_eq!(factory.validated_schema_count(), 1);
    }

    #[test]
    fn test_validate_schema_tree_finds_nested_errors() {
        let factory = ValidatorFactory::draft4(ValidationConfig::default());
        let schema = json!({
            "properties": {"a": {"type": 5}},
            "items": [{"minLength": -1}],
            "definitions": {"d": {"allOf": [{"required": []}]}},
            "not": {"$ref": "#"}
        });
        let ctx = ValidationContext::new(&factory, &schema);

        assert!(factory.validate_schema(&ctx).unwrap().is_success());

        let report = factory.validate_schema_tree(&ctx).unwrap();
        let mut paths: Vec<_> = report.messages().iter().map(|m| m.schema_path.clone()).collect();
        paths.sort();
        assert_eq!(
            paths,
            ["/definitions/d/allOf/0/required", "/items/0/minLength", "/properties/a/type"]
        );
    }

    #[test]
    fn test_get_format_validator_known_and_unknown() {
        let factory = ValidatorFactory::draft4(ValidationConfig::default());
        let schema = json!({"format": "x"});
        let ctx = ValidationContext::new(&factory, &schema);
        assert!(matches!(
            factory.get_format_validator(&ctx, "uuid", &json!(1)),
            Ok(Validator::AlwaysTrue)
        ));
        let unknown = factory.get_format_validator(&ctx, "x", &json!("s")).unwrap();
        assert!(!unknown.validate(&ctx, &json!("s")).unwrap().is_success());
    }
}
