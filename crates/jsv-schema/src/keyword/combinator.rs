//! Keywords that apply other schemas to the same instance: `$ref`, `allOf`,
//! `anyOf`, `oneOf`, `not`.
//!
//! Subschemas are read from the context when the check runs. A cached
//! validator may be shared by several root documents containing an equal
//! subschema, so `$ref` in particular must resolve against the root of the
//! current run.
//!
//! `anyOf`, `oneOf` and `not` only ask whether a branch passes. A branch
//! that aborts in fail-fast mode counts as not passing; the abort does not
//! escape. A recursion limit failure always escapes.

use std::sync::Arc;

use serde_json::Value;

use jsv_core::{JsonPointer, Report};

use super::KeywordError;
use crate::context::{ValidationContext, ValidationResult};
use crate::validator::KeywordValidator;

/// The subschemas of an array-valued combinator, with their schema paths.
fn branches<'a>(ctx: &ValidationContext<'a>, keyword: &str) -> Vec<ValidationContext<'a>> {
    let Some(Value::Array(schemas)) = ctx.schema().get(keyword) else {
        return Vec::new();
    };
    let base = ctx.schema_path().push(keyword);
    schemas
        .iter()
        .enumerate()
        .map(|(i, schema)| ctx.with_schema(schema, base.push_index(i)))
        .collect()
}

fn expect_schema_array(schema: &Value, keyword: &str) -> Result<(), KeywordError> {
    match schema.get(keyword) {
        Some(Value::Array(items)) if items.iter().all(Value::is_object) => Ok(()),
        _ => Err(KeywordError::invalid(keyword, "expected an array of schemas")),
    }
}

#[derive(Debug)]
struct Ref;

impl KeywordValidator for Ref {
    fn validate(&self, ctx: &ValidationContext<'_>, instance: &Value) -> ValidationResult {
        let Some(Value::String(reference)) = ctx.schema().get("$ref") else {
            return Ok(Report::success());
        };
        let pointer = match JsonPointer::parse_fragment(reference) {
            Ok(pointer) => pointer,
            Err(_) => {
                return ctx.fail("$ref", format!("unsupported reference '{reference}' (only local '#' references resolve)"))
            }
        };
        match pointer.resolve(ctx.root()) {
            Some(target) => {
                tracing::trace!(reference = %reference, chain = ctx.chain(), "following reference");
                ctx.with_schema(target, pointer).validate(instance)
            }
            None => ctx.fail("$ref", format!("unresolvable reference '{reference}'")),
        }
    }
}

pub(super) fn build_ref(schema: &Value) -> Result<Option<Arc<dyn KeywordValidator>>, KeywordError> {
    match schema.get("$ref") {
        Some(Value::String(_)) => Ok(Some(Arc::new(Ref))),
        _ => Err(KeywordError::invalid("$ref", "expected a string")),
    }
}

#[derive(Debug)]
struct AllOf;

impl KeywordValidator for AllOf {
    fn validate(&self, ctx: &ValidationContext<'_>, instance: &Value) -> ValidationResult {
        let mut report = Report::success();
        for branch in branches(ctx, "allOf") {
            report.merge_from(branch.validate(instance)?);
        }
        Ok(report)
    }
}

pub(super) fn build_all_of(
    schema: &Value,
) -> Result<Option<Arc<dyn KeywordValidator>>, KeywordError> {
    expect_schema_array(schema, "allOf")?;
    Ok(Some(Arc::new(AllOf)))
}

#[derive(Debug)]
struct AnyOf;

impl KeywordValidator for AnyOf {
    fn validate(&self, ctx: &ValidationContext<'_>, instance: &Value) -> ValidationResult {
        for branch in branches(ctx, "anyOf") {
            if branch.passes(instance)? {
                return Ok(Report::success());
            }
        }
        ctx.fail("anyOf", "instance does not match any schema in anyOf")
    }
}

pub(super) fn build_any_of(
    schema: &Value,
) -> Result<Option<Arc<dyn KeywordValidator>>, KeywordError> {
    expect_schema_array(schema, "anyOf")?;
    Ok(Some(Arc::new(AnyOf)))
}

#[derive(Debug)]
struct OneOf;

impl KeywordValidator for OneOf {
    fn validate(&self, ctx: &ValidationContext<'_>, instance: &Value) -> ValidationResult {
        let mut matched = 0usize;
        for branch in branches(ctx, "oneOf") {
            if branch.passes(instance)? {
                matched += 1;
            }
        }
        match matched {
            1 => Ok(Report::success()),
            0 => ctx.fail("oneOf", "instance does not match any schema in oneOf"),
            n => ctx.fail("oneOf", format!("instance matches {n} schemas in oneOf, expected exactly one")),
        }
    }
}

pub(super) fn build_one_of(
    schema: &Value,
) -> Result<Option<Arc<dyn KeywordValidator>>, KeywordError> {
    expect_schema_array(schema, "oneOf")?;
    Ok(Some(Arc::new(OneOf)))
}

#[derive(Debug)]
struct Not;

impl KeywordValidator for Not {
    fn validate(&self, ctx: &ValidationContext<'_>, instance: &Value) -> ValidationResult {
        let Some(negated) = ctx.schema().get("not") else {
            return Ok(Report::success());
        };
        let branch = ctx.with_schema(negated, ctx.schema_path().push("not"));
        if branch.passes(instance)? {
            ctx.fail("not", "instance matches a schema it must not match")
        } else {
            Ok(Report::success())
        }
    }
}

pub(super) fn build_not(schema: &Value) -> Result<Option<Arc<dyn KeywordValidator>>, KeywordError> {
    match schema.get("not") {
        Some(Value::Object(_)) => Ok(Some(Arc::new(Not))),
        _ => Err(KeywordError::invalid("not", "expected a schema")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ValidationConfig, ValidationFeature};
    use crate::factory::ValidatorFactory;
    use serde_json::json;

    fn validate(config: ValidationConfig, schema: &Value, instance: Value) -> ValidationResult {
        let factory = ValidatorFactory::draft4(config);
        ValidationContext::new(&factory, schema).validate(&instance)
    }

    fn passes(schema: Value, instance: Value) -> bool {
        validate(ValidationConfig::default(), &schema, instance)
            .unwrap()
            .is_success()
    }

    #[test]
    fn test_all_of_collects_branch_messages() {
        let schema = json!({"allOf": [{"minimum": 5}, {"multipleOf": 2}]});
        let report = validate(ValidationConfig::default(), &schema, json!(3)).unwrap();
        let paths: Vec<_> = report.messages().iter().map(|m| m.schema_path.as_str()).collect();
        assert_eq!(paths, ["/allOf/0/minimum", "/allOf/1/multipleOf"]);
    }

    #[test]
    fn test_any_of() {
        let schema = json!({"anyOf": [{"type": "string"}, {"minimum": 10}]});
        assert!(passes(schema.clone(), json!("x")));
        assert!(passes(schema.clone(), json!(11)));
        assert!(!passes(schema, json!(9)));
    }

    #[test]
    fn test_one_of() {
        let schema = json!({"oneOf": [{"type": "integer"}, {"minimum": 2}]});
        assert!(passes(schema.clone(), json!(1)));
        assert!(passes(schema.clone(), json!(2.5)));
        assert!(!passes(schema.clone(), json!(3)));
        assert!(!passes(schema, json!(1.5)));
    }

    #[test]
    fn test_not() {
        assert!(passes(json!({"not": {"type": "null"}}), json!(0)));
        assert!(!passes(json!({"not": {"type": "null"}}), json!(null)));
    }

    #[test]
    fn test_any_of_branch_abort_does_not_escape_in_fail_fast() {
        let config = ValidationConfig::default().with_feature(ValidationFeature::FailFast);
        let schema = json!({"anyOf": [{"type": "string"}, {"type": "integer"}]});
        assert!(validate(config, &schema, json!(4)).unwrap().is_success());
    }

    #[test]
    fn test_local_ref() {
        let schema = json!({
            "definitions": {"positive": {"type": "integer", "minimum": 1}},
            "properties": {"n": {"$ref": "#/definitions/positive"}}
        });
        assert!(passes(schema.clone(), json!({"n": 3})));
        let report = validate(ValidationConfig::default(), &schema, json!({"n": 0})).unwrap();
        assert_eq!(report.messages()[0].schema_path, "/definitions/positive/minimum");
        assert_eq!(report.messages()[0].instance_path, "/n");
    }

    #[test]
    fn test_recursive_ref() {
        let schema = json!({
            "type": "object",
            "properties": {"child": {"$ref": "#"}},
            "required": ["name"]
        });
        assert!(passes(schema.clone(), json!({"name": 1, "child": {"name": 2, "child": {"name": 3}}})));
        assert!(!passes(schema, json!({"name": 1, "child": {"child": {}}})));
    }

    #[test]
    fn test_unresolvable_and_remote_refs_fail() {
        assert!(!passes(json!({"$ref": "#/definitions/missing"}), json!(1)));
        assert!(!passes(json!({"$ref": "http://example.com/s.json"}), json!(1)));
    }

    #[test]
    fn test_self_reference_cycle_hits_chain_limit() {
        let config = ValidationConfig::default().with_max_subschema_chain(16);
        let report = validate(config, &json!({"$ref": "#"}), json!(1)).unwrap();
        assert!(!report.is_success());
        assert_eq!(report.messages()[0].keyword, "depth");
    }

    #[test]
    fn test_negated_cycle_reports_limit_instead_of_passing() {
        for chain in [16, 17, 128, 129] {
            let config = ValidationConfig::default().with_max_subschema_chain(chain);
            let report = validate(config, &json!({"not": {"$ref": "#"}}), json!(1)).unwrap();
            assert!(!report.is_success(), "chain {chain}");
            assert_eq!(report.messages().len(), 1);
            assert_eq!(report.messages()[0].keyword, "depth");
        }
    }

    #[test]
    fn test_any_of_and_one_of_keep_limit_cause() {
        for schema in [
            json!({"anyOf": [{"$ref": "#"}, {"type": "string"}]}),
            json!({"oneOf": [{"type": "string"}, {"$ref": "#"}]}),
        ] {
            let report = validate(ValidationConfig::default(), &schema, json!(1)).unwrap();
            assert_eq!(report.messages().len(), 1);
            assert_eq!(report.messages()[0].keyword, "depth");
        }
    }

    #[test]
    fn test_limit_escapes_combinators_in_fail_fast() {
        let config = ValidationConfig::default().with_feature(ValidationFeature::FailFast);
        let failure = validate(config, &json!({"not": {"$ref": "#"}}), json!(1)).unwrap_err();
        assert!(failure.is_limit());
        assert_eq!(failure.message.keyword, "depth");
    }
}
