//! # Container Descent
//!
//! Array and object validators first run the keyword checks that apply to
//! the container itself, then validate each child against the subschema the
//! container's schema selects for it.
//!
//! ## Child Schema Selection
//!
//! | child | schema |
//! |-------|--------|
//! | array element `i` | `items` if it is a schema; if `items` is an array, `items[i]`, else `additionalItems` when it is a schema |
//! | object member `name` | `properties[name]` plus every `patternProperties[p]` matching `name`; if none apply, `additionalProperties` when it is a schema |
//!
//! Empty schemas (`{}`) accept everything and are skipped. Each child goes
//! through the full factory step (syntax check on first sight, cached
//! validator, execution) with its own child context.
//!
//! In soft mode descent runs even when the container-level checks failed,
//! so one report lists every violation.

use serde_json::Value;

use jsv_core::JsonPointer;

use crate::context::{ValidationContext, ValidationResult};
use crate::validator::Validator;

/// Run `inner` on an array instance, then descend into its elements.
pub(crate) fn validate_array(
    inner: &Validator,
    ctx: &ValidationContext<'_>,
    instance: &Value,
) -> ValidationResult {
    let mut report = inner.validate(ctx, instance)?;
    let Value::Array(elements) = instance else {
        return Ok(report);
    };
    for (index, element) in elements.iter().enumerate() {
        let Some((schema, schema_path)) = element_schema(ctx, index) else {
            continue;
        };
        if is_empty_schema(schema) {
            continue;
        }
        tracing::trace!(instance_path = %ctx.instance_path(), index, "descending into element");
        let child = ctx.descend(index.to_string(), schema, schema_path);
        report.merge_from(child.validate(element)?);
    }
    Ok(report)
}

/// Run `inner` on an object instance, then descend into its members.
pub(crate) fn validate_object(
    inner: &Validator,
    ctx: &ValidationContext<'_>,
    instance: &Value,
) -> ValidationResult {
    let mut report = inner.validate(ctx, instance)?;
    let Value::Object(members) = instance else {
        return Ok(report);
    };
    for (name, member) in members {
        for (schema, schema_path) in member_schemas(ctx, name) {
            if is_empty_schema(schema) {
                continue;
            }
            tracing::trace!(instance_path = %ctx.instance_path(), member = %name, "descending into member");
            let child = ctx.descend(name.clone(), schema, schema_path);
            report.merge_from(child.validate(member)?);
        }
    }
    Ok(report)
}

fn element_schema<'a>(ctx: &ValidationContext<'a>, index: usize) -> Option<(&'a Value, JsonPointer)> {
    let schema = ctx.schema();
    let base = ctx.schema_path();
    match schema.get("items")? {
        items @ Value::Object(_) => Some((items, base.push("items"))),
        Value::Array(tuple) => match tuple.get(index) {
            Some(item) => Some((item, base.push("items").push_index(index))),
            None => match schema.get("additionalItems") {
                Some(extra @ Value::Object(_)) => Some((extra, base.push("additionalItems"))),
                _ => None,
            },
        },
        _ => None,
    }
}

fn member_schemas<'a>(ctx: &ValidationContext<'a>, name: &str) -> Vec<(&'a Value, JsonPointer)> {
    let schema = ctx.schema();
    let base = ctx.schema_path();
    let mut selected = Vec::new();

    if let Some(declared) = schema.get("properties").and_then(|p| p.get(name)) {
        selected.push((declared, base.push("properties").push(name)));
    }
    if let Some(Value::Object(patterns)) = schema.get("patternProperties") {
        for (pattern, sub) in patterns {
            let matched = ctx
                .factory()
                .pattern(pattern)
                .is_some_and(|re| re.is_match(name));
            if matched {
                selected.push((sub, base.push("patternProperties").push(pattern.as_str())));
            }
        }
    }
    if selected.is_empty() {
        if let Some(extra @ Value::Object(_)) = schema.get("additionalProperties") {
            selected.push((extra, base.push("additionalProperties")));
        }
    }
    selected
}

fn is_empty_schema(schema: &Value) -> bool {
    matches!(schema, Value::Object(map) if map.is_empty())
}
