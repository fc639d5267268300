//! Object keywords: `required`, `minProperties`, `maxProperties`,
//! `additionalProperties` and `dependencies`.

use std::sync::Arc;

use regex::Regex;
use serde_json::Value;

use jsv_core::Report;

use super::{count_param, KeywordError};
use crate::context::{ValidationContext, ValidationResult};
use crate::validator::KeywordValidator;

#[derive(Debug)]
struct Required {
    names: Vec<String>,
}

impl KeywordValidator for Required {
    fn validate(&self, ctx: &ValidationContext<'_>, instance: &Value) -> ValidationResult {
        let Value::Object(members) = instance else {
            return Ok(Report::success());
        };
        let mut report = Report::success();
        for name in self.names.iter().filter(|n| !members.contains_key(n.as_str())) {
            report.merge_from(ctx.fail("required", format!("required property '{name}' is missing"))?);
        }
        Ok(report)
    }
}

pub(super) fn build_required(
    schema: &Value,
) -> Result<Option<Arc<dyn KeywordValidator>>, KeywordError> {
    let names = string_array(schema.get("required"))
        .ok_or_else(|| KeywordError::invalid("required", "expected an array of strings"))?;
    Ok(Some(Arc::new(Required { names })))
}

fn string_array(value: Option<&Value>) -> Option<Vec<String>> {
    value?
        .as_array()?
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect()
}

#[derive(Debug)]
struct PropertyCount {
    keyword: &'static str,
    limit: u64,
    at_least: bool,
}

impl KeywordValidator for PropertyCount {
    fn validate(&self, ctx: &ValidationContext<'_>, instance: &Value) -> ValidationResult {
        let Value::Object(members) = instance else {
            return Ok(Report::success());
        };
        let len = members.len() as u64;
        if self.at_least && len < self.limit {
            ctx.fail(
                self.keyword,
                format!("object has too few properties (found {len}, required minimum {})", self.limit),
            )
        } else if !self.at_least && len > self.limit {
            ctx.fail(
                self.keyword,
                format!("object has too many properties (found {len}, allowed maximum {})", self.limit),
            )
        } else {
            Ok(Report::success())
        }
    }
}

pub(super) fn build_min_properties(
    schema: &Value,
) -> Result<Option<Arc<dyn KeywordValidator>>, KeywordError> {
    let limit = count_param(schema, "minProperties")?;
    Ok(Some(Arc::new(PropertyCount {
        keyword: "minProperties",
        limit,
        at_least: true,
    })))
}

pub(super) fn build_max_properties(
    schema: &Value,
) -> Result<Option<Arc<dyn KeywordValidator>>, KeywordError> {
    let limit = count_param(schema, "maxProperties")?;
    Ok(Some(Arc::new(PropertyCount {
        keyword: "maxProperties",
        limit,
        at_least: false,
    })))
}

/// `additionalProperties: false`: every member must be declared in
/// `properties` or match a `patternProperties` regex.
#[derive(Debug)]
struct NoAdditionalProperties {
    declared: Vec<String>,
    patterns: Vec<Regex>,
}

impl NoAdditionalProperties {
    fn allows(&self, name: &str) -> bool {
        self.declared.iter().any(|d| d == name) || self.patterns.iter().any(|p| p.is_match(name))
    }
}

impl KeywordValidator for NoAdditionalProperties {
    fn validate(&self, ctx: &ValidationContext<'_>, instance: &Value) -> ValidationResult {
        let Value::Object(members) = instance else {
            return Ok(Report::success());
        };
        let extra: Vec<&str> = members
            .keys()
            .map(String::as_str)
            .filter(|name| !self.allows(name))
            .collect();
        if extra.is_empty() {
            return Ok(Report::success());
        }
        let listed: Vec<String> = extra.iter().map(|n| format!("'{n}'")).collect();
        ctx.fail(
            "additionalProperties",
            format!("object has additional properties not allowed by the schema: {}", listed.join(", ")),
        )
    }
}

pub(super) fn build_additional_properties(
    schema: &Value,
) -> Result<Option<Arc<dyn KeywordValidator>>, KeywordError> {
    match schema.get("additionalProperties") {
        Some(Value::Bool(false)) => {}
        Some(Value::Bool(true) | Value::Object(_)) => return Ok(None),
        _ => {
            return Err(KeywordError::invalid(
                "additionalProperties",
                "expected a boolean or a schema",
            ))
        }
    }
    let declared = match schema.get("properties") {
        Some(Value::Object(props)) => props.keys().cloned().collect(),
        _ => Vec::new(),
    };
    let patterns = match schema.get("patternProperties") {
        Some(Value::Object(patterns)) => patterns
            .keys()
            .map(|p| {
                Regex::new(p).map_err(|e| {
                    KeywordError::invalid("patternProperties", format!("invalid regular expression '{p}': {e}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?,
        _ => Vec::new(),
    };
    Ok(Some(Arc::new(NoAdditionalProperties { declared, patterns })))
}

/// `dependencies`: property dependencies are checked directly, schema
/// dependencies are applied to the whole instance when their trigger
/// property is present.
#[derive(Debug)]
struct Dependencies;

impl KeywordValidator for Dependencies {
    fn validate(&self, ctx: &ValidationContext<'_>, instance: &Value) -> ValidationResult {
        let (Value::Object(members), Some(Value::Object(dependencies))) =
            (instance, ctx.schema().get("dependencies"))
        else {
            return Ok(Report::success());
        };
        let base = ctx.schema_path().push("dependencies");
        let mut report = Report::success();
        for (trigger, dependency) in dependencies {
            if !members.contains_key(trigger.as_str()) {
                continue;
            }
            match dependency {
                Value::Array(needed) => {
                    for name in needed.iter().filter_map(Value::as_str) {
                        if !members.contains_key(name) {
                            report.merge_from(ctx.fail(
                                "dependencies",
                                format!("property '{trigger}' requires property '{name}' to be present"),
                            )?);
                        }
                    }
                }
                Value::Object(_) => {
                    let sub = ctx.with_schema(dependency, base.push(trigger.as_str()));
                    report.merge_from(sub.validate(instance)?);
                }
                _ => {}
            }
        }
        Ok(report)
    }
}

pub(super) fn build_dependencies(
    schema: &Value,
) -> Result<Option<Arc<dyn KeywordValidator>>, KeywordError> {
    match schema.get("dependencies") {
        Some(Value::Object(_)) => Ok(Some(Arc::new(Dependencies))),
        _ => Err(KeywordError::invalid("dependencies", "expected an object")),
    }
}
