//! String keywords: `minLength`, `maxLength`, `pattern`, and `format`.
//!
//! Lengths count Unicode scalar values, not bytes. `pattern` is an
//! unanchored search.

use std::sync::Arc;

use regex::Regex;
use serde_json::Value;

use jsv_core::Report;

use super::{count_param, KeywordError};
use crate::context::{ValidationContext, ValidationResult};
use crate::validator::KeywordValidator;

#[derive(Debug)]
struct LengthCheck {
    keyword: &'static str,
    limit: u64,
    at_least: bool,
}

impl KeywordValidator for LengthCheck {
    fn validate(&self, ctx: &ValidationContext<'_>, instance: &Value) -> ValidationResult {
        let Value::String(s) = instance else {
            return Ok(Report::success());
        };
        let len = s.chars().count() as u64;
        if self.at_least && len < self.limit {
            ctx.fail(
                self.keyword,
                format!("string \"{s}\" is too short (length: {len}, required minimum: {})", self.limit),
            )
        } else if !self.at_least && len > self.limit {
            ctx.fail(
                self.keyword,
                format!("string \"{s}\" is too long (length: {len}, maximum allowed: {})", self.limit),
            )
        } else {
            Ok(Report::success())
        }
    }
}

pub(super) fn build_min_length(
    schema: &Value,
) -> Result<Option<Arc<dyn KeywordValidator>>, KeywordError> {
    let limit = count_param(schema, "minLength")?;
    Ok(Some(Arc::new(LengthCheck {
        keyword: "minLength",
        limit,
        at_least: true,
    })))
}

pub(super) fn build_max_length(
    schema: &Value,
) -> Result<Option<Arc<dyn KeywordValidator>>, KeywordError> {
    let limit = count_param(schema, "maxLength")?;
    Ok(Some(Arc::new(LengthCheck {
        keyword: "maxLength",
        limit,
        at_least: false,
    })))
}

#[derive(Debug)]
struct PatternCheck {
    regex: Regex,
}

impl KeywordValidator for PatternCheck {
    fn validate(&self, ctx: &ValidationContext<'_>, instance: &Value) -> ValidationResult {
        match instance {
            Value::String(s) if !self.regex.is_match(s) => ctx.fail(
                "pattern",
                format!("string \"{s}\" does not match pattern \"{}\"", self.regex.as_str()),
            ),
            _ => Ok(Report::success()),
        }
    }
}

pub(super) fn build_pattern(
    schema: &Value,
) -> Result<Option<Arc<dyn KeywordValidator>>, KeywordError> {
    let Some(Value::String(pattern)) = schema.get("pattern") else {
        return Err(KeywordError::invalid("pattern", "expected a string"));
    };
    let regex = Regex::new(pattern)
        .map_err(|e| KeywordError::invalid("pattern", format!("invalid regular expression: {e}")))?;
    Ok(Some(Arc::new(PatternCheck { regex })))
}

/// Delegates to the factory's format lookup when it runs, so that unknown
/// formats follow the configured failure mode.
#[derive(Debug)]
struct FormatKeyword {
    name: String,
}

impl KeywordValidator for FormatKeyword {
    fn validate(&self, ctx: &ValidationContext<'_>, instance: &Value) -> ValidationResult {
        ctx.factory()
            .get_format_validator(ctx, &self.name, instance)?
            .validate(ctx, instance)
    }
}

pub(super) fn build_format(
    schema: &Value,
) -> Result<Option<Arc<dyn KeywordValidator>>, KeywordError> {
    match schema.get("format") {
        Some(Value::String(name)) => Ok(Some(Arc::new(FormatKeyword { name: name.clone() }))),
        _ => Err(KeywordError::invalid("format", "expected a string")),
    }
}
