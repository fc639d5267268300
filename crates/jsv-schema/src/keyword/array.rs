//! Array keywords: `minItems`, `maxItems`, `uniqueItems`, `additionalItems`.
//!
//! `items` itself has no check here; it only selects child schemas during
//! descent.

use std::sync::Arc;

use serde_json::Value;

use jsv_core::Report;

use super::{count_param, json_equal, KeywordError};
use crate::context::{ValidationContext, ValidationResult};
use crate::validator::KeywordValidator;

#[derive(Debug)]
struct ItemCount {
    keyword: &'static str,
    limit: u64,
    at_least: bool,
}

impl KeywordValidator for ItemCount {
    fn validate(&self, ctx: &ValidationContext<'_>, instance: &Value) -> ValidationResult {
        let Value::Array(items) = instance else {
            return Ok(Report::success());
        };
        let len = items.len() as u64;
        if self.at_least && len < self.limit {
            ctx.fail(
                self.keyword,
                format!("array is too short: must have at least {} elements but has {len}", self.limit),
            )
        } else if !self.at_least && len > self.limit {
            ctx.fail(
                self.keyword,
                format!("array is too long: must have at most {} elements but has {len}", self.limit),
            )
        } else {
            Ok(Report::success())
        }
    }
}

pub(super) fn build_min_items(
    schema: &Value,
) -> Result<Option<Arc<dyn KeywordValidator>>, KeywordError> {
    let limit = count_param(schema, "minItems")?;
    Ok(Some(Arc::new(ItemCount {
        keyword: "minItems",
        limit,
        at_least: true,
    })))
}

pub(super) fn build_max_items(
    schema: &Value,
) -> Result<Option<Arc<dyn KeywordValidator>>, KeywordError> {
    let limit = count_param(schema, "maxItems")?;
    Ok(Some(Arc::new(ItemCount {
        keyword: "maxItems",
        limit,
        at_least: false,
    })))
}

#[derive(Debug)]
struct UniqueItems;

impl KeywordValidator for UniqueItems {
    fn validate(&self, ctx: &ValidationContext<'_>, instance: &Value) -> ValidationResult {
        let Value::Array(items) = instance else {
            return Ok(Report::success());
        };
        for (i, a) in items.iter().enumerate() {
            if let Some(offset) = items[i + 1..].iter().position(|b| json_equal(a, b)) {
                return ctx.fail(
                    "uniqueItems",
                    format!("array must not contain duplicate elements (indices {i} and {})", i + 1 + offset),
                );
            }
        }
        Ok(Report::success())
    }
}

pub(super) fn build_unique_items(
    schema: &Value,
) -> Result<Option<Arc<dyn KeywordValidator>>, KeywordError> {
    match schema.get("uniqueItems") {
        Some(Value::Bool(true)) => Ok(Some(Arc::new(UniqueItems))),
        Some(Value::Bool(false)) => Ok(None),
        _ => Err(KeywordError::invalid("uniqueItems", "expected a boolean")),
    }
}

/// `additionalItems: false` with a tuple `items`: no elements beyond the
/// tuple.
#[derive(Debug)]
struct NoAdditionalItems {
    allowed: usize,
}

impl KeywordValidator for NoAdditionalItems {
    fn validate(&self, ctx: &ValidationContext<'_>, instance: &Value) -> ValidationResult {
        match instance {
            Value::Array(items) if items.len() > self.allowed => ctx.fail(
                "additionalItems",
                format!(
                    "array may only have {} elements ({} found)",
                    self.allowed,
                    items.len()
                ),
            ),
            _ => Ok(Report::success()),
        }
    }
}

pub(super) fn build_additional_items(
    schema: &Value,
) -> Result<Option<Arc<dyn KeywordValidator>>, KeywordError> {
    match (schema.get("additionalItems"), schema.get("items")) {
        (Some(Value::Bool(false)), Some(Value::Array(tuple))) => {
            Ok(Some(Arc::new(NoAdditionalItems { allowed: tuple.len() })))
        }
        (Some(Value::Bool(_) | Value::Object(_)), _) => Ok(None),
        _ => Err(KeywordError::invalid(
            "additionalItems",
            "expected a boolean or a schema",
        )),
    }
}
