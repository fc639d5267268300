//! Keywords applying to every kind: `type` and `enum`.

use std::cmp::Ordering;
use std::sync::Arc;

use serde_json::Value;

use jsv_core::{NodeType, Report};

use super::numeric::compare_numbers;
use super::KeywordError;
use crate::context::{ValidationContext, ValidationResult};
use crate::validator::KeywordValidator;

/// JSON equality with numbers compared by value (`1` equals `1.0`).
pub fn json_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => compare_numbers(x, y) == Some(Ordering::Equal),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| json_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| json_equal(x, y)))
        }
        _ => a == b,
    }
}

#[derive(Debug)]
struct TypeCheck {
    allowed: Vec<NodeType>,
}

impl KeywordValidator for TypeCheck {
    fn validate(&self, ctx: &ValidationContext<'_>, instance: &Value) -> ValidationResult {
        let kind = NodeType::of(instance);
        if self.allowed.iter().any(|t| kind.satisfies(*t)) {
            return Ok(Report::success());
        }
        let names: Vec<&str> = self.allowed.iter().map(NodeType::as_str).collect();
        ctx.fail(
            "type",
            format!("instance type ({kind}) does not match any allowed type ({})", names.join(", ")),
        )
    }
}

pub(super) fn build_type(
    schema: &Value,
) -> Result<Option<Arc<dyn KeywordValidator>>, KeywordError> {
    let parse = |name: &Value| {
        name.as_str()
            .and_then(|s| s.parse::<NodeType>().ok())
            .ok_or_else(|| KeywordError::invalid("type", format!("unknown type {name}")))
    };
    let allowed = match schema.get("type") {
        Some(Value::Array(names)) => names.iter().map(parse).collect::<Result<Vec<_>, _>>()?,
        Some(name) => vec![parse(name)?],
        None => return Ok(None),
    };
    Ok(Some(Arc::new(TypeCheck { allowed })))
}

#[derive(Debug)]
struct EnumCheck {
    options: Vec<Value>,
}

impl KeywordValidator for EnumCheck {
    fn validate(&self, ctx: &ValidationContext<'_>, instance: &Value) -> ValidationResult {
        if self.options.iter().any(|option| json_equal(option, instance)) {
            Ok(Report::success())
        } else {
            ctx.fail("enum", format!("instance value ({instance}) not found in enum"))
        }
    }
}

pub(super) fn build_enum(
    schema: &Value,
) -> Result<Option<Arc<dyn KeywordValidator>>, KeywordError> {
    match schema.get("enum") {
        Some(Value::Array(options)) => Ok(Some(Arc::new(EnumCheck {
            options: options.clone(),
        }))),
        _ => Err(KeywordError::invalid("enum", "expected an array")),
    }
}
