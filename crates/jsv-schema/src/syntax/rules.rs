//! Draft-04 keyword syntax rules.

use std::collections::HashSet;

use regex::Regex;
use serde_json::Value;

use jsv_core::{JsonPointer, NodeType};

use super::SyntaxRule;
use crate::keyword::json_equal;

type Check = Result<(), String>;

/// Rules for every draft-04 keyword the default vocabulary understands.
pub fn draft4_rules() -> Vec<SyntaxRule> {
    vec![
        SyntaxRule::new("$ref", check_ref),
        SyntaxRule::new("type", check_type),
        SyntaxRule::new("enum", check_enum),
        SyntaxRule::new("format", |v, _| expect_string(v)),
        SyntaxRule::new("allOf", check_schema_array),
        SyntaxRule::new("anyOf", check_schema_array),
        SyntaxRule::new("oneOf", check_schema_array),
        SyntaxRule::new("not", |v, _| expect_schema(v)),
        SyntaxRule::new("minimum", |v, _| expect_number(v)),
        SyntaxRule::new("maximum", |v, _| expect_number(v)),
        SyntaxRule::new("exclusiveMinimum", |v, s| check_exclusive(v, s, "minimum")),
        SyntaxRule::new("exclusiveMaximum", |v, s| check_exclusive(v, s, "maximum")),
        SyntaxRule::new("multipleOf", check_multiple_of),
        SyntaxRule::new("minLength", |v, _| expect_count(v)),
        SyntaxRule::new("maxLength", |v, _| expect_count(v)),
        SyntaxRule::new("pattern", check_pattern),
        SyntaxRule::new("items", check_items),
        SyntaxRule::new("additionalItems", |v, _| expect_bool_or_schema(v)),
        SyntaxRule::new("minItems", |v, _| expect_count(v)),
        SyntaxRule::new("maxItems", |v, _| expect_count(v)),
        SyntaxRule::new("uniqueItems", |v, _| expect_bool(v)),
        SyntaxRule::new("required", check_required),
        SyntaxRule::new("minProperties", |v, _| expect_count(v)),
        SyntaxRule::new("maxProperties", |v, _| expect_count(v)),
        SyntaxRule::new("properties", |v, _| expect_schema_map(v)),
        SyntaxRule::new("patternProperties", check_pattern_properties),
        SyntaxRule::new("additionalProperties", |v, _| expect_bool_or_schema(v)),
        SyntaxRule::new("dependencies", check_dependencies),
        SyntaxRule::new("definitions", |v, _| expect_schema_map(v)),
    ]
}

// ---------------------------------------------------------------------------
// Shape helpers
// ---------------------------------------------------------------------------

fn found(value: &Value) -> NodeType {
    NodeType::of(value)
}

fn expect_string(value: &Value) -> Check {
    match value {
        Value::String(_) => Ok(()),
        other => Err(format!("expected a string, found {}", found(other))),
    }
}

fn expect_bool(value: &Value) -> Check {
    match value {
        Value::Bool(_) => Ok(()),
        other => Err(format!("expected a boolean, found {}", found(other))),
    }
}

fn expect_number(value: &Value) -> Check {
    match value {
        Value::Number(_) => Ok(()),
        other => Err(format!("expected a number, found {}", found(other))),
    }
}

fn expect_count(value: &Value) -> Check {
    match value {
        Value::Number(n) if n.as_u64().is_some() => Ok(()),
        Value::Number(n) => Err(format!("expected a non-negative integer, found {n}")),
        other => Err(format!("expected a non-negative integer, found {}", found(other))),
    }
}

fn expect_schema(value: &Value) -> Check {
    match value {
        Value::Object(_) => Ok(()),
        other => Err(format!("expected a schema (object), found {}", found(other))),
    }
}

fn expect_bool_or_schema(value: &Value) -> Check {
    match value {
        Value::Bool(_) | Value::Object(_) => Ok(()),
        other => Err(format!("expected a boolean or a schema, found {}", found(other))),
    }
}

fn expect_schema_map(value: &Value) -> Check {
    let Value::Object(members) = value else {
        return Err(format!("expected an object of schemas, found {}", found(value)));
    };
    match members.iter().find(|(_, sub)| !sub.is_object()) {
        Some((name, sub)) => Err(format!("member '{name}' is not a schema (found {})", found(sub))),
        None => Ok(()),
    }
}

fn expect_unique_strings(value: &Value, allow_empty: bool) -> Check {
    let Value::Array(items) = value else {
        return Err(format!("expected an array of strings, found {}", found(value)));
    };
    if items.is_empty() && !allow_empty {
        return Err("array must not be empty".to_string());
    }
    let mut seen = HashSet::new();
    for item in items {
        let Value::String(s) = item else {
            return Err(format!("array elements must be strings, found {}", found(item)));
        };
        if !seen.insert(s.as_str()) {
            return Err(format!("duplicate element '{s}'"));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Keyword rules
// ---------------------------------------------------------------------------

fn check_ref(value: &Value, _schema: &Value) -> Check {
    let Value::String(reference) = value else {
        return Err(format!("expected a string, found {}", found(value)));
    };
    if reference.starts_with('#') {
        JsonPointer::parse_fragment(reference)
            .map(|_| ())
            .map_err(|e| e.to_string())
    } else {
        Ok(())
    }
}

fn check_type_name(value: &Value) -> Check {
    match value {
        Value::String(name) => name
            .parse::<NodeType>()
            .map(|_| ())
            .map_err(|e| e.to_string()),
        other => Err(format!("type names must be strings, found {}", found(other))),
    }
}

fn check_type(value: &Value, _schema: &Value) -> Check {
    match value {
        Value::Array(names) => {
            if names.is_empty() {
                return Err("type array must not be empty".to_string());
            }
            names.iter().try_for_each(check_type_name)?;
            if has_duplicates(names) {
                return Err("type array elements must be unique".to_string());
            }
            Ok(())
        }
        other => check_type_name(other),
    }
}

fn check_enum(value: &Value, _schema: &Value) -> Check {
    let Value::Array(options) = value else {
        return Err(format!("expected an array, found {}", found(value)));
    };
    if options.is_empty() {
        return Err("enum must not be empty".to_string());
    }
    if has_duplicates(options) {
        return Err("enum elements must be unique".to_string());
    }
    Ok(())
}

fn check_schema_array(value: &Value, _schema: &Value) -> Check {
    let Value::Array(schemas) = value else {
        return Err(format!("expected an array of schemas, found {}", found(value)));
    };
    if schemas.is_empty() {
        return Err("array must not be empty".to_string());
    }
    match schemas.iter().position(|s| !s.is_object()) {
        Some(i) => Err(format!("element {i} is not a schema")),
        None => Ok(()),
    }
}

fn check_exclusive(value: &Value, schema: &Value, bound: &str) -> Check {
    expect_bool(value)?;
    if schema.get(bound).is_none() {
        return Err(format!("requires '{bound}' to be present"));
    }
    Ok(())
}

fn check_multiple_of(value: &Value, _schema: &Value) -> Check {
    match value.as_f64() {
        Some(divisor) if divisor > 0.0 => Ok(()),
        Some(_) => Err("must be strictly greater than 0".to_string()),
        None => Err(format!("expected a number, found {}", found(value))),
    }
}

fn check_pattern(value: &Value, _schema: &Value) -> Check {
    let Value::String(pattern) = value else {
        return Err(format!("expected a string, found {}", found(value)));
    };
    Regex::new(pattern)
        .map(|_| ())
        .map_err(|e| format!("invalid regular expression: {e}"))
}

fn check_items(value: &Value, _schema: &Value) -> Check {
    match value {
        Value::Object(_) => Ok(()),
        Value::Array(schemas) => match schemas.iter().position(|s| !s.is_object()) {
            Some(i) => Err(format!("element {i} is not a schema")),
            None => Ok(()),
        },
        other => Err(format!("expected a schema or an array of schemas, found {}", found(other))),
    }
}

fn check_required(value: &Value, _schema: &Value) -> Check {
    expect_unique_strings(value, false)
}

fn check_pattern_properties(value: &Value, _schema: &Value) -> Check {
    expect_schema_map(value)?;
    if let Value::Object(members) = value {
        for pattern in members.keys() {
            if let Err(e) = Regex::new(pattern) {
                return Err(format!("invalid regular expression '{pattern}': {e}"));
            }
        }
    }
    Ok(())
}

fn check_dependencies(value: &Value, _schema: &Value) -> Check {
    let Value::Object(members) = value else {
        return Err(format!("expected an object, found {}", found(value)));
    };
    for (name, dependency) in members {
        match dependency {
            Value::Object(_) => {}
            Value::Array(_) => expect_unique_strings(dependency, false)
                .map_err(|reason| format!("dependency '{name}': {reason}"))?,
            other => {
                return Err(format!(
                    "dependency '{name}' must be a schema or an array of strings, found {}",
                    found(other)
                ))
            }
        }
    }
    Ok(())
}

fn has_duplicates(values: &[Value]) -> bool {
    values
        .iter()
        .enumerate()
        .any(|(i, a)| values[i + 1..].iter().any(|b| json_equal(a, b)))
}
