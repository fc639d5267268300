//! Numeric keywords: `minimum`/`exclusiveMinimum`, `maximum`/`exclusiveMaximum`
//! and `multipleOf`.
//!
//! Two integers compare exactly (as `i128`); anything involving a float
//! compares as `f64`.

use std::cmp::Ordering;
use std::sync::Arc;

use serde_json::{Number, Value};

use jsv_core::Report;

use super::KeywordError;
use crate::context::{ValidationContext, ValidationResult};
use crate::validator::KeywordValidator;

const MULTIPLE_OF_TOLERANCE: f64 = 1e-9;

fn as_integer(n: &Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}

/// Order two JSON numbers by value. `None` only for NaN, which JSON cannot
/// carry.
pub(crate) fn compare_numbers(a: &Number, b: &Number) -> Option<Ordering> {
    match (as_integer(a), as_integer(b)) {
        (Some(x), Some(y)) => Some(x.cmp(&y)),
        _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Lower,
    Upper,
}

#[derive(Debug)]
struct RangeCheck {
    keyword: &'static str,
    bound: Bound,
    limit: Number,
    exclusive: bool,
}

impl KeywordValidator for RangeCheck {
    fn validate(&self, ctx: &ValidationContext<'_>, instance: &Value) -> ValidationResult {
        let Value::Number(n) = instance else {
            return Ok(Report::success());
        };
        let Some(order) = compare_numbers(n, &self.limit) else {
            return ctx.fail(self.keyword, format!("cannot compare {n} with {}", self.limit));
        };
        let ok = match (self.bound, self.exclusive) {
            (Bound::Lower, false) => order != Ordering::Less,
            (Bound::Lower, true) => order == Ordering::Greater,
            (Bound::Upper, false) => order != Ordering::Greater,
            (Bound::Upper, true) => order == Ordering::Less,
        };
        if ok {
            return Ok(Report::success());
        }
        let relation = match (self.bound, self.exclusive) {
            (Bound::Lower, false) => "lower than the required minimum",
            (Bound::Lower, true) => "not greater than the exclusive minimum",
            (Bound::Upper, false) => "greater than the allowed maximum",
            (Bound::Upper, true) => "not lower than the exclusive maximum",
        };
        ctx.fail(self.keyword, format!("numeric instance {n} is {relation} {}", self.limit))
    }
}

fn build_range(
    schema: &Value,
    keyword: &'static str,
    exclusive_keyword: &'static str,
    bound: Bound,
) -> Result<Option<Arc<dyn KeywordValidator>>, KeywordError> {
    let limit = match schema.get(keyword) {
        Some(Value::Number(n)) => n.clone(),
        _ => return Err(KeywordError::invalid(keyword, "expected a number")),
    };
    let exclusive = match schema.get(exclusive_keyword) {
        None => false,
        Some(Value::Bool(b)) => *b,
        Some(_) => return Err(KeywordError::invalid(exclusive_keyword, "expected a boolean")),
    };
    Ok(Some(Arc::new(RangeCheck {
        keyword,
        bound,
        limit,
        exclusive,
    })))
}

pub(super) fn build_minimum(
    schema: &Value,
) -> Result<Option<Arc<dyn KeywordValidator>>, KeywordError> {
    build_range(schema, "minimum", "exclusiveMinimum", Bound::Lower)
}

pub(super) fn build_maximum(
    schema: &Value,
) -> Result<Option<Arc<dyn KeywordValidator>>, KeywordError> {
    build_range(schema, "maximum", "exclusiveMaximum", Bound::Upper)
}

#[derive(Debug)]
struct MultipleOf {
    divisor: Number,
}

impl MultipleOf {
    fn divides(&self, n: &Number) -> bool {
        if let (Some(x), Some(d)) = (as_integer(n), as_integer(&self.divisor)) {
            return d != 0 && x % d == 0;
        }
        match (n.as_f64(), self.divisor.as_f64()) {
            (Some(x), Some(d)) if d != 0.0 => {
                let quotient = x / d;
                (quotient - quotient.round()).abs() < MULTIPLE_OF_TOLERANCE
            }
            _ => false,
        }
    }
}

impl KeywordValidator for MultipleOf {
    fn validate(&self, ctx: &ValidationContext<'_>, instance: &Value) -> ValidationResult {
        match instance {
            Value::Number(n) if !self.divides(n) => ctx.fail(
                "multipleOf",
                format!("numeric instance {n} is not a multiple of {}", self.divisor),
            ),
            _ => Ok(Report::success()),
        }
    }
}

pub(super) fn build_multiple_of(
    schema: &Value,
) -> Result<Option<Arc<dyn KeywordValidator>>, KeywordError> {
    match schema.get("multipleOf") {
        Some(Value::Number(n)) if n.as_f64().is_some_and(|d| d > 0.0) => {
            Ok(Some(Arc::new(MultipleOf { divisor: n.clone() })))
        }
        _ => Err(KeywordError::invalid("multipleOf", "expected a number greater than 0")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidationConfig;
    use crate::factory::ValidatorFactory;
    use proptest::prelude::*;
    use serde_json::json;

    fn passes(schema: Value, instance: Value) -> bool {
        let factory = ValidatorFactory::draft4(ValidationConfig::default());
        let ctx = ValidationContext::new(&factory, &schema);
        ctx.validate(&instance).unwrap().is_success()
    }

    #[test]
    fn test_minimum_inclusive_and_exclusive() {
        assert!(passes(json!({"minimum": 3}), json!(3)));
        assert!(!passes(json!({"minimum": 3}), json!(2.5)));
        assert!(!passes(json!({"minimum": 3, "exclusiveMinimum": true}), json!(3)));
        assert!(passes(json!({"minimum": 3, "exclusiveMinimum": true}), json!(3.01)));
    }

    #[test]
    fn test_maximum_inclusive_and_exclusive() {
        assert!(passes(json!({"maximum": 1.5}), json!(1)));
        assert!(!passes(json!({"maximum": 1.5}), json!(2)));
        assert!(!passes(json!({"maximum": 0, "exclusiveMaximum": true}), json!(0)));
    }

    #[test]
    fn test_large_integers_compare_exactly() {
        let big = u64::MAX;
        assert!(!passes(json!({"maximum": big - 1}), json!(big)));
        assert!(passes(json!({"minimum": -9_007_199_254_740_993_i64}), json!(-9_007_199_254_740_992_i64)));
    }

    #[test]
    fn test_multiple_of() {
        assert!(passes(json!({"multipleOf": 3}), json!(9)));
        assert!(!passes(json!({"multipleOf": 3}), json!(10)));
        assert!(passes(json!({"multipleOf": 0.1}), json!(0.3)));
        assert!(!passes(json!({"multipleOf": 0.25}), json!(0.3)));
        assert!(passes(json!({"multipleOf": 2}), json!(4.0)));
    }

    #[test]
    fn test_numeric_keywords_ignore_other_kinds() {
        assert!(passes(json!({"minimum": 5, "multipleOf": 7}), json!("abc")));
    }

    #[test]
    fn test_message_wording() {
        let factory = ValidatorFactory::draft4(ValidationConfig::default());
        let schema = json!({"minimum": 10});
        let report = ValidationContext::new(&factory, &schema).validate(&json!(4)).unwrap();
        assert_eq!(
            report.messages()[0].message,
            "numeric instance 4 is lower than the required minimum 10"
        );
    }

    proptest! {
        #[test]
        fn prop_integer_compare_matches_i64(a in any::<i64>(), b in any::<i64>()) {
            prop_assert_eq!(
                compare_numbers(&Number::from(a), &Number::from(b)),
                Some(a.cmp(&b))
            );
        }

        #[test]
        fn prop_integer_multiples(k in -1000i64..1000, d in 1i64..100) {
            let check = MultipleOf { divisor: Number::from(d) };
            prop_assert!(check.divides(&Number::from(k * d)));
        }
    }
}
