//! # Validator
//!
//! The executable form of a schema for one structural kind. [`Validator`] is
//! a closed sum type: every way the engine can combine checks is one of its
//! variants, and matches over it are exhaustive.
//!
//! Leaf checks are open. Anything implementing [`KeywordValidator`] can be
//! registered and ends up inside `Single` or `All`.
//!
//! ## Composition
//!
//! | delegates | result |
//! |-----------|--------|
//! | 0 | `AlwaysTrue` |
//! | 1 | `Single(d)` |
//! | n ≥ 2 | `All([d1..dn])` |
//!
//! Validators are stateless and never mutate the context or the instance;
//! a built validator can be shared across threads behind an `Arc`.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use jsv_core::{NodeType, Report};

use crate::container;
use crate::context::{ValidationContext, ValidationResult};

/// A single keyword check.
pub trait KeywordValidator: Send + Sync + fmt::Debug {
    /// Check `instance` against the schema in `ctx`.
    ///
    /// Violations go through [`ValidationContext::fail`] so the factory's
    /// failure mode is honored.
    fn validate(&self, ctx: &ValidationContext<'_>, instance: &Value) -> ValidationResult;
}

/// Executable validator for one (kind, schema) pair.
#[derive(Debug, Clone)]
pub enum Validator {
    /// Accepts every instance.
    AlwaysTrue,
    /// Exactly one keyword check.
    Single(Arc<dyn KeywordValidator>),
    /// Two or more keyword checks, all of which must pass.
    All(Vec<Arc<dyn KeywordValidator>>),
    /// Runs the inner validator on the array, then descends into elements.
    ArrayContainer(Box<Validator>),
    /// Runs the inner validator on the object, then descends into members.
    ObjectContainer(Box<Validator>),
}

impl Validator {
    /// Combine keyword checks with AND semantics by arity.
    pub fn compose(mut delegates: Vec<Arc<dyn KeywordValidator>>) -> Self {
        match delegates.len() {
            0 => Self::AlwaysTrue,
            1 => match delegates.pop() {
                Some(only) => Self::Single(only),
                None => Self::AlwaysTrue,
            },
            _ => Self::All(delegates),
        }
    }

    /// Wrap a composed validator for the instance kind. Containers descend
    /// into children; scalars use the composed validator as is.
    pub fn wrap(kind: NodeType, composed: Validator) -> Self {
        match kind {
            NodeType::Array => Self::ArrayContainer(Box::new(composed)),
            NodeType::Object => Self::ObjectContainer(Box::new(composed)),
            NodeType::String
            | NodeType::Integer
            | NodeType::Number
            | NodeType::Boolean
            | NodeType::Null => composed,
        }
    }

    /// Number of keyword checks reachable without descent.
    pub fn delegate_count(&self) -> usize {
        match self {
            Self::AlwaysTrue => 0,
            Self::Single(_) => 1,
            Self::All(delegates) => delegates.len(),
            Self::ArrayContainer(inner) | Self::ObjectContainer(inner) => inner.delegate_count(),
        }
    }

    /// Run the validator.
    pub fn validate(&self, ctx: &ValidationContext<'_>, instance: &Value) -> ValidationResult {
        match self {
            Self::AlwaysTrue => Ok(Report::success()),
            Self::Single(delegate) => delegate.validate(ctx, instance),
            Self::All(delegates) => {
                let mut report = Report::success();
                for delegate in delegates {
                    report.merge_from(delegate.validate(ctx, instance)?);
                }
                Ok(report)
            }
            Self::ArrayContainer(inner) => container::validate_array(inner, ctx, instance),
            Self::ObjectContainer(inner) => container::validate_object(inner, ctx, instance),
        }
    }
}

/// A check that always fails with a fixed message.
///
/// Stands in for keywords whose parameters could not be compiled and for
/// unknown formats in soft mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unsatisfiable {
    keyword: String,
    message: String,
}

impl Unsatisfiable {
    /// A check failing under `keyword` with `message`.
    pub fn new(keyword: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            message: message.into(),
        }
    }
}

impl KeywordValidator for Unsatisfiable {
    fn validate(&self, ctx: &ValidationContext<'_>, _instance: &Value) -> ValidationResult {
        ctx.fail(&self.keyword, self.message.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ValidationConfig, ValidationFeature};
    use crate::factory::ValidatorFactory;
    use serde_json::json;

    #[derive(Debug)]
    struct Reject(&'static str);

    impl KeywordValidator for Reject {
        fn validate(&self, ctx: &ValidationContext<'_>, _instance: &Value) -> ValidationResult {
            ctx.fail(self.0, format!("{} rejected", self.0))
        }
    }

    #[derive(Debug)]
    struct Accept;

    impl KeywordValidator for Accept {
        fn validate(&self, _ctx: &ValidationContext<'_>, _instance: &Value) -> ValidationResult {
            Ok(Report::success())
        }
    }

    fn delegates(n: usize) -> Vec<Arc<dyn KeywordValidator>> {
        (0..n).map(|_| Arc::new(Accept) as Arc<dyn KeywordValidator>).collect()
    }

    #[test]
    fn test_compose_arity() {
        assert!(matches!(Validator::compose(delegates(0)), Validator::AlwaysTrue));
        assert!(matches!(Validator::compose(delegates(1)), Validator::Single(_)));
        match Validator::compose(delegates(3)) {
            Validator::All(ds) => assert_eq!(ds.len(), 3),
            other => panic!("expected All, got {other:?}"),
        }
    }

    #[test]
    fn test_wrap_by_kind() {
        for kind in NodeType::ALL {
            let wrapped = Validator::wrap(kind, Validator::AlwaysTrue);
            match kind {
                NodeType::Array => assert!(matches!(wrapped, Validator::ArrayContainer(_))),
                NodeType::Object => assert!(matches!(wrapped, Validator::ObjectContainer(_))),
                _ => assert!(matches!(wrapped, Validator::AlwaysTrue)),
            }
        }
    }

    #[test]
    fn test_all_collects_every_message_in_order() {
        let factory = ValidatorFactory::draft4(ValidationConfig::default());
        let schema = json!({});
        let ctx = ValidationContext::new(&factory, &schema);
        let v = Validator::All(vec![Arc::new(Reject("a")), Arc::new(Accept), Arc::new(Reject("b"))]);

        let report = v.validate(&ctx, &json!(1)).unwrap();
        assert!(!report.is_success());
        let kws: Vec<_> = report.messages().iter().map(|m| m.keyword.as_str()).collect();
        assert_eq!(kws, ["a", "b"]);
    }

    #[test]
    fn test_all_stops_at_first_failure_in_fail_fast() {
        let config = ValidationConfig::default().with_feature(ValidationFeature::FailFast);
        let factory = ValidatorFactory::draft4(config);
        let schema = json!({});
        let ctx = ValidationContext::new(&factory, &schema);
        let v = Validator::All(vec![Arc::new(Reject("a")), Arc::new(Reject("b"))]);

        let failure = v.validate(&ctx, &json!(1)).unwrap_err();
        assert_eq!(failure.message.keyword, "a");
    }

    #[test]
    fn test_unsatisfiable_always_fails() {
        let factory = ValidatorFactory::draft4(ValidationConfig::default());
        let schema = json!({});
        let ctx = ValidationContext::new(&factory, &schema);
        let v = Validator::Single(Arc::new(Unsatisfiable::new("format", "no validator for format 'x'")));
        for instance in [json!(null), json!("s"), json!({})] {
            assert!(!v.validate(&ctx, &instance).unwrap().is_success());
        }
    }

    #[test]
    fn test_delegate_count_sees_through_containers() {
        let inner = Validator::compose(delegates(2));
        assert_eq!(Validator::wrap(NodeType::Object, inner).delegate_count(), 2);
    }
}
