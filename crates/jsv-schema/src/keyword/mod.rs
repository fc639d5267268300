//! # Keyword Registry
//!
//! Maps keywords to builders that turn a schema into keyword checks. The
//! engine calls [`KeywordRegistry::keyword_validators_for`] on a cache miss
//! and composes whatever comes back; it knows nothing about individual
//! keywords.
//!
//! ## Builders
//!
//! A builder receives the whole schema (so `exclusiveMinimum` can see
//! `minimum`) and returns:
//!
//! - `Ok(Some(check))` when the keyword constrains the instance,
//! - `Ok(None)` when it imposes nothing (`uniqueItems: false`,
//!   `additionalProperties` given as a schema, which descent handles),
//! - `Err(KeywordError)` when its parameters are unusable. That can only
//!   happen with syntax checking skipped; the keyword is then replaced by a
//!   check that always fails and says why.
//!
//! Builders run once per (kind, schema) because their output is cached.
//! Checks that need a subschema (`allOf`, `$ref`, schema `dependencies`)
//! read it from the context when they run.

mod array;
mod combinator;
mod common;
mod numeric;
mod object;
mod string;

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use jsv_core::NodeType;

use crate::context::ValidationContext;
use crate::validator::{KeywordValidator, Unsatisfiable};

pub use common::json_equal;

/// Builds the check for one keyword from its schema.
pub type KeywordBuilder = Arc<
    dyn Fn(&Value) -> Result<Option<Arc<dyn KeywordValidator>>, KeywordError> + Send + Sync,
>;

/// A keyword's parameters could not be turned into a check.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeywordError {
    /// The keyword value has the wrong shape or an impossible value.
    #[error("invalid value for '{keyword}': {reason}")]
    InvalidParameter {
        /// The keyword.
        keyword: String,
        /// What is wrong with it.
        reason: String,
    },
}

impl KeywordError {
    pub(crate) fn invalid(keyword: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            keyword: keyword.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Clone)]
struct KeywordEntry {
    keyword: String,
    kinds: Vec<NodeType>,
    builder: KeywordBuilder,
}

impl fmt::Debug for KeywordEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeywordEntry")
            .field("keyword", &self.keyword)
            .field("kinds", &self.kinds)
            .finish_non_exhaustive()
    }
}

/// Ordered keyword table.
#[derive(Debug, Clone, Default)]
pub struct KeywordRegistry {
    entries: Vec<KeywordEntry>,
}

impl KeywordRegistry {
    /// An empty registry: every schema compiles to `AlwaysTrue`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `keyword` for instances of `kinds`, replacing any existing
    /// entry in place (registration order is evaluation order).
    pub fn register<F>(&mut self, keyword: impl Into<String>, kinds: &[NodeType], builder: F)
    where
        F: Fn(&Value) -> Result<Option<Arc<dyn KeywordValidator>>, KeywordError>
            + Send
            + Sync
            + 'static,
    {
        let entry = KeywordEntry {
            keyword: keyword.into(),
            kinds: kinds.to_vec(),
            builder: Arc::new(builder),
        };
        match self.entries.iter_mut().find(|e| e.keyword == entry.keyword) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    /// Whether `keyword` is registered.
    pub fn contains(&self, keyword: &str) -> bool {
        self.entries.iter().any(|e| e.keyword == keyword)
    }

    /// Registered keywords in evaluation order.
    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.keyword.as_str())
    }

    /// Checks for every registered keyword present in the context's schema
    /// that applies to the instance's kind, in registry order.
    pub fn keyword_validators_for(
        &self,
        ctx: &ValidationContext<'_>,
        instance: &Value,
    ) -> Vec<Arc<dyn KeywordValidator>> {
        let Value::Object(members) = ctx.schema() else {
            return Vec::new();
        };
        let kind = NodeType::of(instance);
        let mut checks = Vec::new();
        for entry in &self.entries {
            if !members.contains_key(entry.keyword.as_str()) || !entry.kinds.contains(&kind) {
                continue;
            }
            match (entry.builder)(ctx.schema()) {
                Ok(Some(check)) => checks.push(check),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(
                        keyword = %entry.keyword,
                        schema_path = %ctx.schema_path(),
                        error = %e,
                        "keyword parameters unusable, substituting failing check"
                    );
                    checks.push(Arc::new(Unsatisfiable::new(entry.keyword.clone(), e.to_string())));
                }
            }
        }
        checks
    }

    /// The draft-04 vocabulary.
    pub fn draft4() -> Self {
        use NodeType::{Array, Object, String as Str};

        let all = NodeType::ALL;
        let numeric = NodeType::NUMERIC;

        let mut r = Self::new();
        r.register("$ref", &all, combinator::build_ref);
        r.register("type", &all, common::build_type);
        r.register("enum", &all, common::build_enum);
        r.register("format", &all, string::build_format);
        r.register("allOf", &all, combinator::build_all_of);
        r.register("anyOf", &all, combinator::build_any_of);
        r.register("oneOf", &all, combinator::build_one_of);
        r.register("not", &all, combinator::build_not);
        r.register("minimum", &numeric, numeric::build_minimum);
        r.register("maximum", &numeric, numeric::build_maximum);
        r.register("multipleOf", &numeric, numeric::build_multiple_of);
        r.register("minLength", &[Str], string::build_min_length);
        r.register("maxLength", &[Str], string::build_max_length);
        r.register("pattern", &[Str], string::build_pattern);
        r.register("minItems", &[Array], array::build_min_items);
        r.register("maxItems", &[Array], array::build_max_items);
        r.register("uniqueItems", &[Array], array::build_unique_items);
        r.register("additionalItems", &[Array], array::build_additional_items);
        r.register("required", &[Object], object::build_required);
        r.register("minProperties", &[Object], object::build_min_properties);
        r.register("maxProperties", &[Object], object::build_max_properties);
        r.register("additionalProperties", &[Object], object::build_additional_properties);
        r.register("dependencies", &[Object], object::build_dependencies);
        r
    }
}

/// Read a non-negative integer parameter.
pub(crate) fn count_param(schema: &Value, keyword: &str) -> Result<u64, KeywordError> {
    schema
        .get(keyword)
        .and_then(Value::as_u64)
        .ok_or_else(|| KeywordError::invalid(keyword, "expected a non-negative integer"))
}
