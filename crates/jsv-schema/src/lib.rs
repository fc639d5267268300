//! # jsv-schema — Validator Compilation & Caching Engine
//!
//! Turns a schema document plus the structural kind of an instance into an
//! executable [`Validator`], memoizes it per (kind, schema content), and runs
//! it to produce a [`Report`](jsv_core::Report).
//!
//! ## Orchestration (`factory`)
//!
//! [`ValidatorFactory`] owns every piece of long-lived state: the keyword,
//! syntax and format registries, the validator cache and the set of schemas
//! already known to be well formed. One factory is meant to be shared
//! (`Arc<ValidatorFactory>`) across many validation calls and threads.
//!
//! ```text
//! validate(ctx, instance)
//!   ├─ schema already validated? ── no ──▶ validate_schema(ctx) ── fails ──▶ report
//!   └─ get_instance_validator(ctx, instance)
//!        ClassifyKind ─▶ CacheLookup ─┬─ hit ───────────────────────────────▶ Validator
//!                                     └─ miss ─▶ Compile ─▶ Compose ─▶ Wrap ─▶ Store
//! ```
//!
//! ## Failure Modes
//!
//! Every validator returns a [`ValidationResult`]. In soft mode violations
//! are collected into the report. With [`ValidationFeature::FailFast`] the
//! first violation aborts with `Err(ValidationFailure)`; `?` carries it out
//! of every composite.
//!
//! Exceeding `max_depth` or `max_subschema_chain` is a limit failure. It
//! aborts in both modes and escapes `anyOf`, `oneOf` and `not` so that a
//! cyclic schema can never turn into a pass. In soft mode the entry point
//! reports it as a failing report under keyword `depth`.
//!
//! ## Registries
//!
//! Keyword meaning, keyword syntax and string formats are pluggable through
//! [`ValidatorBundle`]. [`ValidatorBundle::draft4`] provides the draft-04
//! vocabulary.
//!
//! ## Crate Policy
//!
//! - Depends only on `jsv-core` internally.
//! - Cache and validated-set operations never fail.
//! - No `.unwrap()` outside tests.

pub mod bundle;
pub mod cache;
pub mod config;
pub mod container;
pub mod context;
pub mod error;
pub mod factory;
pub mod format;
pub mod json_validator;
pub mod keyword;
pub mod loader;
pub mod patterns;
pub mod syntax;
pub mod validator;

pub use bundle::ValidatorBundle;
pub use cache::{CacheKey, CacheStats, ValidatorCache};
pub use config::{
    ConfigError, ValidationConfig, ValidationFeature, DEFAULT_MAX_DEPTH, DEFAULT_MAX_SUBSCHEMA_CHAIN,
};
pub use context::{FailureKind, ValidationContext, ValidationFailure, ValidationResult};
pub use error::JsvError;
pub use factory::ValidatorFactory;
pub use format::{FormatCheck, FormatRegistry};
pub use json_validator::JsonValidator;
pub use keyword::{KeywordError, KeywordRegistry};
pub use loader::{load_document, DocumentFormat, LoadError};
pub use syntax::{subschemas, SyntaxChecker, SyntaxRegistry, SyntaxRule};
pub use validator::{KeywordValidator, Unsatisfiable, Validator};
