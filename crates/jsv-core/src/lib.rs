//! # jsv-core — Foundational Types for the jsv Validator
//!
//! This crate is the leaf of the jsv workspace. It defines the data types
//! shared by the validation engine and its callers. It depends on nothing
//! internal.
//!
//! ## Key Design Principles
//!
//! 1. **One structural classification.** [`NodeType`] maps every JSON value
//!    to exactly one of seven kinds. Every `match` on it is exhaustive, so a
//!    new kind forces every consumer to handle it.
//!
//! 2. **Content, not identity.** Schemas are compared and cached by their
//!    content. [`SchemaDigest::of`] derives a SHA-256 digest from a
//!    deterministic traversal of the document (object keys sorted, array
//!    order kept), so two structurally equal schemas always share a digest.
//!
//! 3. **Reports are plain data.** [`Report`] is an immutable verdict with
//!    ordered diagnostics. [`Report::SUCCESS`] is the canonical pass value.
//!
//! 4. **Paths are JSON Pointers.** Every diagnostic carries an instance path
//!    and a schema path rendered as RFC 6901 pointers ([`JsonPointer`]).
//!
//! ## Crate Policy
//!
//! - No dependencies on other `jsv-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod node;
pub mod pointer;
pub mod report;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalEncoder;
pub use digest::SchemaDigest;
pub use error::CoreError;
pub use node::NodeType;
pub use pointer::JsonPointer;
pub use report::{Message, Report};
