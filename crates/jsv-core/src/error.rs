//! # Error Types
//!
//! Errors raised by the foundational types. All errors use `thiserror` for
//! derive-based `Display` and `Error` implementations.
//!
//! Validation verdicts are not errors: a failing instance produces a
//! [`Report`](crate::report::Report) with `success = false`. The types here
//! cover malformed inputs to the helpers themselves.

use thiserror::Error;

/// Top-level error type for `jsv-core`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A JSON Pointer string is not syntactically valid.
    #[error("invalid JSON pointer '{pointer}': {reason}")]
    InvalidPointer {
        /// The offending pointer text.
        pointer: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A string does not name one of the seven structural kinds.
    #[error("unknown node type '{name}'")]
    UnknownNodeType {
        /// The unrecognized type name.
        name: String,
    },

    /// A JSON Pointer is valid but does not address a node in the document.
    #[error("JSON pointer '{pointer}' does not resolve")]
    UnresolvedPointer {
        /// The pointer that failed to resolve.
        pointer: String,
    },
}
