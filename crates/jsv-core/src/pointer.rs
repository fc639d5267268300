//! # JSON Pointer — RFC 6901 Paths
//!
//! [`JsonPointer`] addresses a node inside a document. The engine uses it for
//! two purposes:
//!
//! - diagnostics: every report message carries the instance path and the
//!   schema path that produced it;
//! - `$ref` resolution: local references (`#/definitions/foo`) are pointers
//!   into the root schema.
//!
//! Pointers are immutable values. Descending produces a new pointer; the
//! parent is never modified.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::CoreError;

/// An RFC 6901 JSON Pointer, stored as unescaped reference tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct JsonPointer {
    tokens: Vec<String>,
}

impl JsonPointer {
    /// The empty pointer, addressing the whole document.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a pointer such as `/properties/a~1b`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidPointer`] if the text is non-empty and does
    /// not start with `/`, or contains a `~` not followed by `0` or `1`.
    pub fn parse(text: &str) -> Result<Self, CoreError> {
        if text.is_empty() {
            return Ok(Self::root());
        }
        let Some(rest) = text.strip_prefix('/') else {
            return Err(CoreError::InvalidPointer {
                pointer: text.to_string(),
                reason: "must be empty or start with '/'".to_string(),
            });
        };
        let tokens = rest
            .split('/')
            .map(|raw| unescape(raw).ok_or_else(|| CoreError::InvalidPointer {
                pointer: text.to_string(),
                reason: format!("bad escape sequence in token '{raw}'"),
            }))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { tokens })
    }

    /// Parse a URI fragment reference such as `#/definitions/node` or `#`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidPointer`] if `reference` is not a local
    /// fragment or the fragment is not a valid pointer.
    pub fn parse_fragment(reference: &str) -> Result<Self, CoreError> {
        let Some(fragment) = reference.strip_prefix('#') else {
            return Err(CoreError::InvalidPointer {
                pointer: reference.to_string(),
                reason: "only local '#' references are supported".to_string(),
            });
        };
        Self::parse(fragment)
    }

    /// A new pointer with `token` appended.
    pub fn push(&self, token: impl Into<String>) -> Self {
        let mut tokens = self.tokens.clone();
        tokens.push(token.into());
        Self { tokens }
    }

    /// A new pointer with an array index appended.
    pub fn push_index(&self, index: usize) -> Self {
        self.push(index.to_string())
    }

    /// Whether this is the root pointer.
    pub fn is_root(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The unescaped reference tokens.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Resolve the pointer against a document.
    pub fn resolve<'v>(&self, document: &'v Value) -> Option<&'v Value> {
        self.tokens.iter().try_fold(document, |node, token| match node {
            Value::Object(map) => map.get(token),
            Value::Array(items) => parse_index(token).and_then(|i| items.get(i)),
            _ => None,
        })
    }
}

impl fmt::Display for JsonPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            f.write_str("/")?;
            f.write_str(&token.replace('~', "~0").replace('/', "~1"))?;
        }
        Ok(())
    }
}

impl Serialize for JsonPointer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn unescape(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '~' {
            match chars.next() {
                Some('0') => out.push('~'),
                Some('1') => out.push('/'),
                _ => return None,
            }
        } else {
            out.push(c);
        }
    }
    Some(out)
}

/// Array indices are decimal without leading zeros (RFC 6901 §4).
fn parse_index(token: &str) -> Option<usize> {
    if token.len() > 1 && token.starts_with('0') {
        return None;
    }
    if !token.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}
