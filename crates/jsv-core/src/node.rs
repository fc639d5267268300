//! # Node Classification — Single Source of Structural Kinds
//!
//! Defines the [`NodeType`] enum with the seven structural kinds of a JSON
//! document node. This is the ONE classification used across the engine:
//! cache keys, keyword applicability and container wrapping all match on it
//! exhaustively.
//!
//! ## Integer vs Number
//!
//! A number is an `Integer` iff it is stored as an integer (`i64` or `u64`).
//! `1.0` parsed from text is a `Number`. The `"number"` schema type accepts
//! both kinds; see [`NodeType::is_numeric`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;

/// The structural kind of a document node.
///
/// Derived purely from the node's shape; total and exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// A JSON object.
    Object,
    /// A JSON array.
    Array,
    /// A JSON string.
    String,
    /// A JSON number stored as an integer.
    Integer,
    /// Any other JSON number.
    Number,
    /// `true` or `false`.
    Boolean,
    /// `null`.
    Null,
}

/// Total number of [`NodeType`] variants.
pub const NODE_TYPE_COUNT: usize = 7;

impl NodeType {
    /// All kinds, in declaration order.
    pub const ALL: [NodeType; NODE_TYPE_COUNT] = [
        Self::Object,
        Self::Array,
        Self::String,
        Self::Integer,
        Self::Number,
        Self::Boolean,
        Self::Null,
    ];

    /// Kinds that numeric keywords (`minimum`, `multipleOf`, ...) apply to.
    pub const NUMERIC: [NodeType; 2] = [Self::Integer, Self::Number];

    /// Classify a document node.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Object(_) => Self::Object,
            Value::Array(_) => Self::Array,
            Value::String(_) => Self::String,
            Value::Number(n) if n.is_i64() || n.is_u64() => Self::Integer,
            Value::Number(_) => Self::Number,
            Value::Bool(_) => Self::Boolean,
            Value::Null => Self::Null,
        }
    }

    /// The schema `type` name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Array => "array",
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Null => "null",
        }
    }

    /// Whether this kind is a container with children to descend into.
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Object | Self::Array)
    }

    /// Whether this kind is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer | Self::Number)
    }

    /// Whether a node of this kind satisfies the schema type named `other`.
    ///
    /// Identical to equality except that `Integer` also satisfies `Number`.
    pub fn satisfies(&self, other: NodeType) -> bool {
        *self == other || (*self == Self::Integer && other == Self::Number)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::UnknownNodeType {
                name: s.to_string(),
            })
    }
}
