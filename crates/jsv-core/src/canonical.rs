//! # Canonical Encoding — Structural Byte Production for Schema Keys
//!
//! This module defines [`CanonicalEncoder`], the sole traversal used to turn
//! a JSON document into bytes for content addressing. The validator cache and
//! the validated-schema set both key schemas through it, so two schema
//! documents that are structurally equal always encode to the same bytes,
//! whatever their in-memory identity or key insertion order.
//!
//! ## Encoding Rules
//!
//! Every node is written as a one-byte tag followed by its payload:
//!
//! | Node | Tag | Payload |
//! |------|-----|---------|
//! | `null` | `n` | — |
//! | `true` / `false` | `t` / `f` | — |
//! | unsigned integer | `u` | 8 bytes big-endian |
//! | negative integer | `i` | 8 bytes big-endian |
//! | other number | `d` | IEEE-754 bits, `-0.0` folded to `0.0` |
//! | string | `s` | length (u64 BE) + UTF-8 bytes |
//! | array | `[` | length + elements in order |
//! | object | `{` | length + (key, value) pairs sorted by key |
//!
//! Length prefixes make the encoding prefix-free: no two distinct documents
//! share an encoding. Object members are sorted, array elements are not,
//! matching JSON equality (`serde_json::Value` compares maps without regard
//! to order and arrays element by element).
//!
//! The encoding is infallible. Unlike textual canonical forms it never has to
//! format floating-point numbers.

use serde_json::Value;
use sha2::{Digest, Sha256};

/// A byte sink fed by [`CanonicalEncoder`].
///
/// Implemented for `Vec<u8>` (materialized encodings, used by tests and
/// debugging tools) and for `Sha256` (streaming digests, used by
/// [`SchemaDigest`](crate::digest::SchemaDigest)).
pub trait CanonicalSink {
    /// Append bytes to the sink.
    fn write(&mut self, bytes: &[u8]);
}

impl CanonicalSink for Vec<u8> {
    fn write(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }
}

impl CanonicalSink for Sha256 {
    fn write(&mut self, bytes: &[u8]) {
        self.update(bytes);
    }
}

/// Deterministic in-order traversal of a JSON document.
///
/// Stateless; all methods are associated functions.
#[derive(Debug, Clone, Copy, Default)]
pub struct CanonicalEncoder;

impl CanonicalEncoder {
    /// Encode a document into a fresh byte vector.
    pub fn encode(value: &Value) -> Vec<u8> {
        let mut out = Vec::new();
        Self::write(value, &mut out);
        out
    }

    /// Stream the canonical encoding of `value` into `sink`.
    pub fn write(value: &Value, sink: &mut impl CanonicalSink) {
        match value {
            Value::Null => sink.write(b"n"),
            Value::Bool(true) => sink.write(b"t"),
            Value::Bool(false) => sink.write(b"f"),
            Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    sink.write(b"u");
                    sink.write(&u.to_be_bytes());
                } else if let Some(i) = n.as_i64() {
                    sink.write(b"i");
                    sink.write(&i.to_be_bytes());
                } else {
                    let f = n.as_f64().unwrap_or(0.0);
                    // -0.0 == 0.0 under JSON equality; they must encode alike.
                    let f = if f == 0.0 { 0.0 } else { f };
                    sink.write(b"d");
                    sink.write(&f.to_bits().to_be_bytes());
                }
            }
            Value::String(s) => Self::write_str(s, sink),
            Value::Array(items) => {
                sink.write(b"[");
                Self::write_len(items.len(), sink);
                for item in items {
                    Self::write(item, sink);
                }
            }
            Value::Object(map) => {
                let mut entries: Vec<(&String, &Value)> = map.iter().collect();
                entries.sort_by(|a, b| a.0.cmp(b.0));
                sink.write(b"{");
                Self::write_len(entries.len(), sink);
                for (key, member) in entries {
                    Self::write_str(key, sink);
                    Self::write(member, sink);
                }
            }
        }
    }

    fn write_str(s: &str, sink: &mut impl CanonicalSink) {
        sink.write(b"s");
        Self::write_len(s.len(), sink);
        sink.write(s.as_bytes());
    }

    fn write_len(len: usize, sink: &mut impl CanonicalSink) {
        sink.write(&(len as u64).to_be_bytes());
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Strategy for generating JSON values without floats, so that a text
    /// round-trip reproduces the exact same document.
    fn json_value_no_floats() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| serde_json::json!(n)),
            "[a-zA-Z0-9_ ]{0,20}".prop_map(Value::String),
        ];
        leaf.prop_recursive(4, 64, 8, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,6}", inner, 0..6).prop_map(|m| {
                    let map: serde_json::Map<String, Value> = m.into_iter().collect();
                    Value::Object(map)
                }),
            ]
        })
    }

    proptest! {
        /// Encoding is deterministic.
        #[test]
        fn encoding_deterministic(value in json_value_no_floats()) {
            prop_assert_eq!(
                CanonicalEncoder::encode(&value),
                CanonicalEncoder::encode(&value.clone())
            );
        }

        /// A text round-trip (a structurally equal, distinct instance)
        /// encodes identically.
        #[test]
        fn encoding_survives_round_trip(value in json_value_no_floats()) {
            let text = serde_json::to_string(&value).unwrap();
            let reparsed: Value = serde_json::from_str(&text).unwrap();
            prop_assert_eq!(
                CanonicalEncoder::encode(&value),
                CanonicalEncoder::encode(&reparsed)
            );
        }

        /// Equal encodings imply equal documents.
        #[test]
        fn encoding_injective(a in json_value_no_floats(), b in json_value_no_floats()) {
            let same = CanonicalEncoder::encode(&a) == CanonicalEncoder::encode(&b);
            prop_assert_eq!(same, a == b);
        }
    }
}
