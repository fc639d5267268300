//! # Digest Stability Tests
//!
//! The validator cache and the validated-schema set key schemas by
//! [`SchemaDigest`]. These tests pin the canonical encoding byte for byte so
//! that an accidental change to the traversal (which would silently split
//! cache entries for equal schemas) is caught.

use jsv_core::{CanonicalEncoder, SchemaDigest};
use serde_json::{json, Value};

fn len(n: u64) -> [u8; 8] {
    n.to_be_bytes()
}

// ---------------------------------------------------------------------------
// Vector 1: single-member object
// ---------------------------------------------------------------------------

#[test]
fn test_vector_single_member_object() {
    let mut expected = Vec::new();
    expected.push(b'{');
    expected.extend_from_slice(&len(1));
    expected.push(b's');
    expected.extend_from_slice(&len(1));
    expected.push(b'a');
    expected.push(b'u');
    expected.extend_from_slice(&1u64.to_be_bytes());

    assert_eq!(CanonicalEncoder::encode(&json!({"a": 1})), expected);
}

// ---------------------------------------------------------------------------
// Vector 2: members are sorted by key
// ---------------------------------------------------------------------------

#[test]
fn test_vector_sorted_members() {
    let doc: Value = serde_json::from_str(r#"{"z": null, "a": true}"#).unwrap();

    let mut expected = Vec::new();
    expected.push(b'{');
    expected.extend_from_slice(&len(2));
    expected.push(b's');
    expected.extend_from_slice(&len(1));
    expected.push(b'a');
    expected.push(b't');
    expected.push(b's');
    expected.extend_from_slice(&len(1));
    expected.push(b'z');
    expected.push(b'n');

    assert_eq!(CanonicalEncoder::encode(&doc), expected);
}

// ---------------------------------------------------------------------------
// Vector 3: arrays keep order, negative integers use their own tag
// ---------------------------------------------------------------------------

#[test]
fn test_vector_array_with_negative() {
    let mut expected = Vec::new();
    expected.push(b'[');
    expected.extend_from_slice(&len(2));
    expected.push(b'i');
    expected.extend_from_slice(&(-1i64).to_be_bytes());
    expected.push(b'u');
    expected.extend_from_slice(&0u64.to_be_bytes());

    assert_eq!(CanonicalEncoder::encode(&json!([-1, 0])), expected);
}

// ---------------------------------------------------------------------------
// Realistic schemas
// ---------------------------------------------------------------------------

#[test]
fn test_reformatted_schema_keeps_digest() {
    let compact = r#"{"type":"object","required":["id"],"properties":{"id":{"type":"integer","minimum":1},"tags":{"type":"array","items":{"type":"string"}}}}"#;
    let pretty = r#"
    {
        "properties": {
            "tags": { "items": { "type": "string" }, "type": "array" },
            "id": { "minimum": 1, "type": "integer" }
        },
        "required": ["id"],
        "type": "object"
    }"#;
    let a: Value = serde_json::from_str(compact).unwrap();
    let b: Value = serde_json::from_str(pretty).unwrap();
    assert_eq!(SchemaDigest::of(&a), SchemaDigest::of(&b));
}

#[test]
fn test_subschema_digest_differs_from_parent() {
    let parent = json!({"items": {"type": "string"}});
    let child = &parent["items"];
    assert_ne!(SchemaDigest::of(&parent), SchemaDigest::of(child));
}

#[test]
fn test_required_order_matters() {
    // `required` is an array; reordering it yields a different document.
    assert_ne!(
        SchemaDigest::of(&json!({"required": ["a", "b"]})),
        SchemaDigest::of(&json!({"required": ["b", "a"]}))
    );
}
