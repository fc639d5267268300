//! # Schema Digest — Content-Addressed Schema Identifiers
//!
//! Defines [`SchemaDigest`], the SHA-256 digest of a document's canonical
//! encoding. The engine uses it as the hash component of every content key:
//! the validator cache and the validated-schema set bucket schemas by digest
//! and then confirm membership with full structural equality, so a digest
//! collision can never alias two different schemas.
//!
//! ## Invariant
//!
//! A `SchemaDigest` can only be computed through [`SchemaDigest::of`], which
//! streams [`CanonicalEncoder`] output into the hasher. Structurally equal
//! documents therefore always share a digest.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalEncoder;

/// SHA-256 digest of a document's canonical encoding.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaDigest([u8; 32]);

impl SchemaDigest {
    /// Compute the digest of a document.
    pub fn of(value: &Value) -> Self {
        let mut hasher = Sha256::new();
        CanonicalEncoder::write(value, &mut hasher);
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&hasher.finalize());
        Self(bytes)
    }

    /// The raw 32-byte digest.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// The first 12 hex characters; enough to tell schemas apart in logs.
    pub fn short(&self) -> String {
        let mut hex = self.to_hex();
        hex.truncate(12);
        hex
    }
}

impl fmt::Display for SchemaDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sha256:{}", self.to_hex())
    }
}

impl fmt::Debug for SchemaDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SchemaDigest({})", self.short())
    }
}
