//! # Validator Cache
//!
//! Memoizes built validators per (structural kind, schema content). Two
//! schemas that are structurally equal share one entry no matter where they
//! come from; two different kinds of instance against the same schema never
//! share one.
//!
//! ## Keying
//!
//! Entries are bucketed by [`SchemaDigest`] (SHA-256 of the canonical
//! encoding) and confirmed with full `Value` equality inside the bucket, so
//! a digest collision can never hand back a validator for another schema.
//!
//! ## Concurrency
//!
//! Lookups take a read lock, stores a write lock. Two threads missing on
//! the same key both build and both store; the last store wins and both
//! validators are equivalent. Readers only ever observe complete
//! `Arc<Validator>` values. Nothing is evicted.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use jsv_core::{NodeType, SchemaDigest};

use crate::validator::Validator;

/// Cache key: instance kind plus schema digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Structural kind of the instance.
    pub kind: NodeType,
    /// Content digest of the schema.
    pub digest: SchemaDigest,
}

impl CacheKey {
    /// Key for validating a `kind` instance against `schema`.
    pub fn new(kind: NodeType, schema: &Value) -> Self {
        Self {
            kind,
            digest: SchemaDigest::of(schema),
        }
    }

    /// Key for a schema whose digest is already known.
    pub fn from_digest(kind: NodeType, digest: SchemaDigest) -> Self {
        Self { kind, digest }
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.digest.short())
    }
}

/// Map from a hashed key to values, with schema content equality checked
/// inside each bucket.
#[derive(Debug)]
pub(crate) struct ContentIndex<K, T> {
    buckets: HashMap<K, Vec<(Value, T)>>,
    len: usize,
}

impl<K: Hash + Eq, T> Default for ContentIndex<K, T> {
    fn default() -> Self {
        Self {
            buckets: HashMap::new(),
            len: 0,
        }
    }
}

impl<K: Hash + Eq, T> ContentIndex<K, T> {
    pub(crate) fn get(&self, key: &K, schema: &Value) -> Option<&T> {
        self.buckets
            .get(key)?
            .iter()
            .find(|(stored, _)| stored == schema)
            .map(|(_, value)| value)
    }

    pub(crate) fn contains(&self, key: &K, schema: &Value) -> bool {
        self.get(key, schema).is_some()
    }

    /// Insert or replace. Returns `true` if the entry is new.
    pub(crate) fn insert(&mut self, key: K, schema: &Value, value: T) -> bool {
        let bucket = self.buckets.entry(key).or_default();
        if let Some(slot) = bucket.iter_mut().find(|(stored, _)| stored == schema) {
            slot.1 = value;
            return false;
        }
        bucket.push((schema.clone(), value));
        self.len += 1;
        true
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }
}

/// Point-in-time cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Lookups that found a validator.
    pub hits: u64,
    /// Lookups that did not.
    pub misses: u64,
    /// Distinct (kind, schema) entries.
    pub entries: usize,
}

impl CacheStats {
    /// Fraction of lookups that hit, `0.0` when there were none.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Content-keyed validator cache.
#[derive(Debug, Default)]
pub struct ValidatorCache {
    index: RwLock<ContentIndex<CacheKey, Arc<Validator>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ValidatorCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the validator built for `schema` under `key`.
    pub fn lookup(&self, key: &CacheKey, schema: &Value) -> Option<Arc<Validator>> {
        let found = self.index.read().get(key, schema).cloned();
        let counter = if found.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    /// Store a validator; an existing entry for the same key is replaced.
    pub fn store(&self, key: CacheKey, schema: &Value, validator: Arc<Validator>) {
        let inserted = self.index.write().insert(key, schema, validator);
        tracing::debug!(
            kind = %key.kind,
            digest = %key.digest.short(),
            replaced = !inserted,
            "stored validator"
        );
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.index.read().len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}
