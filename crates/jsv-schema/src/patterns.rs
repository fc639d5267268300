//! Compiled regular expressions for `pattern` and `patternProperties`.
//!
//! Patterns are compiled once per factory and shared. A pattern that fails
//! to compile is remembered as `None` so the failure is not retried.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use regex::Regex;

/// Per-factory regex cache.
#[derive(Debug, Default)]
pub struct PatternCache {
    compiled: RwLock<HashMap<String, Option<Arc<Regex>>>>,
}

impl PatternCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The compiled form of `pattern`, or `None` if it is not a valid regex.
    pub fn get(&self, pattern: &str) -> Option<Arc<Regex>> {
        if let Some(entry) = self.compiled.read().get(pattern) {
            return entry.clone();
        }
        let entry = match Regex::new(pattern) {
            Ok(re) => Some(Arc::new(re)),
            Err(e) => {
                tracing::warn!(pattern, error = %e, "invalid regular expression");
                None
            }
        };
        self.compiled
            .write()
            .entry(pattern.to_string())
            .or_insert(entry)
            .clone()
    }

    /// Number of distinct patterns seen.
    pub fn len(&self) -> usize {
        self.compiled.read().len()
    }

    /// Whether no pattern has been compiled yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compiles_once() {
        let cache = PatternCache::new();
        let a = cache.get("^a+$").unwrap();
        let b = cache.get("^a+$").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
        assert!(a.is_match("aaa"));
    }

    #[test]
    fn test_invalid_pattern_is_none() {
        let cache = PatternCache::new();
        assert!(cache.get("(unclosed").is_none());
        assert!(cache.get("(unclosed").is_none());
        assert_eq!(cache.len(), 1);
    }
}
