//! One factory shared by many threads: results match single-threaded runs
//! and the caches converge to one entry per (kind, schema).

use std::sync::Arc;
use std::thread;

use jsv_schema::{JsonValidator, ValidationConfig, ValidatorFactory};
use serde_json::{json, Value};

fn schema() -> Value {
    json!({
        "type": "object",
        "required": ["n"],
        "properties": {
            "n": {"type": "integer", "multipleOf": 3},
            "tags": {"type": "array", "items": {"type": "string"}}
        }
    })
}

fn instance(i: i64) -> Value {
    json!({"n": i, "tags": ["x", format!("t{i}")]})
}

#[test]
fn test_shared_factory_gives_same_results_as_sequential() {
    let factory = Arc::new(ValidatorFactory::draft4(ValidationConfig::default()));
    let validator = JsonValidator::new(Arc::clone(&factory), schema());

    let expected: Vec<bool> = (0..64).map(|i| i % 3 == 0).collect();

    let results: Vec<Vec<bool>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let validator = validator.clone();
                scope.spawn(move || {
                    (0..64)
                        .map(|i| validator.validate(&instance(i)).unwrap().is_success())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for run in results {
        assert_eq!(run, expected);
    }

    // root/object, n/integer, tags/array, tags items/string
    assert_eq!(factory.cache_stats().entries, 4);
    assert_eq!(factory.validated_schema_count(), 4);
}

#[test]
fn test_concurrent_distinct_schemas() {
    let factory = Arc::new(ValidatorFactory::draft4(ValidationConfig::default()));
    thread::scope(|scope| {
        for min in 0..6 {
            let factory = Arc::clone(&factory);
            scope.spawn(move || {
                let validator = JsonValidator::new(factory, json!({"minimum": min}));
                for _ in 0..20 {
                    assert!(validator.validate(&json!(min)).unwrap().is_success());
                    assert!(!validator.validate(&json!(min - 1)).unwrap().is_success());
                }
            });
        }
    });
    assert_eq!(factory.cache_stats().entries, 6);
    assert_eq!(factory.validated_schema_count(), 6);
}
