//! # JsonValidator
//!
//! A schema document bound to a shared factory. This is the usual entry
//! point:
//!
//! ```no_run
//! use std::sync::Arc;
//! use jsv_schema::{JsonValidator, ValidationConfig, ValidatorFactory};
//! use serde_json::json;
//!
//! let factory = Arc::new(ValidatorFactory::draft4(ValidationConfig::default()));
//! let validator = JsonValidator::new(factory, json!({"type": "object", "required": ["id"]}));
//! let report = validator.validate(&json!({"id": 7})).unwrap();
//! assert!(report.is_success());
//! ```

use std::sync::Arc;

use serde_json::Value;

use jsv_core::{CoreError, JsonPointer, Report, SchemaDigest};

use crate::context::{ValidationContext, ValidationResult};
use crate::error::JsvError;
use crate::factory::ValidatorFactory;

/// A schema ready to validate instances.
#[derive(Debug, Clone)]
pub struct JsonValidator {
    factory: Arc<ValidatorFactory>,
    schema: Value,
    digest: SchemaDigest,
}

impl JsonValidator {
    /// Bind `schema` to `factory`.
    pub fn new(factory: Arc<ValidatorFactory>, schema: Value) -> Self {
        let digest = SchemaDigest::of(&schema);
        Self {
            factory,
            schema,
            digest,
        }
    }

    /// Validate `instance` against the whole schema.
    pub fn validate(&self, instance: &Value) -> ValidationResult {
        ValidationContext::new(&self.factory, &self.schema).validate(instance)
    }

    /// Validate `instance` against the subschema at `pointer`, given either
    /// as a JSON Pointer (`/definitions/a`) or a fragment (`#/definitions/a`).
    /// Local `$ref`s still resolve against the whole schema.
    ///
    /// # Errors
    ///
    /// Returns [`JsvError::Core`] if the pointer is malformed or does not
    /// resolve, and [`JsvError::Validation`] on a fail-fast abort.
    pub fn validate_at(&self, pointer: &str, instance: &Value) -> Result<Report, JsvError> {
        let pointer = if pointer.starts_with('#') {
            JsonPointer::parse_fragment(pointer)?
        } else {
            JsonPointer::parse(pointer)?
        };
        let schema = pointer
            .resolve(&self.schema)
            .ok_or_else(|| CoreError::UnresolvedPointer {
                pointer: pointer.to_string(),
            })?;
        let ctx = ValidationContext::at(&self.factory, &self.schema, schema, pointer);
        Ok(ctx.validate(instance)?)
    }

    /// Syntax-check the schema (a no-op once it has passed).
    pub fn validate_schema(&self) -> ValidationResult {
        self.factory
            .validate_schema(&ValidationContext::new(&self.factory, &self.schema))
    }

    /// Syntax-check the schema and every subschema nested in it.
    pub fn validate_schema_tree(&self) -> ValidationResult {
        self.factory
            .validate_schema_tree(&ValidationContext::new(&self.factory, &self.schema))
    }

    /// The schema document.
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Content digest of the schema.
    pub fn schema_digest(&self) -> SchemaDigest {
        self.digest
    }

    /// The shared factory.
    pub fn factory(&self) -> &Arc<ValidatorFactory> {
        &self.factory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidationConfig;
    use serde_json::json;

    fn validator(schema: Value) -> JsonValidator {
        JsonValidator::new(
            Arc::new(ValidatorFactory::draft4(ValidationConfig::default())),
            schema,
        )
    }

    #[test]
    fn test_validate_whole_schema() {
        let v = validator(json!({"type": "array", "items": {"type": "integer"}}));
        assert!(v.validate(&json!([1, 2])).unwrap().is_success());
        assert!(!v.validate(&json!([1, "2"])).unwrap().is_success());
    }

    #[test]
    fn test_validate_at_pointer_and_fragment() {
        let v = validator(json!({
            "definitions": {
                "id": {"type": "integer"},
                "pair": {"items": [{"$ref": "#/definitions/id"}, {"type": "string"}]}
            }
        }));
        assert!(v.validate_at("/definitions/id", &json!(3)).unwrap().is_success());
        assert!(!v.validate_at("#/definitions/id", &json!("3")).unwrap().is_success());

        let report = v.validate_at("/definitions/pair", &json!(["x", "y"])).unwrap();
        assert_eq!(report.messages()[0].schema_path, "/definitions/id/type");
    }

    #[test]
    fn test_validate_schema_tree_reports_nested_errors() {
        let v = validator(json!({"properties": {"a": {"type": 5}}}));
        assert!(v.validate_schema().unwrap().is_success());
        let report = v.validate_schema_tree().unwrap();
        assert_eq!(report.messages().len(), 1);
        assert_eq!(report.messages()[0].schema_path, "/properties/a/type");
    }

    #[test]
    fn test_validate_at_cycle_reports_depth() {
        let v = validator(json!({"definitions": {"loop": {"not": {"$ref": "#/definitions/loop"}}}}));
        let report = v.validate_at("/definitions/loop", &json!(1)).unwrap();
        assert_eq!(report.messages()[0].keyword, "depth");
    }

    #[test]
    fn test_validate_at_unresolvable() {
        let v = validator(json!({}));
        assert!(matches!(
            v.validate_at("/definitions/none", &json!(1)),
            Err(JsvError::Core(CoreError::UnresolvedPointer { .. }))
        ));
        assert!(matches!(
            v.validate_at("definitions", &json!(1)),
            Err(JsvError::Core(CoreError::InvalidPointer { .. }))
        ));
    }

    #[test]
    fn test_validate_schema_and_digest() {
        let v = validator(json!({"required": []}));
        assert!(!v.validate_schema().unwrap().is_success());
        assert_eq!(v.schema_digest(), SchemaDigest::of(&json!({"required": []})));
    }
}
