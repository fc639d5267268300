//! # Document Loading
//!
//! Reads schema and instance documents from disk. `.yaml` and `.yml` files
//! are parsed as YAML and converted to the JSON value tree; everything else
//! is parsed as JSON.

use std::path::Path;

use serde_json::Value;
use thiserror::Error;

/// Error while reading or parsing a document.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The file could not be read.
    #[error("cannot read '{path}': {source}")]
    Io {
        /// Document path.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The file content is not valid for its format.
    #[error("cannot parse '{path}' as {format}: {reason}")]
    Parse {
        /// Document path.
        path: String,
        /// Format the content was parsed as.
        format: DocumentFormat,
        /// Parser message.
        reason: String,
    },
}

/// Text format of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// JSON.
    Json,
    /// YAML (JSON-compatible subset).
    Yaml,
}

impl DocumentFormat {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::Yaml,
            _ => Self::Json,
        }
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => f.write_str("JSON"),
            Self::Yaml => f.write_str("YAML"),
        }
    }
}

/// Parse `text` as `format`. `origin` names the source in errors.
///
/// # Errors
///
/// Returns [`LoadError::Parse`] if the text is malformed or a YAML value has
/// no JSON equivalent.
pub fn parse_document(text: &str, format: DocumentFormat, origin: &str) -> Result<Value, LoadError> {
    let parse_error = |reason: String| LoadError::Parse {
        path: origin.to_string(),
        format,
        reason,
    };
    match format {
        DocumentFormat::Json => serde_json::from_str(text).map_err(|e| parse_error(e.to_string())),
        DocumentFormat::Yaml => {
            let yaml: serde_yaml::Value =
                serde_yaml::from_str(text).map_err(|e| parse_error(e.to_string()))?;
            yaml_to_json_value(&yaml).map_err(parse_error)
        }
    }
}

/// Read and parse the document at `path`.
///
/// # Errors
///
/// Returns [`LoadError::Io`] if the file cannot be read and
/// [`LoadError::Parse`] if it cannot be parsed.
pub fn load_document(path: &Path) -> Result<Value, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let format = DocumentFormat::from_path(path);
    tracing::debug!(path = %path.display(), %format, bytes = text.len(), "loading document");
    parse_document(&text, format, &path.display().to_string())
}

/// Convert a YAML value tree to the equivalent JSON tree. Tags are dropped;
/// scalar map keys are stringified.
fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::from(i))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::from(u))
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .ok_or_else(|| format!("number {n} has no JSON representation"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(items) => items
            .iter()
            .map(yaml_to_json_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        serde_yaml::Value::Mapping(map) => {
            let mut object = serde_json::Map::with_capacity(map.len());
            for (key, value) in map {
                let key = match key {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported map key {other:?}")),
                };
                object.insert(key, yaml_to_json_value(value)?);
            }
            Ok(Value::Object(object))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}
