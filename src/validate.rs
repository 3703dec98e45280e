use std::cmp::Ordering;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{SchemaError, SchemaViolation};
use crate::record::{ProductRecord, CANONICAL_FIELDS};

const ROOT_PATH: &str = "<root>";

/// Draft 2020-12 validator compiled once from the product schema.
pub struct SchemaValidator {
    validator: jsonschema::Validator,
    required: Vec<String>,
}

impl SchemaValidator {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SchemaError::Missing(path.to_path_buf()));
        }
        let text = fs::read_to_string(path).map_err(|source| SchemaError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let schema: Value = serde_json::from_str(&text).map_err(|source| SchemaError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let validator = Self::from_schema(&schema)?;
        let drift = validator.key_set_drift();
        if !drift.is_empty() {
            warn!(
                schema = %path.display(),
                keys = ?drift,
                "Schema `required` list and canonical field set disagree"
            );
        }
        debug!("Loaded schema {}", path.display());
        Ok(validator)
    }

    pub fn from_schema(schema: &Value) -> Result<Self, SchemaError> {
        let validator = jsonschema::draft202012::new(schema)
            .map_err(|e| SchemaError::Invalid(e.to_string()))?;
        let required = schema
            .get("required")
            .and_then(Value::as_array)
            .map(|keys| {
                keys.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Ok(Self {
            validator,
            required,
        })
    }

    /// Top-level keys the schema requires.
    pub fn required_fields(&self) -> &[String] {
        &self.required
    }

    /// Keys present in exactly one of the schema's `required` list and
    /// `CANONICAL_FIELDS`, sorted.
    pub fn key_set_drift(&self) -> Vec<String> {
        let schema: HashSet<&str> = self.required_fields().iter().map(String::as_str).collect();
        let canonical: HashSet<&str> = CANONICAL_FIELDS.into_iter().collect();
        let mut drift: Vec<String> = schema
            .symmetric_difference(&canonical)
            .map(|k| k.to_string())
            .collect();
        drift.sort();
        drift
    }

    pub fn validate(&self, record: &ProductRecord) -> Result<(), SchemaViolation> {
        self.validate_instance(&record.to_value())
    }

    /// Run every constraint and report the violation whose instance path
    /// sorts first, so the reported error never depends on iteration order.
    pub fn validate_instance(&self, instance: &Value) -> Result<(), SchemaViolation> {
        let mut violations: Vec<(Vec<String>, String)> = self
            .validator
            .iter_errors(instance)
            .map(|e| (pointer_segments(&e.instance_path.to_string()), e.to_string()))
            .collect();

        violations.sort_by(|a, b| compare_paths(&a.0, &b.0).then_with(|| a.1.cmp(&b.1)));

        match violations.into_iter().next() {
            None => Ok(()),
            Some((segments, message)) => Err(SchemaViolation {
                path: if segments.is_empty() {
                    ROOT_PATH.to_string()
                } else {
                    segments.join(".")
                },
                message,
            }),
        }
    }
}

/// Split a JSON pointer ("/a/0/b~1c") into unescaped segments.
fn pointer_segments(pointer: &str) -> Vec<String> {
    pointer
        .split('/')
        .skip(1)
        .map(|s| s.replace("~1", "/").replace("~0", "~"))
        .collect()
}

/// Segment-wise order; array indices compare numerically.
fn compare_paths(a: &[String], b: &[String]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        let ord = match (x.parse::<u64>(), y.parse::<u64>()) {
            (Ok(i), Ok(j)) => i.cmp(&j),
            _ => x.cmp(y),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}
