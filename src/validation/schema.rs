/*!
 * Structural check of the output document against a JSON schema.
 *
 * Only the subset of JSON Schema the episode schema uses is understood:
 * `type` (single or list), `required`, `properties`, `items`, `enum` and
 * `minimum`. Unknown keywords are ignored.
 */

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::errors::SchemaError;

/// One place where a document does not match the schema
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaViolation {
    /// JSON path of the offending value, e.g. `$.scenes[0].scene_id`
    pub path: String,
    pub message: String,
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Schema violation at {}: {}", self.path, self.message)
    }
}

/// A loaded output schema
#[derive(Debug, Clone)]
pub struct OutputSchema {
    root: Value,
    source: PathBuf,
}

impl OutputSchema {
    /// Load a schema file; the root must be a JSON object
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| SchemaError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let root: Value = serde_json::from_str(&content).map_err(|source| SchemaError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_value(root, path)
    }

    pub fn from_value(root: Value, source: &Path) -> Result<Self, SchemaError> {
        if !root.is_object() {
            return Err(SchemaError::Unsupported {
                path: source.to_path_buf(),
                message: "schema root must be an object".to_string(),
            });
        }
        Ok(Self {
            root,
            source: source.to_path_buf(),
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Check a document, returning every violation found
    pub fn validate(&self, document: &Value) -> Vec<SchemaViolation> {
        let mut violations = Vec::new();
        check_node(&self.root, document, "$", &mut violations);
        violations
    }
}

fn check_node(schema: &Value, value: &Value, path: &str, violations: &mut Vec<SchemaViolation>) {
    let Some(schema) = schema.as_object() else {
        return;
    };

    if let Some(expected) = schema.get("type") {
        let allowed: Vec<&str> = match expected {
            Value::String(name) => vec![name.as_str()],
            Value::Array(names) => names.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        };
        if !allowed.is_empty() && !allowed.iter().any(|name| matches_type(name, value)) {
            violations.push(SchemaViolation {
                path: path.to_string(),
                message: format!("expected {}, found {}", allowed.join(" or "), type_name(value)),
            });
            // Nested checks are meaningless on the wrong type.
            return;
        }
    }

    if let Some(Value::Array(options)) = schema.get("enum") {
        if !options.contains(value) {
            violations.push(SchemaViolation {
                path: path.to_string(),
                message: format!("{} is not one of {}", value, Value::Array(options.clone())),
            });
        }
    }

    if let (Some(minimum), Some(number)) = (schema.get("minimum").and_then(Value::as_f64), value.as_f64()) {
        if number < minimum {
            violations.push(SchemaViolation {
                path: path.to_string(),
                message: format!("{} is less than the minimum {}", number, minimum),
            });
        }
    }

    if let Value::Object(object) = value {
        check_object(schema, object, path, violations);
    }

    if let (Some(items), Value::Array(elements)) = (schema.get("items"), value) {
        for (index, element) in elements.iter().enumerate() {
            check_node(items, element, &format!("{}[{}]", path, index), violations);
        }
    }
}

fn check_object(
    schema: &Map<String, Value>,
    object: &Map<String, Value>,
    path: &str,
    violations: &mut Vec<SchemaViolation>,
) {
    if let Some(Value::Array(required)) = schema.get("required") {
        for key in required.iter().filter_map(Value::as_str) {
            if !object.contains_key(key) {
                violations.push(SchemaViolation {
                    path: path.to_string(),
                    message: format!("missing required property '{}'", key),
                });
            }
        }
    }

    if let Some(Value::Object(properties)) = schema.get("properties") {
        for (key, property_schema) in properties {
            if let Some(child) = object.get(key) {
                check_node(property_schema, child, &format!("{}.{}", path, key), violations);
            }
        }
    }
}

fn matches_type(name: &str, value: &Value) -> bool {
    match name {
        "object" => value.is_object(),
        "array" => value.is_array(),
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "null" => value.is_null(),
        _ => true,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
