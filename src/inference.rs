//! One-shot structural inference: decoded JSON mapping → `StructSchema`.
//!
//! Every value is classified on its own; nested objects recurse into
//! anonymous structs. One bad field fails the whole document, there is no
//! best-effort output.
pub mod name;
pub mod num;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::ir::{FieldDecl, FieldType, StructSchema};

// ------------------------------- Policy ---------------------------------- //

pub const DEFAULT_MAX_DEPTH: usize = 64;

/// serde_json decodes at most 127 levels of nesting (top-level object
/// included) and fails deeper documents before inference runs, so larger
/// limits never apply.
pub const MAX_DEPTH_CEILING: usize = 126;

#[derive(Clone, Copy, Debug)]
pub struct InferOptions {
    /// Deepest allowed nested object; the top-level mapping is depth 0.
    /// Effective up to `MAX_DEPTH_CEILING`.
    pub max_depth: usize,
    /// Order fields by JSON key instead of document order.
    pub sort_fields: bool,
    /// Classify `null` as `ObjectAny` instead of failing.
    pub null_as_any: bool,
}

impl Default for InferOptions {
    fn default() -> Self {
        Self { max_depth: DEFAULT_MAX_DEPTH, sort_fields: false, null_as_any: false }
    }
}

// ------------------------------- Front API -------------------------------- //

pub struct Inference { options: InferOptions }

impl Inference {
    pub fn new(options: InferOptions) -> Self { Self { options } }

    /// Top-level schema, named after `name` (capitalized).
    pub fn build_named_struct(&self, map: &Map<String, Value>, name: &str) -> Result<StructSchema> {
        let mut schema = self.build_struct(map)?;
        schema.name = Some(name::type_name(name)?);
        Ok(schema)
    }

    /// Anonymous schema for `map`.
    pub fn build_struct(&self, map: &Map<String, Value>) -> Result<StructSchema> {
        self.build_struct_at(map, "", 0)
    }

    /// Classify a single value sitting directly under the top-level mapping.
    pub fn classify(&self, value: &Value) -> Result<FieldType> {
        self.classify_at(value, "", 0)
    }

    fn classify_at(&self, value: &Value, path: &str, depth: usize) -> Result<FieldType> {
        match value {
            Value::String(_) => Ok(FieldType::String),
            Value::Bool(_) => Ok(FieldType::Boolean),
            Value::Array(_) => Ok(FieldType::ArrayOfAny),
            Value::Number(n) if num::is_integral(n) => Ok(FieldType::Integer),
            Value::Number(_) => Ok(FieldType::Float),
            Value::Object(m) => {
                let depth = depth + 1;
                if depth > self.options.max_depth {
                    return Err(Error::NestingTooDeep {
                        path: path.to_string(),
                        limit: self.options.max_depth,
                    });
                }
                Ok(FieldType::NestedStruct(self.build_struct_at(m, path, depth)?))
            }
            Value::Null if self.options.null_as_any => Ok(FieldType::ObjectAny),
            Value::Null => Err(Error::MalformedField { path: path.to_string() }),
        }
    }

    fn build_struct_at(&self, map: &Map<String, Value>, path: &str, depth: usize) -> Result<StructSchema> {
        let mut entries: Vec<(&String, &Value)> = map.iter().collect();
        if self.options.sort_fields {
            entries.sort_by(|a, b| a.0.cmp(b.0));
        }

        // keyed by exported name: same-level collisions get a numeric suffix
        let mut fields = IndexMap::<String, FieldDecl>::with_capacity(entries.len());
        for (key, value) in entries {
            let base = name::exported_name(key)?;
            let ty = self.classify_at(value, &key_path(path, key), depth)?;
            let name = name::unique_name(base, |n| fields.contains_key(n));
            fields.insert(name.clone(), FieldDecl { name, ty, key: key.clone() });
        }

        Ok(StructSchema { name: None, fields: fields.into_values().collect() })
    }
}

impl Default for Inference {
    fn default() -> Self { Self::new(InferOptions::default()) }
}

fn key_path(parent: &str, key: &str) -> String {
    if parent.is_empty() { key.to_string() } else { format!("{parent}.{key}") }
}

// ------------------------------- Tests ------------------------------------ //
