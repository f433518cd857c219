//! Core data model shared across pool generation, sampling, and dispatch.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Primitive type of an entity's values, as declared in the load
/// specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Int32,
    Int64,
    Float,
    Double,
    Bool,
}

impl ValueType {
    /// Human-readable name, matching the spelling used in specification
    /// documents.
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Int32 => "int32",
            ValueType::Int64 => "int64",
            ValueType::Float => "float",
            ValueType::Double => "double",
            ValueType::Bool => "bool",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One concrete entity value. Immutable once created; pools hold these by
/// value and sampling clones them into rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TypedValue {
    String(String),
    Int32(i32),
    Int64(i64),
    Float(f32),
    Double(f64),
    Bool(bool),
}

impl TypedValue {
    pub fn value_type(&self) -> ValueType {
        match self {
            TypedValue::String(_) => ValueType::String,
            TypedValue::Int32(_) => ValueType::Int32,
            TypedValue::Int64(_) => ValueType::Int64,
            TypedValue::Float(_) => ValueType::Float,
            TypedValue::Double(_) => ValueType::Double,
            TypedValue::Bool(_) => ValueType::Bool,
        }
    }
}

/// Ordered universe of candidate values for one entity. Built once at
/// startup and shared read-only afterwards; the sampler works on clones.
pub type ValuePool = Vec<TypedValue>;

/// One complete assignment of a value to every entity named in a request
/// template.
pub type EntityRow = HashMap<String, TypedValue>;

/// The unit handed to the serving backend: a feature lookup over a batch of
/// entity rows.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureRequest {
    pub project: String,
    pub features: Vec<String>,
    pub entities: Vec<EntityRow>,
}

/// Feature values returned by the serving backend, one field map per
/// requested row. Deserializing the body touches every returned field, which
/// is all the load generator needs from it.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureResponse {
    #[serde(default, rename = "fieldValues")]
    pub field_values: Vec<FieldValues>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldValues {
    #[serde(default)]
    pub fields: HashMap<String, serde_json::Value>,
}
