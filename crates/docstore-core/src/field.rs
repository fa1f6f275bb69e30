use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A typed document field.
///
/// Encoded as `{"type": "...", "value": ...}`. A payload that does not match
/// its tag (e.g. `{"type": "number", "value": "7"}`) fails to deserialize
/// rather than being coerced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum DocumentField {
    String(String),
    Number(f64),
    Bool(bool),
    Array(Vec<Value>),
    Object(Map<String, Value>),
}

/// The tag of a [`DocumentField`] without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    String,
    Number,
    Bool,
    Array,
    Object,
}

impl FieldType {
    pub fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Bool => "bool",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl DocumentField {
    pub fn field_type(&self) -> FieldType {
        match self {
            Self::String(_) => FieldType::String,
            Self::Number(_) => FieldType::Number,
            Self::Bool(_) => FieldType::Bool,
            Self::Array(_) => FieldType::Array,
            Self::Object(_) => FieldType::Object,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// From conversions for ergonomic field construction
// ---------------------------------------------------------------------------

impl From<&str> for DocumentField {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<String> for DocumentField {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<f64> for DocumentField {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<i64> for DocumentField {
    fn from(v: i64) -> Self {
        Self::Number(v as f64)
    }
}

impl From<bool> for DocumentField {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<Vec<Value>> for DocumentField {
    fn from(v: Vec<Value>) -> Self {
        Self::Array(v)
    }
}

impl From<Map<String, Value>> for DocumentField {
    fn from(v: Map<String, Value>) -> Self {
        Self::Object(v)
    }
}

// ---------------------------------------------------------------------------
// JSON interop: tag inferred from the shape of a plain JSON value
// ---------------------------------------------------------------------------

impl TryFrom<Value> for DocumentField {
    type Error = CoreError;

    fn try_from(v: Value) -> CoreResult<Self> {
        match v {
            Value::String(s) => Ok(Self::String(s)),
            Value::Number(n) => n
                .as_f64()
                .map(Self::Number)
                .ok_or_else(|| CoreError::UnsupportedField(format!("number out of range: {n}"))),
            Value::Bool(b) => Ok(Self::Bool(b)),
            Value::Array(a) => Ok(Self::Array(a)),
            Value::Object(o) => Ok(Self::Object(o)),
            Value::Null => Err(CoreError::UnsupportedField("null value".into())),
        }
    }
}

impl From<DocumentField> for Value {
    fn from(v: DocumentField) -> Self {
        match v {
            DocumentField::String(s) => Value::String(s),
            DocumentField::Number(n) => number_to_json(n),
            DocumentField::Bool(b) => Value::Bool(b),
            DocumentField::Array(a) => Value::Array(a),
            DocumentField::Object(o) => Value::Object(o),
        }
    }
}

// Integral values within the exact f64 range come back as JSON integers so
// they unmarshal into integer types.
fn number_to_json(n: f64) -> Value {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if n.fract() == 0.0 && n.abs() <= MAX_EXACT {
        Value::from(n as i64)
    } else {
        serde_json::json!(n)
    }
}
