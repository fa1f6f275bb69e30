use crate::error::{CoreError, CoreResult};
use crate::field::DocumentField;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A document in a collection.
///
/// A document is a set of named, typed fields. It is replaced wholesale on
/// `put`; there is no partial patch. The same encoding is used on the wire
/// and in snapshots: `{"fields": {"name": {"type": "string", "value": "..."}}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    fields: BTreeMap<String, DocumentField>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fields(fields: BTreeMap<String, DocumentField>) -> Self {
        Self { fields }
    }

    /// Builder-style field insertion.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<DocumentField>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn fields(&self) -> &BTreeMap<String, DocumentField> {
        &self.fields
    }

    pub fn get(&self, field: &str) -> Option<&DocumentField> {
        self.fields.get(field)
    }

    /// The value of `field` if it is present and string-typed.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(DocumentField::as_str)
    }

    /// Resolve the document's key under `primary_key`.
    ///
    /// Fails with `UnsupportedField` when the field is missing or not a string.
    pub fn primary_key(&self, primary_key: &str) -> CoreResult<&str> {
        match self.fields.get(primary_key) {
            Some(DocumentField::String(key)) => Ok(key),
            Some(other) => Err(CoreError::UnsupportedField(format!(
                "primary key `{primary_key}` must be a string, got {}",
                other.field_type()
            ))),
            None => Err(CoreError::UnsupportedField(format!(
                "missing primary key `{primary_key}`"
            ))),
        }
    }

    /// NaN and infinities have no JSON encoding, so they are rejected with
    /// `UnsupportedField` before a document is stored.
    pub fn ensure_finite(&self) -> CoreResult<()> {
        let bad = self
            .fields
            .iter()
            .find(|(_, field)| field.as_f64().is_some_and(|n| !n.is_finite()));
        match bad {
            Some((name, _)) => Err(CoreError::UnsupportedField(format!(
                "{name}: number must be finite"
            ))),
            None => Ok(()),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Plain JSON object view with the type tags stripped.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), Value::from(v.clone())))
                .collect(),
        )
    }

    /// Build a document from a plain JSON object, inferring each field's tag
    /// from the shape of its value.
    pub fn from_json(value: Value) -> CoreResult<Self> {
        let Value::Object(map) = value else {
            return Err(CoreError::UnsupportedField(
                "document must be a JSON object".into(),
            ));
        };
        Self::from_json_map(map)
    }

    pub(crate) fn from_json_map(map: Map<String, Value>) -> CoreResult<Self> {
        let fields = map
            .into_iter()
            .map(|(k, v)| {
                DocumentField::try_from(v)
                    .map(|field| (k.clone(), field))
                    .map_err(|err| match err {
                        CoreError::UnsupportedField(msg) => {
                            CoreError::UnsupportedField(format!("{k}: {msg}"))
                        }
                        other => other,
                    })
            })
            .collect::<CoreResult<BTreeMap<_, _>>>()?;
        Ok(Self { fields })
    }
}

/// Helper macro for constructing a [`Document`] inline.
///
/// # Example
/// ```
/// use docstore_core::document;
///
/// let doc = document! {
///     "id" => "1",
///     "name" => "Alice",
///     "age" => 30i64
/// };
/// assert_eq!(doc.get_str("name"), Some("Alice"));
/// ```
#[macro_export]
macro_rules! document {
    ($($key:expr => $value:expr),* $(,)?) => {{
        let mut fields = std::collections::BTreeMap::new();
        $(
            fields.insert($key.to_string(), $crate::field::DocumentField::from($value));
        )*
        $crate::document::Document::from_fields(fields)
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_document() {
        let doc = Document::new()
            .with_field("id", "1")
            .with_field("name", "Alice")
            .with_field("age", 30i64);

        assert_eq!(doc.len(), 3);
        assert_eq!(doc.get("name"), Some(&DocumentField::from("Alice")));
        assert_eq!(doc.get("age"), Some(&DocumentField::Number(30.0)));
        assert_eq!(doc.get("missing"), None);
    }

    #[test]
    fn primary_key_resolution() {
        let doc = document! { "id" => "u1", "n" => 5i64 };
        assert_eq!(doc.primary_key("id").unwrap(), "u1");
        assert!(doc.primary_key("n").is_err());
        assert!(doc.primary_key("missing").is_err());
    }

    #[test]
    fn non_finite_numbers_are_unsupported() {
        assert!(document! { "n" => 1.5 }.ensure_finite().is_ok());
        let err = document! { "id" => "1", "n" => f64::NAN }
            .ensure_finite()
            .unwrap_err();
        assert_eq!(err.to_string(), "unsupported field: n: number must be finite");
    }

    #[test]
    fn wire_encoding() {
        let doc = document! { "id" => "1", "active" => true };
        let encoded = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            encoded,
            json!({
                "fields": {
                    "active": {"type": "bool", "value": true},
                    "id": {"type": "string", "value": "1"}
                }
            })
        );
        let decoded: Document = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, doc);
    }

    #[test]
    fn plain_json_view() {
        let doc = Document::from_json(json!({
            "id": "1",
            "tags": ["a", "b"],
            "meta": {"v": 1}
        }))
        .unwrap();

        assert_eq!(doc.get_str("id"), Some("1"));
        assert!(doc.get("tags").unwrap().as_array().is_some());
        assert_eq!(doc.to_json(), json!({"id": "1", "tags": ["a", "b"], "meta": {"v": 1}}));
    }

    #[test]
    fn from_json_rejects_null_and_non_objects() {
        let err = Document::from_json(json!({"id": null})).unwrap_err();
        assert!(err.to_string().contains("id"));
        assert!(Document::from_json(json!(["id"])).is_err());
    }
}
