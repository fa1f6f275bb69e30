//! Conversion between application types and [`Document`].
//!
//! Values go through their serde JSON form; each top-level member becomes a
//! field tagged by its shape (string, number, bool, array, object).

use crate::document::Document;
use crate::error::{CoreError, CoreResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Marshal any serializable struct or map into a document.
///
/// The value must serialize to a JSON object and none of its members may be
/// `null`; otherwise this fails with `UnsupportedField`.
pub fn to_document<T: Serialize>(value: &T) -> CoreResult<Document> {
    let json = serde_json::to_value(value)
        .map_err(|err| CoreError::UnsupportedField(err.to_string()))?;
    Document::from_json(json)
}

/// Unmarshal a document back into an application type.
pub fn from_document<T: DeserializeOwned>(doc: &Document) -> CoreResult<T> {
    serde_json::from_value(doc.to_json())
        .map_err(|err| CoreError::UnsupportedField(err.to_string()))
}

/// Like [`to_document`] but for an already-parsed JSON value.
pub fn json_to_document(value: Value) -> CoreResult<Document> {
    Document::from_json(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldType;
    use serde::Deserialize;
    use std::collections::BTreeMap;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct User {
        id: String,
        name: String,
        age: u32,
        admin: bool,
        tags: Vec<String>,
        address: Address,
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Address {
        city: String,
    }

    fn alice() -> User {
        User {
            id: "1".into(),
            name: "Alice".into(),
            age: 30,
            admin: false,
            tags: vec!["ops".into()],
            address: Address {
                city: "Rome".into(),
            },
        }
    }

    #[test]
    fn marshal_tags_by_shape() {
        let doc = to_document(&alice()).unwrap();
        let tag = |f: &str| doc.get(f).unwrap().field_type();

        assert_eq!(tag("id"), FieldType::String);
        assert_eq!(tag("age"), FieldType::Number);
        assert_eq!(tag("admin"), FieldType::Bool);
        assert_eq!(tag("tags"), FieldType::Array);
        assert_eq!(tag("address"), FieldType::Object);
    }

    #[test]
    fn unmarshal_restores_struct() {
        let doc = to_document(&alice()).unwrap();
        let user: User = from_document(&doc).unwrap();
        assert_eq!(user, alice());
    }

    #[test]
    fn unsupported_shapes_fail() {
        let mut with_null: BTreeMap<&str, Option<&str>> = BTreeMap::new();
        with_null.insert("id", None);
        assert!(to_document(&with_null).is_err());

        assert!(to_document(&"just a string").is_err());
        assert!(to_document(&vec![1, 2, 3]).is_err());
    }

    #[test]
    fn unmarshal_type_mismatch_fails() {
        let doc = crate::document! { "id" => 1i64 };
        let result: CoreResult<Address> = from_document(&doc);
        assert!(result.is_err());
    }
}
