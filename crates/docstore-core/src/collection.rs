use crate::document::Document;
use crate::error::{CoreError, CoreResult};
use crate::index::{IndexRegistry, QueryParams};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Immutable per-collection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Field every document must carry as a string; its value is the document key.
    pub primary_key: String,
}

impl CollectionConfig {
    pub fn new(primary_key: impl Into<String>) -> Self {
        Self {
            primary_key: primary_key.into(),
        }
    }
}

#[derive(Debug, Default)]
struct CollectionState {
    docs: BTreeMap<String, Arc<Document>>,
    indexes: IndexRegistry,
}

/// A set of documents keyed by primary key, plus its secondary indexes.
///
/// Reads (`get`, `list`, `query`) share the lock; writes take it exclusively,
/// so all index updates for one write are applied as a group.
#[derive(Debug)]
pub struct Collection {
    config: CollectionConfig,
    state: RwLock<CollectionState>,
}

impl Collection {
    pub fn new(config: CollectionConfig) -> Self {
        Self {
            config,
            state: RwLock::new(CollectionState::default()),
        }
    }

    /// Rebuild a collection from a document table and index field names.
    /// Indexes are derived by scanning `docs`.
    pub(crate) fn restore(
        config: CollectionConfig,
        docs: BTreeMap<String, Document>,
        index_names: &[String],
    ) -> CoreResult<Self> {
        for (key, doc) in &docs {
            doc.ensure_finite()?;
            let stored = doc.primary_key(&config.primary_key)?;
            if stored != key.as_str() {
                return Err(CoreError::UnsupportedField(format!(
                    "document under `{key}` has primary key `{stored}`"
                )));
            }
        }
        let collection = Self::new(config);
        {
            let mut state = collection.state.write();
            state.docs = docs.into_iter().map(|(k, d)| (k, Arc::new(d))).collect();
        }
        for field in index_names {
            collection.create_index(field)?;
        }
        Ok(collection)
    }

    pub fn config(&self) -> &CollectionConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.state.read().docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().docs.is_empty()
    }

    /// Insert or wholesale-replace a document under its primary key.
    pub fn put(&self, doc: Document) -> CoreResult<()> {
        doc.ensure_finite()?;
        let key = doc.primary_key(&self.config.primary_key)?.to_owned();
        let doc = Arc::new(doc);

        let mut state = self.state.write();
        let CollectionState { docs, indexes } = &mut *state;
        match docs.get(&key) {
            Some(old) => indexes.on_replace(old, &doc),
            None => indexes.on_insert(&doc),
        }
        docs.insert(key.clone(), doc);
        debug!(key = %key, "put document");
        Ok(())
    }

    pub fn get(&self, key: &str) -> CoreResult<Document> {
        self.state
            .read()
            .docs
            .get(key)
            .map(|doc| Document::clone(doc))
            .ok_or_else(|| CoreError::DocumentNotFound(key.to_owned()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.state.read().docs.contains_key(key)
    }

    /// Delete a document and drop it from every index.
    pub fn delete(&self, key: &str) -> CoreResult<()> {
        let mut state = self.state.write();
        let CollectionState { docs, indexes } = &mut *state;
        let doc = docs
            .get(key)
            .ok_or_else(|| CoreError::DocumentNotFound(key.to_owned()))?;
        indexes.on_remove(doc);
        docs.remove(key);
        debug!(key, "deleted document");
        Ok(())
    }

    /// Copy of every document, in primary-key order.
    pub fn list(&self) -> Vec<Document> {
        self.state
            .read()
            .docs
            .values()
            .map(|doc| Document::clone(doc))
            .collect()
    }

    /// Build an index over `field` from the current documents.
    pub fn create_index(&self, field: &str) -> CoreResult<()> {
        let mut state = self.state.write();
        let CollectionState { docs, indexes } = &mut *state;
        indexes.create(field, docs.values())?;
        debug!(field, "created index");
        Ok(())
    }

    pub fn delete_index(&self, field: &str) -> CoreResult<()> {
        self.state.write().indexes.remove(field)?;
        debug!(field, "deleted index");
        Ok(())
    }

    /// Range query over the index on `field`.
    pub fn query(&self, field: &str, params: &QueryParams) -> CoreResult<Vec<Document>> {
        let state = self.state.read();
        let index = state.indexes.get(field)?;
        Ok(index
            .range(params)
            .into_iter()
            .map(|doc| Document::clone(doc))
            .collect())
    }

    pub fn index_names(&self) -> Vec<String> {
        self.state.read().indexes.names()
    }

    /// Sorted distinct values currently held by the index on `field`.
    pub fn index_keys(&self, field: &str) -> CoreResult<Vec<String>> {
        Ok(self.state.read().indexes.get(field)?.keys().to_vec())
    }

    pub fn indexes_consistent(&self) -> bool {
        self.state.read().indexes.is_consistent()
    }

    /// Copy the document table and index names under a single read lock.
    pub(crate) fn snapshot(&self) -> (BTreeMap<String, Document>, Vec<String>) {
        let state = self.state.read();
        let docs = state
            .docs
            .iter()
            .map(|(k, doc)| (k.clone(), Document::clone(doc)))
            .collect();
        (docs, state.indexes.names())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document;
    use crate::error::ErrorKind;

    fn users() -> Collection {
        let users = Collection::new(CollectionConfig::new("id"));
        users.put(document! { "id" => "1", "name" => "Alice" }).unwrap();
        users.put(document! { "id" => "2", "name" => "Bob" }).unwrap();
        users.put(document! { "id" => "3", "name" => "Charlie" }).unwrap();
        users
    }

    fn names(docs: &[Document]) -> Vec<&str> {
        docs.iter().map(|d| d.get_str("name").unwrap()).collect()
    }

    #[test]
    fn put_and_get() {
        let users = users();
        let doc = users.get("2").unwrap();
        assert_eq!(doc, document! { "id" => "2", "name" => "Bob" });
        assert_eq!(users.len(), 3);
    }

    #[test]
    fn put_requires_string_primary_key() {
        let users = users();

        let err = users.put(document! { "name" => "Nobody" }).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedField);

        let err = users.put(document! { "id" => 4i64 }).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedField);

        assert_eq!(users.len(), 3);
    }

    #[test]
    fn put_rejects_non_finite_numbers() {
        let users = users();
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = users
                .put(document! { "id" => "9", "score" => bad })
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::UnsupportedField);
        }
        assert!(!users.contains("9"));
        users.put(document! { "id" => "9", "score" => 0.5 }).unwrap();
    }

    #[test]
    fn put_replaces_wholesale() {
        let users = users();
        users.put(document! { "id" => "1", "email" => "a@x" }).unwrap();

        let doc = users.get("1").unwrap();
        assert_eq!(doc.get("name"), None);
        assert_eq!(doc.get_str("email"), Some("a@x"));
        assert_eq!(users.len(), 3);
    }

    #[test]
    fn get_missing_fails() {
        let users = users();
        let err = users.get("nope").unwrap_err();
        assert!(matches!(err, CoreError::DocumentNotFound(_)));
    }

    #[test]
    fn delete_document() {
        let users = users();
        users.delete("1").unwrap();
        assert!(!users.contains("1"));
        assert_eq!(users.len(), 2);
    }

    #[test]
    fn delete_missing_leaves_collection_unchanged() {
        let users = users();
        let err = users.delete("nope").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(users.len(), 3);
    }

    #[test]
    fn list_returns_copies() {
        let users = users();
        let mut listed = users.list();
        assert_eq!(listed.len(), 3);

        listed.clear();
        assert_eq!(users.len(), 3);
    }

    #[test]
    fn query_ranges() {
        let users = users();
        users.create_index("name").unwrap();

        let all = users.query("name", &QueryParams::new()).unwrap();
        assert_eq!(names(&all), vec!["Alice", "Bob", "Charlie"]);

        let from_b = users.query("name", &QueryParams::new().min("B")).unwrap();
        assert_eq!(names(&from_b), vec!["Bob", "Charlie"]);

        let only_bob = users
            .query("name", &QueryParams::new().min("B").max("Bob"))
            .unwrap();
        assert_eq!(names(&only_bob), vec!["Bob"]);

        let desc = users
            .query("name", &QueryParams::new().descending())
            .unwrap();
        assert_eq!(names(&desc), vec!["Charlie", "Bob", "Alice"]);
    }

    #[test]
    fn query_without_index_fails() {
        let users = users();
        let err = users.query("name", &QueryParams::new()).unwrap_err();
        assert!(matches!(err, CoreError::IndexNotFound(_)));
    }

    #[test]
    fn index_follows_writes() {
        let users = users();
        users.create_index("name").unwrap();

        users.put(document! { "id" => "1", "name" => "Zed" }).unwrap();
        assert_eq!(users.index_keys("name").unwrap(), vec!["Bob", "Charlie", "Zed"]);

        users.delete("2").unwrap();
        assert_eq!(users.index_keys("name").unwrap(), vec!["Charlie", "Zed"]);

        users.put(document! { "id" => "4" }).unwrap();
        assert_eq!(users.index_keys("name").unwrap(), vec!["Charlie", "Zed"]);
        assert!(users.indexes_consistent());
    }

    #[test]
    fn repeated_put_keeps_single_index_entry() {
        let users = users();
        users.create_index("name").unwrap();
        users.put(document! { "id" => "2", "name" => "Bob" }).unwrap();
        users.put(document! { "id" => "2", "name" => "Bob" }).unwrap();

        let bobs = users
            .query("name", &QueryParams::new().min("Bob").max("Bob"))
            .unwrap();
        assert_eq!(bobs.len(), 1);
    }

    #[test]
    fn index_lifecycle() {
        let users = users();
        users.create_index("name").unwrap();
        assert!(matches!(
            users.create_index("name"),
            Err(CoreError::IndexAlreadyExists(_))
        ));
        assert_eq!(users.index_names(), vec!["name"]);

        users.delete_index("name").unwrap();
        assert!(matches!(
            users.delete_index("name"),
            Err(CoreError::IndexNotFound(_))
        ));
        assert_eq!(users.len(), 3);
    }

    #[test]
    fn index_skips_non_string_values() {
        let users = users();
        users.put(document! { "id" => "9", "name" => true }).unwrap();
        users.create_index("name").unwrap();

        let all = users.query("name", &QueryParams::new()).unwrap();
        assert_eq!(all.len(), 3);
    }
}
