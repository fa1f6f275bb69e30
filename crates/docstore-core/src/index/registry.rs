use crate::document::Document;
use crate::error::{CoreError, CoreResult};
use crate::index::Index;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Manages all secondary indexes of a single collection, keyed by field name.
///
/// Keeps every index in step with document writes.
#[derive(Debug, Default, Clone)]
pub struct IndexRegistry {
    indexes: BTreeMap<String, Index>,
}

impl IndexRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index over `field` from the given documents and register it.
    pub fn create<'a>(
        &mut self,
        field: &str,
        docs: impl Iterator<Item = &'a Arc<Document>>,
    ) -> CoreResult<()> {
        if self.indexes.contains_key(field) {
            return Err(CoreError::IndexAlreadyExists(field.to_owned()));
        }
        let mut index = Index::new(field);
        for doc in docs {
            index.insert(doc);
        }
        self.indexes.insert(field.to_owned(), index);
        Ok(())
    }

    /// Drop an index by field name.
    pub fn remove(&mut self, field: &str) -> CoreResult<()> {
        self.indexes
            .remove(field)
            .map(|_| ())
            .ok_or_else(|| CoreError::IndexNotFound(field.to_owned()))
    }

    pub fn get(&self, field: &str) -> CoreResult<&Index> {
        self.indexes
            .get(field)
            .ok_or_else(|| CoreError::IndexNotFound(field.to_owned()))
    }

    /// Field names of all registered indexes, in ascending order.
    pub fn names(&self) -> Vec<String> {
        self.indexes.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    /// Notify all indexes that a document was inserted.
    pub fn on_insert(&mut self, doc: &Arc<Document>) {
        for index in self.indexes.values_mut() {
            index.insert(doc);
        }
    }

    /// Notify all indexes that a document was removed.
    pub fn on_remove(&mut self, doc: &Arc<Document>) {
        for index in self.indexes.values_mut() {
            index.remove(doc);
        }
    }

    /// Replace `old` with `new` in every index.
    ///
    /// All removals happen before any insertion, so no index ever holds both
    /// versions of the document at once.
    pub fn on_replace(&mut self, old: &Arc<Document>, new: &Arc<Document>) {
        self.on_remove(old);
        self.on_insert(new);
    }

    pub fn is_consistent(&self) -> bool {
        self.indexes.values().all(Index::is_consistent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document;
    use crate::index::QueryParams;

    fn user(id: &str, name: &str, city: &str) -> Arc<Document> {
        Arc::new(document! { "id" => id, "name" => name, "city" => city })
    }

    #[test]
    fn create_scans_existing_documents() {
        let docs = [user("1", "Bob", "Oslo"), user("2", "Alice", "Rome")];
        let mut registry = IndexRegistry::new();
        registry.create("name", docs.iter()).unwrap();

        let idx = registry.get("name").unwrap();
        assert_eq!(idx.keys(), ["Alice", "Bob"]);
    }

    #[test]
    fn duplicate_index_fails() {
        let mut registry = IndexRegistry::new();
        registry.create("name", std::iter::empty()).unwrap();
        let err = registry.create("name", std::iter::empty()).unwrap_err();
        assert!(matches!(err, CoreError::IndexAlreadyExists(_)));
    }

    #[test]
    fn remove_index() {
        let mut registry = IndexRegistry::new();
        registry.create("name", std::iter::empty()).unwrap();

        registry.remove("name").unwrap();
        assert!(registry.get("name").is_err());
        assert!(matches!(
            registry.remove("name"),
            Err(CoreError::IndexNotFound(_))
        ));
    }

    #[test]
    fn multiple_indexes_maintained() {
        let mut registry = IndexRegistry::new();
        registry.create("name", std::iter::empty()).unwrap();
        registry.create("city", std::iter::empty()).unwrap();

        let alice = user("1", "Alice", "Rome");
        registry.on_insert(&alice);
        assert_eq!(registry.get("name").unwrap().keys(), ["Alice"]);
        assert_eq!(registry.get("city").unwrap().keys(), ["Rome"]);

        let moved = user("1", "Alice", "Oslo");
        registry.on_replace(&alice, &moved);
        assert_eq!(registry.get("city").unwrap().keys(), ["Oslo"]);
        assert_eq!(registry.get("name").unwrap().entry_count(), 1);

        registry.on_remove(&moved);
        assert_eq!(registry.get("name").unwrap().key_count(), 0);
        assert_eq!(registry.get("city").unwrap().key_count(), 0);
        assert!(registry.is_consistent());
    }

    #[test]
    fn replace_leaves_no_stale_entries() {
        let mut registry = IndexRegistry::new();
        registry.create("name", std::iter::empty()).unwrap();

        let old = user("1", "Alice", "Rome");
        let new = user("1", "Alicia", "Rome");
        registry.on_insert(&old);
        registry.on_replace(&old, &new);

        let idx = registry.get("name").unwrap();
        let hits = idx.range(&QueryParams::new());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].get_str("name"), Some("Alicia"));
    }

    #[test]
    fn list_index_names() {
        let mut registry = IndexRegistry::new();
        registry.create("name", std::iter::empty()).unwrap();
        registry.create("age", std::iter::empty()).unwrap();

        assert_eq!(registry.names(), vec!["age", "name"]);
        assert_eq!(registry.len(), 2);
    }
}
