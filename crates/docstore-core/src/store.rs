use crate::collection::{Collection, CollectionConfig};
use crate::document::Document;
use crate::error::{CoreError, CoreResult};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Serialized form of one collection: its documents and the field names of
/// its indexes. Index contents are rebuilt on restore.
#[derive(Debug, Serialize, Deserialize)]
struct CollectionSnapshot {
    config: CollectionConfig,
    documents: BTreeMap<String, Document>,
    index_names: Vec<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreSnapshot {
    collections: BTreeMap<String, CollectionSnapshot>,
}

/// The top-level registry of named collections.
///
/// Collections are handed out as `Arc<Collection>`; the registry lock is
/// released before any collection lock is taken, except in [`Store::dump`]
/// which always locks store first, then one collection at a time.
#[derive(Debug, Default)]
pub struct Store {
    collections: RwLock<HashMap<String, Arc<Collection>>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty collection. `config` is required; `None` is rejected
    /// with `UnsupportedField`.
    pub fn create_collection(
        &self,
        name: &str,
        config: Option<CollectionConfig>,
    ) -> CoreResult<Arc<Collection>> {
        let config =
            config.ok_or_else(|| CoreError::UnsupportedField("missing collection config".into()))?;
        let mut collections = self.collections.write();
        if collections.contains_key(name) {
            return Err(CoreError::CollectionAlreadyExists(name.to_owned()));
        }
        let collection = Arc::new(Collection::new(config));
        collections.insert(name.to_owned(), Arc::clone(&collection));
        debug!(name, "created collection");
        Ok(collection)
    }

    pub fn get_collection(&self, name: &str) -> CoreResult<Arc<Collection>> {
        self.collections
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| CoreError::CollectionNotFound(name.to_owned()))
    }

    pub fn delete_collection(&self, name: &str) -> CoreResult<()> {
        self.collections
            .write()
            .remove(name)
            .ok_or_else(|| CoreError::CollectionNotFound(name.to_owned()))?;
        debug!(name, "deleted collection");
        Ok(())
    }

    /// Names of all collections, sorted.
    pub fn list_collections(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Serialize every collection's config, documents and index names.
    pub fn dump(&self) -> CoreResult<Vec<u8>> {
        let collections = self.collections.read();
        let mut snapshot = StoreSnapshot::default();
        for (name, collection) in collections.iter() {
            let (documents, index_names) = collection.snapshot();
            snapshot.collections.insert(
                name.clone(),
                CollectionSnapshot {
                    config: collection.config().clone(),
                    documents,
                    index_names,
                },
            );
        }
        drop(collections);
        Ok(serde_json::to_vec_pretty(&snapshot)?)
    }

    /// Restore a store from [`Store::dump`] output.
    ///
    /// Nothing is returned unless every collection and index restored cleanly.
    pub fn from_dump(dump: &[u8]) -> CoreResult<Self> {
        let snapshot: StoreSnapshot = serde_json::from_slice(dump)?;
        let mut collections = HashMap::with_capacity(snapshot.collections.len());
        for (name, data) in snapshot.collections {
            let collection = Collection::restore(data.config, data.documents, &data.index_names)?;
            collections.insert(name, Arc::new(collection));
        }
        info!(collections = collections.len(), "restored store from snapshot");
        Ok(Self {
            collections: RwLock::new(collections),
        })
    }

    pub fn dump_to_file(&self, path: impl AsRef<Path>) -> CoreResult<()> {
        let dump = self.dump()?;
        std::fs::write(path, dump)?;
        Ok(())
    }

    pub fn from_file(path: impl AsRef<Path>) -> CoreResult<Self> {
        let dump = std::fs::read(path)?;
        Self::from_dump(&dump)
    }
}
