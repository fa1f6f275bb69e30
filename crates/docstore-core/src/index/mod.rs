mod registry;

pub use registry::IndexRegistry;

use crate::document::Document;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Bounds and direction for a range scan over an index.
///
/// Both bounds are inclusive and optional (`None` means unbounded).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParams {
    #[serde(default)]
    pub desc: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<String>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min(mut self, value: impl Into<String>) -> Self {
        self.min_value = Some(value.into());
        self
    }

    pub fn max(mut self, value: impl Into<String>) -> Self {
        self.max_value = Some(value.into());
        self
    }

    pub fn descending(mut self) -> Self {
        self.desc = true;
        self
    }
}

/// A secondary index over one string-typed field.
///
/// `buckets` maps each distinct field value to the documents carrying it, in
/// the order they were added. `keys` holds exactly the keys of `buckets`,
/// sorted ascending, and drives range scans.
#[derive(Debug, Clone)]
pub struct Index {
    field: String,
    buckets: HashMap<String, Vec<Arc<Document>>>,
    keys: Vec<String>,
}

impl Index {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            buckets: HashMap::new(),
            keys: Vec::new(),
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    /// Add a document. Documents without a string value for the field are skipped.
    pub fn insert(&mut self, doc: &Arc<Document>) {
        let Some(value) = doc.get_str(&self.field) else {
            return;
        };
        if !self.buckets.contains_key(value) {
            if let Err(pos) = self.keys.binary_search_by(|k| k.as_str().cmp(value)) {
                self.keys.insert(pos, value.to_owned());
            }
        }
        self.buckets
            .entry(value.to_owned())
            .or_default()
            .push(Arc::clone(doc));
    }

    /// Remove a previously inserted document. Empty buckets are pruned along
    /// with their entry in the key sequence.
    pub fn remove(&mut self, doc: &Arc<Document>) {
        let Some(value) = doc.get_str(&self.field) else {
            return;
        };
        let Some(bucket) = self.buckets.get_mut(value) else {
            return;
        };
        if let Some(pos) = bucket.iter().position(|d| Arc::ptr_eq(d, doc)) {
            bucket.remove(pos);
        }
        if bucket.is_empty() {
            self.buckets.remove(value);
            if let Ok(pos) = self.keys.binary_search_by(|k| k.as_str().cmp(value)) {
                self.keys.remove(pos);
            }
        }
    }

    /// Range scan over distinct values within the bounds of `params`.
    ///
    /// Value groups come out in ascending order (descending if `params.desc`);
    /// documents within a group keep their insertion order either way.
    pub fn range(&self, params: &QueryParams) -> Vec<&Arc<Document>> {
        let start = match &params.min_value {
            Some(min) => self.keys.partition_point(|k| k < min),
            None => 0,
        };
        let end = match &params.max_value {
            Some(max) => self.keys.partition_point(|k| k <= max),
            None => self.keys.len(),
        };
        if start >= end {
            return Vec::new();
        }

        let selected = &self.keys[start..end];
        let bucket = |key: &String| self.buckets.get(key).into_iter().flatten();
        if params.desc {
            selected.iter().rev().flat_map(bucket).collect()
        } else {
            selected.iter().flat_map(bucket).collect()
        }
    }

    /// The sorted sequence of distinct indexed values.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Number of distinct values in the index.
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Total number of document references in the index.
    pub fn entry_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Whether the key sequence is strictly ascending and matches the bucket
    /// keys exactly, with no empty buckets.
    pub fn is_consistent(&self) -> bool {
        self.keys.windows(2).all(|w| w[0] < w[1])
            && self.keys.len() == self.buckets.len()
            && self
                .keys
                .iter()
                .all(|k| self.buckets.get(k).is_some_and(|b| !b.is_empty()))
    }
}
