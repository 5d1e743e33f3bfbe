//! In-process document store.
//!
//! Same query semantics as the SQLite store, without any I/O. Used as the
//! injected fake in tests and for short-lived analytics over imported data.

use super::{Document, DocumentQuery, DocumentStore, StoreError, StoreResult};
use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard};
use uuid::Uuid;

type Collections = BTreeMap<String, BTreeMap<String, Document>>;

/// Document store held entirely in memory.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<Collections>,
    failure: RwLock<Option<String>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores one document, generating a v4 UUID key when `key` is `None`.
    ///
    /// An existing document under the same key is replaced and keeps its
    /// creation timestamp.
    pub fn insert<T: Serialize>(
        &self,
        collection: &str,
        key: Option<&str>,
        value: &T,
    ) -> StoreResult<String> {
        let fields: Map<String, Value> = serde_json::from_value(serde_json::to_value(value)?)?;
        let key = key.map_or_else(|| Uuid::new_v4().to_string(), str::to_string);
        let now = Utc::now();

        let mut collections = self.collections.write().map_err(|_| StoreError::Poisoned)?;
        let documents = collections.entry(collection.to_string()).or_default();
        let created_at = documents
            .get(&key)
            .and_then(|existing| existing.created_at)
            .unwrap_or(now);
        documents.insert(
            key.clone(),
            Document {
                key: key.clone(),
                fields,
                created_at: Some(created_at),
                updated_at: Some(now),
            },
        );
        Ok(key)
    }

    /// Makes every subsequent read fail with `StoreError::Unavailable`.
    ///
    /// Passing `None` restores normal operation.
    pub fn fail_with(&self, message: Option<&str>) {
        if let Ok(mut failure) = self.failure.write() {
            *failure = message.map(str::to_string);
        }
    }

    /// Number of documents stored in `collection`.
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .map(|collections| collections.get(collection).map_or(0, BTreeMap::len))
            .unwrap_or(0)
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Collections>> {
        let failure = self.failure.read().map_err(|_| StoreError::Poisoned)?;
        if let Some(message) = failure.as_ref() {
            return Err(StoreError::Unavailable(message.clone()));
        }
        self.collections.read().map_err(|_| StoreError::Poisoned)
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn get(&self, collection: &str, key: &str) -> StoreResult<Option<Document>> {
        let collections = self.read()?;
        Ok(collections
            .get(collection)
            .and_then(|documents| documents.get(key))
            .cloned())
    }

    fn query(&self, collection: &str, query: &DocumentQuery) -> StoreResult<Vec<Document>> {
        query.validate()?;

        let collections = self.read()?;
        let Some(documents) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut matched: Vec<Document> = documents
            .values()
            .filter(|document| query.filters.iter().all(|filter| filter.matches(document)))
            .cloned()
            .collect();
        matched.sort_by(|left, right| query.compare(left, right));
        Ok(matched)
    }
}
