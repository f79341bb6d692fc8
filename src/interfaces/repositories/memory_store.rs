use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    errors::StoreError,
    repositories::document_store::{
        compare_values, format_timestamp, Direction, Document, DocumentData, DocumentStore, Query,
        CREATED_AT, UPDATED_AT,
    },
};

#[derive(Debug, Default)]
struct Collections {
    // Insertion order is kept so ties in ordering stay stable.
    documents: HashMap<String, Vec<Document>>,
    last_stamp: Option<DateTime<Utc>>,
}

impl Collections {
    /// Store clock. Strictly increasing so two writes never share a stamp.
    fn next_stamp(&mut self) -> String {
        let mut now = Utc::now();
        if let Some(last) = self.last_stamp {
            if now <= last {
                now = last + Duration::microseconds(1);
            }
        }
        self.last_stamp = Some(now);
        format_timestamp(now)
    }
}

/// Process-local [`DocumentStore`], used when no database is configured and
/// throughout the test suite.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStore {
    inner: Arc<RwLock<Collections>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        MemoryDocumentStore::default()
    }

    /// Inserts a document verbatim, bypassing the store clock. Useful for
    /// seeding documents written by older revisions of the site.
    pub fn insert_raw(&self, collection: &str, id: &str, data: DocumentData) {
        let mut inner = self.inner.write();
        inner
            .documents
            .entry(collection.to_string())
            .or_default()
            .push(Document::new(id, data));
    }

    pub fn len(&self, collection: &str) -> usize {
        self.inner
            .read()
            .documents
            .get(collection)
            .map_or(0, Vec::len)
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn add(&self, collection: &str, mut data: DocumentData) -> Result<String, StoreError> {
        let mut inner = self.inner.write();
        let stamp = inner.next_stamp();
        data.insert(CREATED_AT.into(), Value::String(stamp.clone()));
        data.insert(UPDATED_AT.into(), Value::String(stamp));

        let id = Uuid::new_v4().to_string();
        inner
            .documents
            .entry(collection.to_string())
            .or_default()
            .push(Document::new(id.clone(), data));

        Ok(id)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let inner = self.inner.read();
        Ok(inner
            .documents
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| doc.id == id))
            .cloned())
    }

    async fn update(&self, collection: &str, id: &str, patch: DocumentData) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        let stamp = inner.next_stamp();

        let doc = inner
            .documents
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|doc| doc.id == id))
            .ok_or(StoreError::NotFound)?;

        for (field, value) in patch {
            doc.data.insert(field, value);
        }
        doc.data.insert(UPDATED_AT.into(), Value::String(stamp));

        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        let docs = inner
            .documents
            .get_mut(collection)
            .ok_or(StoreError::NotFound)?;

        let before = docs.len();
        docs.retain(|doc| doc.id != id);

        if docs.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError> {
        let inner = self.inner.read();
        let mut results: Vec<Document> = inner
            .documents
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| query.matches(&doc.data))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some((field, direction)) = &query.order_by {
            results.retain(|doc| doc.data.get(field).is_some_and(|v| !v.is_null()));
            results.sort_by(|a, b| {
                let ordering = compare_values(&a.data[field.as_str()], &b.data[field.as_str()]);
                match direction {
                    Direction::Ascending => ordering,
                    Direction::Descending => ordering.reverse(),
                }
            });
        }

        if let Some(limit) = query.limit {
            results.truncate(limit);
        }

        Ok(results)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(value: Value) -> DocumentData {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn add_stamps_both_timestamps() {
        let store = MemoryDocumentStore::new();
        let id = store.add("posts", data(json!({"title": "Hello"}))).await.unwrap();

        let doc = store.get("posts", &id).await.unwrap().unwrap();
        assert_eq!(doc.data["title"], "Hello");
        assert!(doc.timestamp(CREATED_AT).is_some());
        assert_eq!(doc.data[CREATED_AT], doc.data[UPDATED_AT]);
    }

    #[tokio::test]
    async fn update_merges_and_restamps() {
        let store = MemoryDocumentStore::new();
        let id = store.add("posts", data(json!({"title": "Old", "featured": true}))).await.unwrap();

        store.update("posts", &id, data(json!({"title": "New"}))).await.unwrap();

        let doc = store.get("posts", &id).await.unwrap().unwrap();
        assert_eq!(doc.data["title"], "New");
        assert_eq!(doc.data["featured"], true);
        assert!(doc.timestamp(UPDATED_AT) > doc.timestamp(CREATED_AT));
    }

    #[tokio::test]
    async fn update_and_delete_missing_documents_fail() {
        let store = MemoryDocumentStore::new();

        assert_eq!(
            store.update("posts", "nope", DocumentData::new()).await,
            Err(StoreError::NotFound)
        );
        assert_eq!(store.delete("posts", "nope").await, Err(StoreError::NotFound));
    }

    #[tokio::test]
    async fn query_orders_newest_first_and_limits() {
        let store = MemoryDocumentStore::new();
        let first = store.add("posts", data(json!({"n": 1}))).await.unwrap();
        let second = store.add("posts", data(json!({"n": 2}))).await.unwrap();
        let third = store.add("posts", data(json!({"n": 3}))).await.unwrap();

        let query = Query::new().order_by(CREATED_AT, Direction::Descending);
        let ids: Vec<String> = store.query("posts", &query).await.unwrap()
            .into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![third.clone(), second.clone(), first]);

        let limited = store.query("posts", &query.limit(2)).await.unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].id, third);
    }

    #[tokio::test]
    async fn ordering_skips_documents_missing_the_field() {
        let store = MemoryDocumentStore::new();
        store.add("projects", data(json!({"title": "stamped"}))).await.unwrap();
        store.insert_raw("projects", "legacy", data(json!({"title": "unstamped"})));

        let all = store.query("projects", &Query::new()).await.unwrap();
        assert_eq!(all.len(), 2);

        let ordered = store
            .query("projects", &Query::new().order_by(CREATED_AT, Direction::Ascending))
            .await
            .unwrap();
        assert_eq!(ordered.len(), 1);
        assert_eq!(ordered[0].data["title"], "stamped");
    }

    #[tokio::test]
    async fn collections_are_independent() {
        let store = MemoryDocumentStore::new();
        let id = store.add("posts", data(json!({"title": "a"}))).await.unwrap();

        assert!(store.get("projects", &id).await.unwrap().is_none());
        assert_eq!(store.len("posts"), 1);
        assert!(store.is_empty("projects"));
    }
}
