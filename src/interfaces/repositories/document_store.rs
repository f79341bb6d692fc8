use std::{cmp::Ordering, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

use crate::errors::StoreError;

pub const CREATED_AT: &str = "createdAt";
pub const UPDATED_AT: &str = "updatedAt";

/// Field map of a schemaless document. The id lives beside it, never inside.
pub type DocumentData = Map<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: DocumentData,
}

impl Document {
    pub fn new(id: impl Into<String>, data: DocumentData) -> Self {
        Document { id: id.into(), data }
    }

    /// Server timestamp stored under `field`, if present and well formed.
    pub fn timestamp(&self, field: &str) -> Option<DateTime<Utc>> {
        self.data
            .get(field)
            .and_then(Value::as_str)
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// The subset of queries the hosted store supports without composite
/// indexes: equality filters, a single order field and a limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<(String, Value)>,
    pub order_by: Option<(String, Direction)>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Query::default()
    }

    pub fn where_eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters.push((field.to_string(), value.into()));
        self
    }

    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.order_by = Some((field.to_string(), direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, data: &DocumentData) -> bool {
        self.filters
            .iter()
            .all(|(field, expected)| data.get(field) == Some(expected))
    }
}

/// Collection/document access to the content database.
///
/// Implementations own the clock: `add` stamps `createdAt` and `updatedAt`,
/// `update` stamps `updatedAt`, so ordering never depends on a caller's clock.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Inserts a document and returns its newly assigned id.
    async fn add(&self, collection: &str, data: DocumentData) -> Result<String, StoreError>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Merges `patch` into an existing document. `StoreError::NotFound` if absent.
    async fn update(&self, collection: &str, id: &str, patch: DocumentData) -> Result<(), StoreError>;

    /// Removes a document. `StoreError::NotFound` if absent.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// Runs `query`. Ordering on a field skips documents that lack it.
    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

#[async_trait]
impl<T> DocumentStore for Arc<T>
where
    T: DocumentStore + ?Sized,
{
    async fn add(&self, collection: &str, data: DocumentData) -> Result<String, StoreError> {
        (**self).add(collection, data).await
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        (**self).get(collection, id).await
    }

    async fn update(&self, collection: &str, id: &str, patch: DocumentData) -> Result<(), StoreError> {
        (**self).update(collection, id, patch).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        (**self).delete(collection, id).await
    }

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError> {
        (**self).query(collection, query).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        (**self).ping().await
    }
}

pub type SharedStore = Arc<dyn DocumentStore>;

/// Converts query results, dropping documents that cannot be read so one bad
/// record does not hide the rest of a collection.
pub fn decode_documents<T>(collection: &str, docs: Vec<Document>) -> Vec<T>
where
    T: TryFrom<Document, Error = StoreError>,
{
    docs.into_iter()
        .filter_map(|doc| match T::try_from(doc) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!(collection, error = %e, "Skipping unreadable document");
                None
            }
        })
        .collect()
}

/// Canonical text form of a server timestamp. Fixed width, so the strings
/// sort in time order.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Total order over JSON values: null < bool < number < string < array < object.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}
