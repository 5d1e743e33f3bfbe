//! Document storage contract and bootstrap entry points.
//!
//! # Responsibility
//! - Define the read contract the analytics core issues against the
//!   trip datastore (`get` by key, `query` by filters + ordering).
//! - Provide a SQLite-backed store and an in-memory store with identical
//!   query semantics.
//!
//! # Invariants
//! - Missing keys are `Ok(None)`, empty matches are `Ok(vec![])`.
//! - Query results are ordered by the requested field, then by ascending key.
//! - Documents without the order field sort first ascending, last descending.
//! - Migration version is tracked via `PRAGMA user_version`.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory;
pub mod migrations;
mod sqlite;

pub use memory::MemoryDocumentStore;
pub use sqlite::SqliteDocumentStore;

static FIELD_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid field name regex"));

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage-layer failure. Surfaced to callers unchanged.
#[derive(Debug)]
pub enum StoreError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Filter or order field is not a plain top-level field name.
    InvalidField(String),
    Serialization(serde_json::Error),
    /// Backend could not be reached or refused the request.
    Unavailable(String),
    /// A thread panicked while holding the connection lock.
    Poisoned,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::InvalidField(field) => write!(f, "invalid document field name `{field}`"),
            Self::Serialization(err) => write!(f, "document serialization failed: {err}"),
            Self::Unavailable(message) => write!(f, "document store unavailable: {message}"),
            Self::Poisoned => write!(f, "document store connection lock poisoned"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. }
            | Self::InvalidField(_)
            | Self::Unavailable(_)
            | Self::Poisoned => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// One stored document: store-assigned key plus its field map.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub key: String,
    pub fields: Map<String, Value>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Document {
    pub fn new(key: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            key: key.into(),
            fields,
            created_at: None,
            updated_at: None,
        }
    }

    /// Returns the top-level field value, treating JSON `null` as absent.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).filter(|value| !value.is_null())
    }
}

/// Comparison operator for one field filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl FilterOp {
    pub(crate) fn sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
        }
    }

    fn accepts(self, ordering: Ordering) -> bool {
        match self {
            Self::Eq => ordering == Ordering::Equal,
            Self::Gt => ordering == Ordering::Greater,
            Self::Gte => ordering != Ordering::Less,
            Self::Lt => ordering == Ordering::Less,
            Self::Lte => ordering != Ordering::Greater,
        }
    }
}

/// Filter on one top-level document field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl FieldFilter {
    /// Returns whether `document` satisfies this filter.
    ///
    /// Values of different JSON kinds never match, and neither does an
    /// absent field.
    pub fn matches(&self, document: &Document) -> bool {
        document
            .field(&self.field)
            .and_then(|actual| compare_values(actual, &self.value))
            .is_some_and(|ordering| self.op.accepts(ordering))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: SortDirection,
}

/// Query over one collection: conjunction of filters plus optional ordering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentQuery {
    pub filters: Vec<FieldFilter>,
    pub order_by: Option<OrderBy>,
}

impl DocumentQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, field: &str, op: FilterOp, value: impl Into<Value>) -> Self {
        self.filters.push(FieldFilter {
            field: field.to_string(),
            op,
            value: value.into(),
        });
        self
    }

    pub fn where_eq(self, field: &str, value: impl Into<Value>) -> Self {
        self.filter(field, FilterOp::Eq, value)
    }

    pub fn order_by(mut self, field: &str, direction: SortDirection) -> Self {
        self.order_by = Some(OrderBy {
            field: field.to_string(),
            direction,
        });
        self
    }

    /// Rejects field names that are not plain identifiers.
    pub fn validate(&self) -> StoreResult<()> {
        let names = self
            .filters
            .iter()
            .map(|filter| filter.field.as_str())
            .chain(self.order_by.iter().map(|order| order.field.as_str()));
        for name in names {
            if !is_valid_field_name(name) {
                return Err(StoreError::InvalidField(name.to_string()));
            }
        }
        Ok(())
    }

    /// Compares two documents by this query's ordering, then by key.
    pub fn compare(&self, left: &Document, right: &Document) -> Ordering {
        let by_field = match &self.order_by {
            Some(order) => {
                let ordering = compare_optional(left.field(&order.field), right.field(&order.field));
                match order.direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            }
            None => Ordering::Equal,
        };
        by_field.then_with(|| left.key.cmp(&right.key))
    }
}

/// Read contract against the backing document store.
pub trait DocumentStore: Send + Sync {
    /// Fetches one document by key.
    fn get(&self, collection: &str, key: &str) -> StoreResult<Option<Document>>;
    /// Returns all documents matching `query`, in query order.
    fn query(&self, collection: &str, query: &DocumentQuery) -> StoreResult<Vec<Document>>;
}

impl<S: DocumentStore + ?Sized> DocumentStore for &S {
    fn get(&self, collection: &str, key: &str) -> StoreResult<Option<Document>> {
        (**self).get(collection, key)
    }

    fn query(&self, collection: &str, query: &DocumentQuery) -> StoreResult<Vec<Document>> {
        (**self).query(collection, query)
    }
}

impl<S: DocumentStore + ?Sized> DocumentStore for std::sync::Arc<S> {
    fn get(&self, collection: &str, key: &str) -> StoreResult<Option<Document>> {
        (**self).get(collection, key)
    }

    fn query(&self, collection: &str, query: &DocumentQuery) -> StoreResult<Vec<Document>> {
        (**self).query(collection, query)
    }
}

pub(crate) fn is_valid_field_name(name: &str) -> bool {
    FIELD_NAME_RE.is_match(name)
}

fn compare_optional(left: Option<&Value>, right: Option<&Value>) -> Ordering {
    match (left, right) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(left), Some(right)) => {
            compare_values(left, right).unwrap_or_else(|| kind_rank(left).cmp(&kind_rank(right)))
        }
    }
}

// Mirrors SQLite's cross-type ordering: numbers < text < everything else.
fn kind_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) | Value::Number(_) => 1,
        Value::String(_) => 2,
        Value::Array(_) | Value::Object(_) => 3,
    }
}

fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(left), Value::Number(right)) => left.as_f64()?.partial_cmp(&right.as_f64()?),
        (Value::String(left), Value::String(right)) => Some(left.cmp(right)),
        (Value::Bool(left), Value::Bool(right)) => Some(left.cmp(right)),
        _ => None,
    }
}
