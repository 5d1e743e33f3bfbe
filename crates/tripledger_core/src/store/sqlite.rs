//! SQLite-backed document store.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections and apply migrations.
//! - Translate `DocumentQuery` filters and ordering into `json_extract` SQL.
//!
//! # Invariants
//! - Returned stores have migrations fully applied.
//! - Field names reach SQL only after `DocumentQuery::validate()`.
//! - Filters only match values of the same JSON kind as the bound value.

use super::migrations::{apply_migrations, read_schema_version};
use super::{Document, DocumentQuery, DocumentStore, SortDirection, StoreError, StoreResult};
use chrono::{DateTime, Utc};
use log::{error, info};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};
use uuid::Uuid;

const DOCUMENT_SELECT_SQL: &str = "SELECT key, body, created_at, updated_at FROM documents";

/// Document store persisted in one SQLite `documents` table.
pub struct SqliteDocumentStore {
    conn: Mutex<Connection>,
}

impl SqliteDocumentStore {
    /// Opens a SQLite database file and applies all pending migrations.
    ///
    /// # Side effects
    /// - Emits `store_open` logging events with duration and status.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        open_with("file", || Connection::open(path))
    }

    /// Opens an in-memory SQLite database and applies all pending migrations.
    pub fn open_in_memory() -> StoreResult<Self> {
        open_with("memory", Connection::open_in_memory)
    }

    /// Stores one document, generating a v4 UUID key when `key` is `None`.
    ///
    /// Seeding/import entry point; the analytics core never calls it.
    /// An existing document under the same key is replaced.
    pub fn insert<T: Serialize>(
        &self,
        collection: &str,
        key: Option<&str>,
        value: &T,
    ) -> StoreResult<String> {
        let fields: Map<String, Value> = serde_json::from_value(serde_json::to_value(value)?)?;
        let key = key.map_or_else(|| Uuid::new_v4().to_string(), str::to_string);
        let body = serde_json::to_string(&fields)?;

        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO documents (collection, key, body)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (collection, key) DO UPDATE SET
                body = excluded.body,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![collection, key.as_str(), body],
        )?;
        Ok(key)
    }

    /// Returns the applied schema version.
    pub fn schema_version(&self) -> StoreResult<u32> {
        let conn = self.lock()?;
        read_schema_version(&conn)
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl DocumentStore for SqliteDocumentStore {
    fn get(&self, collection: &str, key: &str) -> StoreResult<Option<Document>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "{DOCUMENT_SELECT_SQL}
             WHERE collection = ?1
               AND key = ?2;"
        ))?;
        let row = stmt
            .query_row(params![collection, key], read_row)
            .optional()?;
        row.map(parse_document).transpose()
    }

    fn query(&self, collection: &str, query: &DocumentQuery) -> StoreResult<Vec<Document>> {
        query.validate()?;

        let mut sql = format!("{DOCUMENT_SELECT_SQL} WHERE collection = ?");
        let mut bind_values: Vec<SqlValue> = vec![SqlValue::Text(collection.to_string())];

        for filter in &query.filters {
            let path = json_path(&filter.field);
            let Some(bound) = to_sql_value(&filter.value) else {
                // Null and composite values never match a filter.
                return Ok(Vec::new());
            };
            sql.push_str(&format!(
                " AND json_type(body, '{path}') IN ({}) AND json_extract(body, '{path}') {} ?",
                json_types_for(&filter.value),
                filter.op.sql(),
            ));
            bind_values.push(bound);
        }

        match &query.order_by {
            Some(order) => {
                let direction = match order.direction {
                    SortDirection::Ascending => "ASC",
                    SortDirection::Descending => "DESC",
                };
                sql.push_str(&format!(
                    " ORDER BY json_extract(body, '{}') {direction}, key ASC",
                    json_path(&order.field)
                ));
            }
            None => sql.push_str(" ORDER BY key ASC"),
        }

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut documents = Vec::new();
        while let Some(row) = rows.next()? {
            documents.push(parse_document(read_row(row)?)?);
        }

        Ok(documents)
    }
}

fn open_with(
    mode: &str,
    opener: impl FnOnce() -> rusqlite::Result<Connection>,
) -> StoreResult<SqliteDocumentStore> {
    let started_at = Instant::now();
    info!("event=store_open module=store status=start mode={mode}");

    let mut conn = match opener() {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=store_open module=store status=error mode={mode} duration_ms={} error_code=store_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&mut conn) {
        Ok(()) => {
            info!(
                "event=store_open module=store status=ok mode={mode} duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(SqliteDocumentStore {
                conn: Mutex::new(conn),
            })
        }
        Err(err) => {
            error!(
                "event=store_open module=store status=error mode={mode} duration_ms={} error_code=store_bootstrap_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(conn: &mut Connection) -> StoreResult<()> {
    conn.busy_timeout(Duration::from_secs(5))?;
    apply_migrations(conn)?;
    Ok(())
}

type RawRow = (String, String, i64, i64);

fn read_row(row: &Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((
        row.get("key")?,
        row.get("body")?,
        row.get("created_at")?,
        row.get("updated_at")?,
    ))
}

fn parse_document((key, body, created_at, updated_at): RawRow) -> StoreResult<Document> {
    let fields: Map<String, Value> = serde_json::from_str(&body)?;
    Ok(Document {
        key,
        fields,
        created_at: epoch_ms_to_utc(created_at),
        updated_at: epoch_ms_to_utc(updated_at),
    })
}

fn epoch_ms_to_utc(value: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(value)
}

fn json_path(field: &str) -> String {
    format!("$.{field}")
}

fn to_sql_value(value: &Value) -> Option<SqlValue> {
    match value {
        Value::String(text) => Some(SqlValue::Text(text.clone())),
        Value::Bool(flag) => Some(SqlValue::Integer(i64::from(*flag))),
        Value::Number(number) => match number.as_i64() {
            Some(integer) => Some(SqlValue::Integer(integer)),
            None => number.as_f64().map(SqlValue::Real),
        },
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn json_types_for(value: &Value) -> &'static str {
    match value {
        Value::String(_) => "'text'",
        Value::Bool(_) => "'true', 'false'",
        _ => "'integer', 'real'",
    }
}
