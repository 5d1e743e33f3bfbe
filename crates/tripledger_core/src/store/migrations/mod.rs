//! Schema history of the document store.
//!
//! # Responsibility
//! - Keep the `documents` table and its relationship indexes versioned.
//! - Bring an opened database up to the latest version in one transaction.
//!
//! # Invariants
//! - Versions are strictly increasing, starting at 1.
//! - `PRAGMA user_version` equals the last applied version.
//! - A database written by a newer binary is never touched.
//!
//! Indexes are expression indexes over JSON paths, so a new relationship
//! field only needs a new step here, never a table rewrite.

use crate::store::{StoreError, StoreResult};
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        name: "documents",
        sql: include_str!("0001_documents.sql"),
    },
    SchemaStep {
        version: 2,
        name: "relationship_indexes",
        sql: include_str!("0002_relationship_indexes.sql"),
    },
];

/// Latest schema version this binary can read.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Upgrades `conn` to [`latest_version`].
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file is newer than this binary.
/// - `Sqlite` when a step fails; the transaction is rolled back.
pub fn apply_migrations(conn: &mut Connection) -> StoreResult<()> {
    let from = read_schema_version(conn)?;
    let latest = latest_version();
    if from > latest {
        return Err(StoreError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: latest,
        });
    }

    let pending: Vec<&SchemaStep> = steps_after(from).collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in &pending {
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
    }
    tx.commit()?;

    let names: Vec<&str> = pending.iter().map(|step| step.name).collect();
    info!(
        "event=store_migrate module=store status=ok from={} to={} steps={}",
        from,
        latest,
        names.join(",")
    );
    Ok(())
}

pub(crate) fn read_schema_version(conn: &Connection) -> StoreResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?)
}

fn steps_after(version: u32) -> impl Iterator<Item = &'static SchemaStep> {
    SCHEMA_STEPS.iter().filter(move |step| step.version > version)
}
