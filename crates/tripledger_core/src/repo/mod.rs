//! Entity accessors over the document store.
//!
//! # Responsibility
//! - Define use-case oriented read contracts for trips, stops, expenses and
//!   days.
//! - Isolate collection names, field names and ordering from analytics code.
//!
//! # Invariants
//! - Single fetches return `Ok(None)` for missing keys.
//! - List fetches return `Ok(vec![])` when nothing matches.
//! - Every list applies an explicit sort key, ties broken by document key.
//! - Store failures are returned unchanged inside `RepoError::Store`.

pub mod travel_repo;

use crate::store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Collection names used by the trip datastore.
pub mod collections {
    pub const TRIPS: &str = "viagens";
    pub const STOPS: &str = "paradas";
    pub const EXPENSES: &str = "despesas";
    pub const DAYS: &str = "diasViagem";
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for entity reads.
#[derive(Debug)]
pub enum RepoError {
    /// Storage-layer failure (network, auth, quota, SQLite).
    Store(StoreError),
    /// Persisted document does not decode into a valid entity.
    InvalidData {
        collection: &'static str,
        key: String,
        message: String,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::InvalidData {
                collection,
                key,
                message,
            } => write!(f, "invalid persisted document {collection}/{key}: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::InvalidData { .. } => None,
        }
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}
