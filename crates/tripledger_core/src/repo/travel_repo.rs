//! Travel entity repository contracts and document-store implementation.
//!
//! # Responsibility
//! - Provide typed fetch-by-key and list-by-relationship reads.
//! - Decode store documents into validated entities.
//!
//! # Invariants
//! - Read paths reject invalid persisted state instead of masking it.
//! - Default orders: trips by start date DESC, stops by arrival ASC,
//!   expenses by date DESC, days by day number ASC.

use super::collections::{DAYS, EXPENSES, STOPS, TRIPS};
use super::{RepoError, RepoResult};
use crate::model::day::TripDay;
use crate::model::expense::{Expense, ExpenseCategory, ExpenseKind};
use crate::model::stop::Stop;
use crate::model::trip::{Trip, TripStatus};
use crate::model::ModelValidationError;
use crate::store::{Document, DocumentQuery, DocumentStore, FilterOp, SortDirection};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

const FIELD_TRIP_ID: &str = "viagemId";
const FIELD_USER_ID: &str = "usuarioId";
const FIELD_DAY_ID: &str = "diaViagemId";
const FIELD_STOP_ID: &str = "paradaId";
const FIELD_STATUS: &str = "status";
const FIELD_START_DATE: &str = "dataInicio";
const FIELD_ARRIVAL: &str = "horaChegada";
const FIELD_EXPENSE_DATE: &str = "data";
const FIELD_EXPENSE_KIND: &str = "tipo";
const FIELD_CATEGORY: &str = "categoria";
const FIELD_DAY_NUMBER: &str = "numeroDia";

/// Read-only accessor for travel entities.
///
/// `Sync` so analytics can fan reads out across scoped threads.
pub trait TravelRepository: Sync {
    fn get_trip(&self, id: &str) -> RepoResult<Option<Trip>>;
    fn get_stop(&self, id: &str) -> RepoResult<Option<Stop>>;
    fn get_expense(&self, id: &str) -> RepoResult<Option<Expense>>;
    fn get_day(&self, id: &str) -> RepoResult<Option<TripDay>>;

    /// Trips owned by `user_id`, newest start date first.
    fn list_trips_for_user(&self, user_id: &str) -> RepoResult<Vec<Trip>>;
    fn list_trips_for_user_with_status(
        &self,
        user_id: &str,
        status: TripStatus,
    ) -> RepoResult<Vec<Trip>>;
    /// Trips whose start date falls within `[from, to]`, newest first.
    fn list_trips_in_range(
        &self,
        user_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> RepoResult<Vec<Trip>>;

    /// Stops of one trip in arrival order; stops without arrival come first.
    fn list_stops_for_trip(&self, trip_id: &str) -> RepoResult<Vec<Stop>>;
    fn list_stops_for_day(&self, day_id: &str) -> RepoResult<Vec<Stop>>;

    /// Expenses of one trip, most recent first.
    fn list_expenses_for_trip(&self, trip_id: &str) -> RepoResult<Vec<Expense>>;
    fn list_expenses_for_trip_by_kind(
        &self,
        trip_id: &str,
        kind: ExpenseKind,
    ) -> RepoResult<Vec<Expense>>;
    fn list_expenses_for_trip_by_category(
        &self,
        trip_id: &str,
        category: ExpenseCategory,
    ) -> RepoResult<Vec<Expense>>;
    fn list_expenses_for_day(&self, day_id: &str) -> RepoResult<Vec<Expense>>;
    fn list_expenses_for_stop(&self, stop_id: &str) -> RepoResult<Vec<Expense>>;

    /// Days of one trip in day-number order.
    fn list_days_for_trip(&self, trip_id: &str) -> RepoResult<Vec<TripDay>>;
}

/// Repository over an injected [`DocumentStore`].
pub struct DocumentTravelRepository<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> DocumentTravelRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn fetch<T: StoredEntity>(&self, key: &str) -> RepoResult<Option<T>> {
        self.store
            .get(T::COLLECTION, key)?
            .map(decode_entity)
            .transpose()
    }

    fn list<T: StoredEntity>(&self, query: DocumentQuery) -> RepoResult<Vec<T>> {
        self.store
            .query(T::COLLECTION, &query)?
            .into_iter()
            .map(decode_entity)
            .collect()
    }
}

impl<S: DocumentStore> TravelRepository for DocumentTravelRepository<S> {
    fn get_trip(&self, id: &str) -> RepoResult<Option<Trip>> {
        self.fetch(id)
    }

    fn get_stop(&self, id: &str) -> RepoResult<Option<Stop>> {
        self.fetch(id)
    }

    fn get_expense(&self, id: &str) -> RepoResult<Option<Expense>> {
        self.fetch(id)
    }

    fn get_day(&self, id: &str) -> RepoResult<Option<TripDay>> {
        self.fetch(id)
    }

    fn list_trips_for_user(&self, user_id: &str) -> RepoResult<Vec<Trip>> {
        self.list(trips_query().where_eq(FIELD_USER_ID, user_id))
    }

    fn list_trips_for_user_with_status(
        &self,
        user_id: &str,
        status: TripStatus,
    ) -> RepoResult<Vec<Trip>> {
        self.list(
            trips_query()
                .where_eq(FIELD_USER_ID, user_id)
                .where_eq(FIELD_STATUS, status.as_str()),
        )
    }

    fn list_trips_in_range(
        &self,
        user_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> RepoResult<Vec<Trip>> {
        self.list(
            trips_query()
                .where_eq(FIELD_USER_ID, user_id)
                .filter(FIELD_START_DATE, FilterOp::Gte, from.timestamp_millis())
                .filter(FIELD_START_DATE, FilterOp::Lte, to.timestamp_millis()),
        )
    }

    fn list_stops_for_trip(&self, trip_id: &str) -> RepoResult<Vec<Stop>> {
        self.list(stops_query().where_eq(FIELD_TRIP_ID, trip_id))
    }

    fn list_stops_for_day(&self, day_id: &str) -> RepoResult<Vec<Stop>> {
        self.list(stops_query().where_eq(FIELD_DAY_ID, day_id))
    }

    fn list_expenses_for_trip(&self, trip_id: &str) -> RepoResult<Vec<Expense>> {
        self.list(expenses_query().where_eq(FIELD_TRIP_ID, trip_id))
    }

    fn list_expenses_for_trip_by_kind(
        &self,
        trip_id: &str,
        kind: ExpenseKind,
    ) -> RepoResult<Vec<Expense>> {
        self.list(
            expenses_query()
                .where_eq(FIELD_TRIP_ID, trip_id)
                .where_eq(FIELD_EXPENSE_KIND, kind.as_str()),
        )
    }

    fn list_expenses_for_trip_by_category(
        &self,
        trip_id: &str,
        category: ExpenseCategory,
    ) -> RepoResult<Vec<Expense>> {
        self.list(
            expenses_query()
                .where_eq(FIELD_TRIP_ID, trip_id)
                .where_eq(FIELD_CATEGORY, category.as_str()),
        )
    }

    fn list_expenses_for_day(&self, day_id: &str) -> RepoResult<Vec<Expense>> {
        self.list(expenses_query().where_eq(FIELD_DAY_ID, day_id))
    }

    fn list_expenses_for_stop(&self, stop_id: &str) -> RepoResult<Vec<Expense>> {
        self.list(expenses_query().where_eq(FIELD_STOP_ID, stop_id))
    }

    fn list_days_for_trip(&self, trip_id: &str) -> RepoResult<Vec<TripDay>> {
        self.list(
            DocumentQuery::new()
                .where_eq(FIELD_TRIP_ID, trip_id)
                .order_by(FIELD_DAY_NUMBER, SortDirection::Ascending),
        )
    }
}

fn trips_query() -> DocumentQuery {
    DocumentQuery::new().order_by(FIELD_START_DATE, SortDirection::Descending)
}

fn stops_query() -> DocumentQuery {
    DocumentQuery::new().order_by(FIELD_ARRIVAL, SortDirection::Ascending)
}

fn expenses_query() -> DocumentQuery {
    DocumentQuery::new().order_by(FIELD_EXPENSE_DATE, SortDirection::Descending)
}

/// Entity persisted as one document in a fixed collection.
trait StoredEntity: DeserializeOwned {
    const COLLECTION: &'static str;

    fn attach_metadata(&mut self, document: &Document);

    fn validate_entity(&self) -> Result<(), ModelValidationError> {
        Ok(())
    }
}

impl StoredEntity for Trip {
    const COLLECTION: &'static str = TRIPS;

    fn attach_metadata(&mut self, document: &Document) {
        self.id = document.key.clone();
        self.created_at = document.created_at;
        self.updated_at = document.updated_at;
    }

    fn validate_entity(&self) -> Result<(), ModelValidationError> {
        self.validate()
    }
}

impl StoredEntity for Stop {
    const COLLECTION: &'static str = STOPS;

    fn attach_metadata(&mut self, document: &Document) {
        self.id = document.key.clone();
        self.created_at = document.created_at;
        self.updated_at = document.updated_at;
    }
}

impl StoredEntity for Expense {
    const COLLECTION: &'static str = EXPENSES;

    fn attach_metadata(&mut self, document: &Document) {
        self.id = document.key.clone();
        self.created_at = document.created_at;
        self.updated_at = document.updated_at;
    }

    fn validate_entity(&self) -> Result<(), ModelValidationError> {
        self.validate()
    }
}

impl StoredEntity for TripDay {
    const COLLECTION: &'static str = DAYS;

    fn attach_metadata(&mut self, document: &Document) {
        self.id = document.key.clone();
        self.created_at = document.created_at;
        self.updated_at = document.updated_at;
    }

    fn validate_entity(&self) -> Result<(), ModelValidationError> {
        self.validate()
    }
}

fn decode_entity<T: StoredEntity>(document: Document) -> RepoResult<T> {
    let invalid = |message: String| RepoError::InvalidData {
        collection: T::COLLECTION,
        key: document.key.clone(),
        message,
    };

    let mut entity: T = serde_json::from_value(serde_json::Value::Object(document.fields.clone()))
        .map_err(|err| invalid(err.to_string()))?;
    entity
        .validate_entity()
        .map_err(|err| invalid(err.to_string()))?;
    entity.attach_metadata(&document);
    Ok(entity)
}
