#![allow(dead_code)]

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use tripledger_core::collections::{DAYS, EXPENSES, STOPS, TRIPS};
use tripledger_core::{
    Expense, ExpenseCategory, ExpenseKind, MemoryDocumentStore, SqliteDocumentStore, Stop,
    StopKind, Trip, TripDay,
};

/// Seeding access shared by both store implementations.
pub trait Seed {
    fn put<T: Serialize>(&self, collection: &str, key: &str, value: &T);
}

impl Seed for MemoryDocumentStore {
    fn put<T: Serialize>(&self, collection: &str, key: &str, value: &T) {
        self.insert(collection, Some(key), value).unwrap();
    }
}

impl Seed for SqliteDocumentStore {
    fn put<T: Serialize>(&self, collection: &str, key: &str, value: &T) {
        self.insert(collection, Some(key), value).unwrap();
    }
}

pub fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap()
}

pub fn trip(user_id: &str, name: &str, start: DateTime<Utc>, days: i64) -> Trip {
    let mut trip = Trip::new(user_id, name, start, start + Duration::days(days));
    trip.origin = "Sao Paulo".to_string();
    trip.destination = "Rio de Janeiro".to_string();
    trip
}

pub fn expense(
    trip_id: &str,
    category: ExpenseCategory,
    kind: ExpenseKind,
    amount: f64,
    date: DateTime<Utc>,
) -> Expense {
    let mut expense = Expense::new(trip_id, "u1", category, kind, amount, date);
    expense.description = format!("{} expense", category.label());
    expense
}

pub fn stop(
    trip_id: &str,
    day_id: &str,
    name: &str,
    coordinates: Option<[f64; 2]>,
    arrival: DateTime<Utc>,
) -> Stop {
    let mut stop = Stop::new(trip_id, day_id, StopKind::PointOfInterest, name);
    stop.raw_coordinates = coordinates.map(|pair| pair.to_vec());
    stop.arrival = Some(arrival);
    stop
}

pub fn day(trip_id: &str, day_number: u32, date: NaiveDate) -> TripDay {
    TripDay::new(trip_id, day_number, date)
}

pub fn put_trip(store: &impl Seed, key: &str, trip: &Trip) {
    store.put(TRIPS, key, trip);
}

pub fn put_stop(store: &impl Seed, key: &str, stop: &Stop) {
    store.put(STOPS, key, stop);
}

pub fn put_expense(store: &impl Seed, key: &str, expense: &Expense) {
    store.put(EXPENSES, key, expense);
}

pub fn put_day(store: &impl Seed, key: &str, day: &TripDay) {
    store.put(DAYS, key, day);
}

pub fn approx_eq(left: f64, right: f64) -> bool {
    (left - right).abs() < 1e-9
}
