//! Cross-trip spending patterns for one traveler.
//!
//! # Invariants
//! - Only `real` expenses count.
//! - Per-trip rows keep the order trips were given in.
//! - Zero trips is a `NoTrips` value, never a division.

use crate::model::expense::{Expense, ExpenseCategory};
use crate::model::trip::Trip;
use crate::model::EntityId;
use serde::Serialize;
use std::collections::BTreeMap;

pub const NO_TRIPS_MESSAGE: &str = "no trips";

/// Real spending of one trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripSpending {
    #[serde(rename = "viagemId")]
    pub trip_id: EntityId,
    #[serde(rename = "nomeViagem")]
    pub trip_name: String,
    #[serde(rename = "totalGasto")]
    pub total_spent: f64,
    /// Stored day count, unset reported as 0.
    #[serde(rename = "numeroDias")]
    pub day_count: u32,
    #[serde(rename = "gastoPorDia")]
    pub spent_per_day: f64,
    #[serde(rename = "gastosPorCategoria")]
    pub by_category: BTreeMap<ExpenseCategory, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendingSummary {
    #[serde(rename = "usuarioId")]
    pub user_id: EntityId,
    #[serde(rename = "totalViagens")]
    pub trip_count: usize,
    #[serde(rename = "totalGastoGeral")]
    pub total_spent: f64,
    #[serde(rename = "mediaGastoPorViagem")]
    pub mean_per_trip: f64,
    /// Category totals across every trip.
    #[serde(rename = "gastosPorCategoria")]
    pub by_category: BTreeMap<ExpenseCategory, f64>,
    #[serde(rename = "viagens")]
    pub trips: Vec<TripSpending>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SpendingAnalysis {
    NoTrips {
        #[serde(rename = "mensagem")]
        message: String,
        #[serde(rename = "totalViagens")]
        trip_count: usize,
    },
    Summary(SpendingSummary),
}

impl SpendingAnalysis {
    pub fn no_trips() -> Self {
        Self::NoTrips {
            message: NO_TRIPS_MESSAGE.to_string(),
            trip_count: 0,
        }
    }
}

/// Folds one trip's expenses into its spending row.
pub fn summarize_trip_spending(trip: &Trip, expenses: &[Expense]) -> TripSpending {
    let mut by_category: BTreeMap<ExpenseCategory, f64> = BTreeMap::new();
    let mut total_spent = 0.0;
    for expense in expenses.iter().filter(|expense| expense.is_real()) {
        *by_category.entry(expense.category).or_insert(0.0) += expense.amount;
        total_spent += expense.amount;
    }

    TripSpending {
        trip_id: trip.id.clone(),
        trip_name: trip.name.clone(),
        total_spent,
        day_count: trip.day_count.unwrap_or(0),
        spent_per_day: total_spent / f64::from(trip.billable_days()),
        by_category,
    }
}

/// Aggregates per-trip rows; an empty list yields `NoTrips`.
pub fn aggregate_spending(user_id: &str, trips: Vec<TripSpending>) -> SpendingAnalysis {
    if trips.is_empty() {
        return SpendingAnalysis::no_trips();
    }

    let total_spent: f64 = trips.iter().map(|trip| trip.total_spent).sum();
    let mut by_category: BTreeMap<ExpenseCategory, f64> = BTreeMap::new();
    for (category, amount) in trips.iter().flat_map(|trip| trip.by_category.iter()) {
        *by_category.entry(*category).or_insert(0.0) += amount;
    }

    SpendingAnalysis::Summary(SpendingSummary {
        user_id: user_id.to_string(),
        trip_count: trips.len(),
        total_spent,
        mean_per_trip: total_spent / trips.len() as f64,
        by_category,
        trips,
    })
}

#[cfg(test)]
mod tests {
    use super::{aggregate_spending, summarize_trip_spending, SpendingAnalysis};
    use crate::model::expense::{Expense, ExpenseCategory, ExpenseKind};
    use crate::model::trip::Trip;
    use chrono::Utc;
    use serde_json::json;

    fn trip(id: &str, day_count: Option<u32>) -> Trip {
        let now = Utc::now();
        let mut trip = Trip::new("u1", id.to_uppercase(), now, now);
        trip.id = id.to_string();
        trip.day_count = day_count;
        trip
    }

    fn real(category: ExpenseCategory, amount: f64) -> Expense {
        Expense::new("t", "u1", category, ExpenseKind::Real, amount, Utc::now())
    }

    #[test]
    fn per_trip_row_groups_real_expenses_by_category() {
        let expenses = vec![
            real(ExpenseCategory::Fuel, 100.0),
            real(ExpenseCategory::Fuel, 50.0),
            real(ExpenseCategory::Food, 30.0),
            Expense::new(
                "t",
                "u1",
                ExpenseCategory::Lodging,
                ExpenseKind::Planned,
                900.0,
                Utc::now(),
            ),
        ];
        let row = summarize_trip_spending(&trip("a", Some(3)), &expenses);
        assert_eq!(row.total_spent, 180.0);
        assert_eq!(row.spent_per_day, 60.0);
        assert_eq!(row.by_category.get(&ExpenseCategory::Fuel), Some(&150.0));
        assert_eq!(row.by_category.get(&ExpenseCategory::Food), Some(&30.0));
        assert!(!row.by_category.contains_key(&ExpenseCategory::Lodging));
    }

    #[test]
    fn unset_day_count_divides_by_one() {
        let row = summarize_trip_spending(&trip("a", None), &[real(ExpenseCategory::Toll, 12.0)]);
        assert_eq!(row.day_count, 0);
        assert_eq!(row.spent_per_day, 12.0);
    }

    #[test]
    fn empty_input_is_no_trips_shape() {
        let analysis = aggregate_spending("u1", Vec::new());
        assert_eq!(
            serde_json::to_value(&analysis).unwrap(),
            json!({"mensagem": "no trips", "totalViagens": 0})
        );
    }

    #[test]
    fn aggregate_sums_across_trips() {
        let rows = vec![
            summarize_trip_spending(&trip("a", None), &[real(ExpenseCategory::Fuel, 100.0)]),
            summarize_trip_spending(
                &trip("b", None),
                &[
                    real(ExpenseCategory::Fuel, 20.0),
                    real(ExpenseCategory::Food, 80.0),
                ],
            ),
        ];
        let SpendingAnalysis::Summary(summary) = aggregate_spending("u1", rows) else {
            panic!("expected summary");
        };
        assert_eq!(summary.trip_count, 2);
        assert_eq!(summary.total_spent, 200.0);
        assert_eq!(summary.mean_per_trip, 100.0);
        assert_eq!(summary.by_category.get(&ExpenseCategory::Fuel), Some(&120.0));
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["viagens"][1]["gastosPorCategoria"]["food"], json!(80.0));
    }
}
