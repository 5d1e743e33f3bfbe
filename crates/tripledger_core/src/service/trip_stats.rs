//! Flat per-trip statistics and per-day rollups.
//!
//! # Invariants
//! - Duration is whole days, rounded up from `end_date - start_date`.
//! - Every ratio with a zero divisor is 0.

use super::ratio_or_zero;
use crate::model::day::TripDay;
use crate::model::expense::Expense;
use crate::model::stop::{Stop, StopKind};
use crate::model::trip::{Trip, TripStatus};
use crate::model::EntityId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Summary statistics for one trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripStatistics {
    #[serde(rename = "viagemId")]
    pub trip_id: EntityId,
    #[serde(rename = "nomeViagem")]
    pub trip_name: String,
    pub status: TripStatus,
    #[serde(rename = "origem")]
    pub origin: String,
    #[serde(rename = "destino")]
    pub destination: String,
    #[serde(rename = "dataInicio")]
    pub start_date: DateTime<Utc>,
    #[serde(rename = "dataFim")]
    pub end_date: DateTime<Utc>,
    #[serde(rename = "diasViagem")]
    pub duration_days: u32,
    #[serde(rename = "distanciaTotal")]
    pub total_distance_km: f64,
    #[serde(rename = "totalParadas")]
    pub stop_count: usize,
    #[serde(rename = "paradasAbastecimento")]
    pub fuel_stop_count: usize,
    #[serde(rename = "custoTotalReal")]
    pub total_real_cost: f64,
    #[serde(rename = "custoMedioPorDia")]
    pub avg_cost_per_day: f64,
    #[serde(rename = "mediaGastoPorParada")]
    pub avg_cost_per_stop: f64,
}

/// Rollup of one day-of-trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySummary {
    #[serde(rename = "diaViagemId")]
    pub day_id: EntityId,
    #[serde(rename = "numeroDia")]
    pub day_number: u32,
    #[serde(rename = "data")]
    pub date: NaiveDate,
    #[serde(rename = "totalParadas")]
    pub stop_count: usize,
    /// Real expenses tagged with this day.
    #[serde(rename = "custoReal")]
    pub real_cost: f64,
}

pub fn build_trip_statistics(trip: &Trip, stops: &[Stop], expenses: &[Expense]) -> TripStatistics {
    let total_real_cost: f64 = expenses
        .iter()
        .filter(|expense| expense.is_real())
        .map(|expense| expense.amount)
        .sum();
    let duration_days = duration_days(trip.start_date, trip.end_date);
    let stop_count = stops.len();

    TripStatistics {
        trip_id: trip.id.clone(),
        trip_name: trip.name.clone(),
        status: trip.status,
        origin: trip.origin.clone(),
        destination: trip.destination.clone(),
        start_date: trip.start_date,
        end_date: trip.end_date,
        duration_days,
        total_distance_km: trip.total_distance_km.unwrap_or(0.0),
        stop_count,
        fuel_stop_count: stops
            .iter()
            .filter(|stop| stop.kind == StopKind::Fuel)
            .count(),
        total_real_cost,
        avg_cost_per_day: ratio_or_zero(total_real_cost, f64::from(duration_days)),
        avg_cost_per_stop: ratio_or_zero(total_real_cost, stop_count as f64),
    }
}

/// Builds one summary per day, in the order `days` is given.
pub fn build_day_breakdown(
    days: &[TripDay],
    stops: &[Stop],
    expenses: &[Expense],
) -> Vec<DaySummary> {
    days.iter()
        .map(|day| DaySummary {
            day_id: day.id.clone(),
            day_number: day.day_number,
            date: day.date,
            stop_count: stops.iter().filter(|stop| stop.day_id == day.id).count(),
            real_cost: expenses
                .iter()
                .filter(|expense| {
                    expense.is_real() && expense.day_id.as_deref() == Some(day.id.as_str())
                })
                .map(|expense| expense.amount)
                .sum(),
        })
        .collect()
}

/// Whole days between two instants, rounded up; never negative.
pub fn duration_days(start: DateTime<Utc>, end: DateTime<Utc>) -> u32 {
    let millis = (end - start).num_milliseconds().max(0) as f64;
    (millis / MILLIS_PER_DAY).ceil() as u32
}
