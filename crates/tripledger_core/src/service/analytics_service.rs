//! Analytics use-case service.
//!
//! # Responsibility
//! - Load the entities each report needs through `TravelRepository`.
//! - Delegate report math to the pure builders in sibling modules.
//! - Emit metadata-only `event=... module=analytics` log lines.
//!
//! # Invariants
//! - Storage errors are returned unchanged; no retries.
//! - Spending fan-out keeps per-trip results in trip order.

use super::cost_report::{build_cost_report, CostReport};
use super::route_advisory::{build_route_advisory, RouteAdvisory};
use super::spending::{aggregate_spending, summarize_trip_spending, SpendingAnalysis};
use super::trip_stats::{build_day_breakdown, build_trip_statistics, DaySummary, TripStatistics};
use super::{AnalyticsError, AnalyticsResult};
use crate::config::AnalyticsConfig;
use crate::model::expense::Expense;
use crate::model::trip::Trip;
use crate::repo::travel_repo::TravelRepository;
use chrono::Utc;
use log::{info, warn};
use std::time::Instant;

/// Analytics facade over a repository implementation.
pub struct AnalyticsService<R: TravelRepository> {
    repo: R,
    config: AnalyticsConfig,
}

impl<R: TravelRepository> AnalyticsService<R> {
    /// Creates a service with default configuration.
    pub fn new(repo: R) -> Self {
        Self::with_config(repo, AnalyticsConfig::default())
    }

    pub fn with_config(repo: R, config: AnalyticsConfig) -> Self {
        Self { repo, config }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Planned-vs-real cost variance for one trip.
    pub fn cost_report(&self, trip_id: &str) -> AnalyticsResult<CostReport> {
        let started_at = Instant::now();
        let result = self.load_trip(trip_id).and_then(|trip| {
            let expenses = self.repo.list_expenses_for_trip(trip_id)?;
            Ok(build_cost_report(&trip, &expenses, Utc::now()))
        });
        log_outcome("cost_report", trip_id, started_at, &result);
        result
    }

    /// Flat statistics for one trip.
    pub fn trip_statistics(&self, trip_id: &str) -> AnalyticsResult<TripStatistics> {
        let started_at = Instant::now();
        let result = self.load_trip(trip_id).and_then(|trip| {
            let stops = self.repo.list_stops_for_trip(trip_id)?;
            let expenses = self.repo.list_expenses_for_trip(trip_id)?;
            Ok(build_trip_statistics(&trip, &stops, &expenses))
        });
        log_outcome("trip_statistics", trip_id, started_at, &result);
        result
    }

    /// Per-day rollup for one trip, in day-number order.
    pub fn day_breakdown(&self, trip_id: &str) -> AnalyticsResult<Vec<DaySummary>> {
        let started_at = Instant::now();
        let result = self.load_trip(trip_id).and_then(|_| {
            let days = self.repo.list_days_for_trip(trip_id)?;
            let stops = self.repo.list_stops_for_trip(trip_id)?;
            let expenses = self.repo.list_expenses_for_trip(trip_id)?;
            Ok(build_day_breakdown(&days, &stops, &expenses))
        });
        log_outcome("day_breakdown", trip_id, started_at, &result);
        result
    }

    /// Distance advisory between consecutive stops of one trip.
    ///
    /// Reads only the trip's stops; an unknown trip id is indistinguishable
    /// from a trip with no stops and yields `InsufficientStops`.
    pub fn route_advisory(&self, trip_id: &str) -> AnalyticsResult<RouteAdvisory> {
        let started_at = Instant::now();
        let result = self
            .repo
            .list_stops_for_trip(trip_id)
            .map(|stops| {
                build_route_advisory(
                    trip_id,
                    &stops,
                    self.config.advisory_threshold_km,
                    self.config.earth_radius_km,
                )
            })
            .map_err(AnalyticsError::from);
        log_outcome("route_advisory", trip_id, started_at, &result);
        result
    }

    /// Spending summary across every trip of one traveler.
    pub fn spending_patterns(&self, user_id: &str) -> AnalyticsResult<SpendingAnalysis> {
        let started_at = Instant::now();
        let result = self.collect_spending(user_id);
        match &result {
            Ok(analysis) => {
                let trip_count = match analysis {
                    SpendingAnalysis::NoTrips { .. } => 0,
                    SpendingAnalysis::Summary(summary) => summary.trip_count,
                };
                info!(
                    "event=spending_patterns module=analytics status=ok user_id={} trips={} duration_ms={}",
                    user_id,
                    trip_count,
                    started_at.elapsed().as_millis()
                );
            }
            Err(err) => warn!(
                "event=spending_patterns module=analytics status=error user_id={} duration_ms={} error={}",
                user_id,
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    fn collect_spending(&self, user_id: &str) -> AnalyticsResult<SpendingAnalysis> {
        let trips = self.repo.list_trips_for_user(user_id)?;
        if trips.is_empty() {
            return Ok(SpendingAnalysis::no_trips());
        }

        let expenses = self.fetch_expenses_per_trip(&trips)?;
        let rows = trips
            .iter()
            .zip(expenses.iter())
            .map(|(trip, expenses)| summarize_trip_spending(trip, expenses))
            .collect();
        Ok(aggregate_spending(user_id, rows))
    }

    /// Loads each trip's expenses on scoped worker threads.
    ///
    /// Workers run in batches of `max_parallel_reads`; slot `i` of the
    /// result always belongs to `trips[i]`.
    fn fetch_expenses_per_trip(&self, trips: &[Trip]) -> AnalyticsResult<Vec<Vec<Expense>>> {
        let repo = &self.repo;
        let batch_size = self.config.max_parallel_reads.max(1);
        let mut expenses = Vec::with_capacity(trips.len());

        for batch in trips.chunks(batch_size) {
            let results: Vec<AnalyticsResult<Vec<Expense>>> = std::thread::scope(|scope| {
                let handles: Vec<_> = batch
                    .iter()
                    .map(|trip| scope.spawn(move || repo.list_expenses_for_trip(&trip.id)))
                    .collect();

                handles
                    .into_iter()
                    .zip(batch)
                    .map(|(handle, trip)| match handle.join() {
                        Ok(result) => result.map_err(AnalyticsError::from),
                        Err(_) => Err(AnalyticsError::WorkerPanicked(trip.id.clone())),
                    })
                    .collect()
            });

            for result in results {
                expenses.push(result?);
            }
        }

        Ok(expenses)
    }

    fn load_trip(&self, trip_id: &str) -> AnalyticsResult<Trip> {
        self.repo
            .get_trip(trip_id)?
            .ok_or_else(|| AnalyticsError::TripNotFound(trip_id.to_string()))
    }
}

fn log_outcome<T>(
    event: &str,
    trip_id: &str,
    started_at: Instant,
    result: &AnalyticsResult<T>,
) {
    let duration_ms = started_at.elapsed().as_millis();
    match result {
        Ok(_) => info!(
            "event={event} module=analytics status=ok trip_id={trip_id} duration_ms={duration_ms}"
        ),
        Err(err) if err.is_not_found() => info!(
            "event={event} module=analytics status=not_found trip_id={trip_id} duration_ms={duration_ms}"
        ),
        Err(err) => warn!(
            "event={event} module=analytics status=error trip_id={trip_id} duration_ms={duration_ms} error={err}"
        ),
    }
}
