//! Travel-cost analytics and route advisory over a trip document store.
//! This crate is read-only: it derives reports, it never writes trip data.

pub mod config;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use config::{AnalyticsConfig, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::day::TripDay;
pub use model::expense::{Expense, ExpenseCategory, ExpenseKind};
pub use model::stop::{GeoPoint, Stop, StopKind};
pub use model::trip::{Trip, TripSnapshot, TripStatus};
pub use model::{EntityId, ModelValidationError};
pub use repo::travel_repo::{DocumentTravelRepository, TravelRepository};
pub use repo::{collections, RepoError, RepoResult};
pub use service::analytics_service::AnalyticsService;
pub use service::cost_report::{CategorySummary, CostReport};
pub use service::route_advisory::{haversine_km, RouteAdvice, RouteAdvisory, RouteStop};
pub use service::spending::{SpendingAnalysis, SpendingSummary, TripSpending};
pub use service::trip_stats::{DaySummary, TripStatistics};
pub use service::{AnalyticsError, AnalyticsResult};
pub use store::{
    Document, DocumentQuery, DocumentStore, FilterOp, MemoryDocumentStore, SortDirection,
    SqliteDocumentStore, StoreError, StoreResult,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
