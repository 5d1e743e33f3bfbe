//! Analytics use-case services.
//!
//! # Responsibility
//! - Fold entities read through `TravelRepository` into report values.
//! - Keep report math in pure builders, separate from repository calls.
//!
//! # Invariants
//! - Services never write to the store.
//! - Degenerate inputs (no stops, no trips, zero budget, zero days) produce
//!   explicit result variants or 0, never errors.
//! - A missing primary trip is the only hard failure besides storage errors.

pub mod analytics_service;
pub mod cost_report;
pub mod route_advisory;
pub mod spending;
pub mod trip_stats;

use crate::model::EntityId;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

/// Service error for analytics use-cases.
#[derive(Debug)]
pub enum AnalyticsError {
    /// Requested trip does not exist.
    TripNotFound(EntityId),
    /// Persistence-layer failure, passed through unchanged.
    Repo(RepoError),
    /// A fan-out read worker panicked while loading this trip's data.
    WorkerPanicked(EntityId),
}

impl AnalyticsError {
    /// Whether this is an expected "not found" outcome rather than an
    /// infrastructure failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::TripNotFound(_))
    }
}

impl Display for AnalyticsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TripNotFound(trip_id) => write!(f, "trip not found: {trip_id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::WorkerPanicked(trip_id) => {
                write!(f, "read worker panicked while loading trip {trip_id}")
            }
        }
    }
}

impl Error for AnalyticsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AnalyticsError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Divides, yielding 0 when the divisor is not strictly positive.
pub(crate) fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}
