//! Typed travel entities read from the trip datastore.
//!
//! # Responsibility
//! - Define the canonical shapes of trips, stops, expenses and days.
//! - Map persisted field names (camelCase Portuguese) onto Rust fields.
//!
//! # Invariants
//! - Every entity carries the store-assigned document key as `id`.
//! - Relationships are by identity only; no entity embeds another.
//! - Closed enumerations map exhaustively onto wire values and labels.

pub mod day;
pub mod expense;
pub mod stop;
pub mod trip;

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Opaque store-assigned entity key.
pub type EntityId = String;

/// Validation failure for persisted entity invariants.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelValidationError {
    /// Trip `dataFim` precedes `dataInicio`.
    TripEndsBeforeStart,
    /// Expense amount is negative or not a finite number.
    InvalidExpenseAmount(f64),
    /// Day numbering is 1-based.
    ZeroDayNumber,
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TripEndsBeforeStart => write!(f, "trip end date precedes start date"),
            Self::InvalidExpenseAmount(value) => {
                write!(f, "expense amount must be a non-negative number, got {value}")
            }
            Self::ZeroDayNumber => write!(f, "day number must be 1 or greater"),
        }
    }
}

impl Error for ModelValidationError {}
