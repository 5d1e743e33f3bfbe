//! Expense domain model.
//!
//! # Invariants
//! - `amount` is finite and non-negative, in the traveler's currency.
//! - `kind` separates budgeted (`planned`) from incurred (`real`) entries.

use super::{EntityId, ModelValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Spending category. Declaration order is the stable tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExpenseCategory {
    Fuel,
    Food,
    Lodging,
    Toll,
    Parking,
    Maintenance,
    Leisure,
    Shopping,
    Other,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 9] = [
        Self::Fuel,
        Self::Food,
        Self::Lodging,
        Self::Toll,
        Self::Parking,
        Self::Maintenance,
        Self::Leisure,
        Self::Shopping,
        Self::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fuel => "fuel",
            Self::Food => "food",
            Self::Lodging => "lodging",
            Self::Toll => "toll",
            Self::Parking => "parking",
            Self::Maintenance => "maintenance",
            Self::Leisure => "leisure",
            Self::Shopping => "shopping",
            Self::Other => "other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Fuel => "Fuel",
            Self::Food => "Food",
            Self::Lodging => "Lodging",
            Self::Toll => "Tolls",
            Self::Parking => "Parking",
            Self::Maintenance => "Maintenance",
            Self::Leisure => "Leisure",
            Self::Shopping => "Shopping",
            Self::Other => "Other",
        }
    }
}

/// Budgeted versus incurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExpenseKind {
    Planned,
    Real,
}

impl ExpenseKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::Real => "real",
        }
    }
}

/// A monetary entry tied to a trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    #[serde(skip)]
    pub id: EntityId,
    #[serde(rename = "viagemId")]
    pub trip_id: EntityId,
    #[serde(rename = "diaViagemId", default, skip_serializing_if = "Option::is_none")]
    pub day_id: Option<EntityId>,
    #[serde(rename = "paradaId", default, skip_serializing_if = "Option::is_none")]
    pub stop_id: Option<EntityId>,
    #[serde(rename = "usuarioId")]
    pub user_id: EntityId,
    #[serde(rename = "categoria")]
    pub category: ExpenseCategory,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "valor")]
    pub amount: f64,
    #[serde(rename = "data", with = "chrono::serde::ts_milliseconds")]
    pub date: DateTime<Utc>,
    #[serde(rename = "tipo")]
    pub kind: ExpenseKind,
    #[serde(rename = "metodoPagamento", default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(rename = "observacoes", default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Expense {
    pub fn new(
        trip_id: impl Into<EntityId>,
        user_id: impl Into<EntityId>,
        category: ExpenseCategory,
        kind: ExpenseKind,
        amount: f64,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: EntityId::new(),
            trip_id: trip_id.into(),
            day_id: None,
            stop_id: None,
            user_id: user_id.into(),
            category,
            description: String::new(),
            amount,
            date,
            kind,
            payment_method: None,
            notes: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(ModelValidationError::InvalidExpenseAmount(self.amount));
        }
        Ok(())
    }

    pub fn is_real(&self) -> bool {
        self.kind == ExpenseKind::Real
    }
}
