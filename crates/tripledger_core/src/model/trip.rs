//! Trip domain model.
//!
//! # Invariants
//! - `end_date` is not earlier than `start_date`.
//! - Timestamps are persisted as epoch milliseconds so store ordering is
//!   chronological.

use super::{EntityId, ModelValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Trip lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TripStatus {
    Planned,
    InProgress,
    Completed,
    Cancelled,
}

impl TripStatus {
    /// Stable persisted value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// User-facing label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Planned => "Planned",
            Self::InProgress => "In progress",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }
}

/// Statistics snapshot the write path may embed in a trip document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_paradas: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_despesas: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distancia_percorrida: Option<f64>,
}

/// A journey owned by one traveler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    /// Document key; not part of the stored body.
    #[serde(skip)]
    pub id: EntityId,
    #[serde(rename = "usuarioId")]
    pub user_id: EntityId,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "descricao", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "dataInicio", with = "chrono::serde::ts_milliseconds")]
    pub start_date: DateTime<Utc>,
    #[serde(rename = "dataFim", with = "chrono::serde::ts_milliseconds")]
    pub end_date: DateTime<Utc>,
    pub status: TripStatus,
    #[serde(rename = "origem")]
    pub origin: String,
    #[serde(rename = "destino")]
    pub destination: String,
    #[serde(rename = "distanciaTotal", default, skip_serializing_if = "Option::is_none")]
    pub total_distance_km: Option<f64>,
    #[serde(rename = "custoTotal", default, skip_serializing_if = "Option::is_none")]
    pub total_cost: Option<f64>,
    #[serde(rename = "numeroDias", default, skip_serializing_if = "Option::is_none")]
    pub day_count: Option<u32>,
    #[serde(rename = "observacoes", default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(rename = "fotos", default, skip_serializing_if = "Vec::is_empty")]
    pub photos: Vec<String>,
    #[serde(rename = "estatisticas", default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<TripSnapshot>,
    #[serde(skip)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Trip {
    /// Creates a planned trip with optional fields unset.
    pub fn new(
        user_id: impl Into<EntityId>,
        name: impl Into<String>,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: EntityId::new(),
            user_id: user_id.into(),
            name: name.into(),
            description: None,
            start_date,
            end_date,
            status: TripStatus::Planned,
            origin: String::new(),
            destination: String::new(),
            total_distance_km: None,
            total_cost: None,
            day_count: None,
            notes: None,
            photos: Vec::new(),
            snapshot: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.end_date < self.start_date {
            return Err(ModelValidationError::TripEndsBeforeStart);
        }
        Ok(())
    }

    /// Day count used as a divisor: unset or zero counts as one day.
    pub fn billable_days(&self) -> u32 {
        self.day_count.unwrap_or(0).max(1)
    }
}
