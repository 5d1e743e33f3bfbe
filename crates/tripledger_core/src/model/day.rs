//! Day-of-trip domain model.

use super::{EntityId, ModelValidationError};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One calendar day within a trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripDay {
    #[serde(skip)]
    pub id: EntityId,
    #[serde(rename = "viagemId")]
    pub trip_id: EntityId,
    /// 1-based sequence within the trip.
    #[serde(rename = "numeroDia")]
    pub day_number: u32,
    #[serde(rename = "data")]
    pub date: NaiveDate,
    #[serde(rename = "titulo", default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "descricao", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "distanciaPercorrida", default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    /// Minutes on the road.
    #[serde(rename = "tempoViagem", default, skip_serializing_if = "Option::is_none")]
    pub travel_minutes: Option<u32>,
    #[serde(rename = "custoTotal", default, skip_serializing_if = "Option::is_none")]
    pub total_cost: Option<f64>,
    #[serde(skip)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl TripDay {
    pub fn new(trip_id: impl Into<EntityId>, day_number: u32, date: NaiveDate) -> Self {
        Self {
            id: EntityId::new(),
            trip_id: trip_id.into(),
            day_number,
            date,
            title: None,
            description: None,
            distance_km: None,
            travel_minutes: None,
            total_cost: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.day_number == 0 {
            return Err(ModelValidationError::ZeroDayNumber);
        }
        Ok(())
    }
}
