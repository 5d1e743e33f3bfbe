//! Stop (waypoint) domain model.

use super::EntityId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Purpose of a stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopKind {
    Fuel,
    Meal,
    Lodging,
    PointOfInterest,
    Maintenance,
    Other,
}

impl StopKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fuel => "fuel",
            Self::Meal => "meal",
            Self::Lodging => "lodging",
            Self::PointOfInterest => "point-of-interest",
            Self::Maintenance => "maintenance",
            Self::Other => "other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Fuel => "Fuel",
            Self::Meal => "Meal",
            Self::Lodging => "Lodging",
            Self::PointOfInterest => "Point of interest",
            Self::Maintenance => "Maintenance",
            Self::Other => "Other",
        }
    }
}

/// Validated latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Returns `None` unless both values are finite and within range.
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let in_range = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        in_range.then_some(Self {
            latitude,
            longitude,
        })
    }

    pub fn as_pair(self) -> [f64; 2] {
        [self.latitude, self.longitude]
    }
}

/// A waypoint within one day of a trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    #[serde(skip)]
    pub id: EntityId,
    #[serde(rename = "viagemId")]
    pub trip_id: EntityId,
    #[serde(rename = "diaViagemId")]
    pub day_id: EntityId,
    #[serde(rename = "tipo")]
    pub kind: StopKind,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "endereco", default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Raw `[lat, lon]` as stored; see [`Stop::coordinates`].
    #[serde(
        rename = "coordenadas",
        default,
        deserialize_with = "numeric_array",
        skip_serializing_if = "Option::is_none"
    )]
    pub raw_coordinates: Option<Vec<f64>>,
    #[serde(
        rename = "horaChegada",
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub arrival: Option<DateTime<Utc>>,
    #[serde(
        rename = "horaSaida",
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub departure: Option<DateTime<Utc>>,
    #[serde(rename = "tempoPermanencia", default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    #[serde(rename = "custo", default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(rename = "avaliacao", default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(rename = "observacoes", default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Stop {
    pub fn new(
        trip_id: impl Into<EntityId>,
        day_id: impl Into<EntityId>,
        kind: StopKind,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: EntityId::new(),
            trip_id: trip_id.into(),
            day_id: day_id.into(),
            kind,
            name: name.into(),
            address: None,
            raw_coordinates: None,
            arrival: None,
            departure: None,
            duration_minutes: None,
            cost: None,
            rating: None,
            notes: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Returns the coordinate pair when exactly two valid values are stored.
    pub fn coordinates(&self) -> Option<GeoPoint> {
        match self.raw_coordinates.as_deref() {
            Some([latitude, longitude]) => GeoPoint::new(*latitude, *longitude),
            _ => None,
        }
    }
}

// Non-numeric coordinate payloads are treated as "no coordinates" rather than
// failing the whole stop.
fn numeric_array<'de, D>(deserializer: D) -> Result<Option<Vec<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::Array(items)) = value else {
        return Ok(None);
    };
    Ok(items.iter().map(Value::as_f64).collect())
}
