//! Threshold-based proximity advisory between consecutive stops.
//!
//! This is a heuristic, not a route solver: stops are never reordered and no
//! coordinates are proposed.

use crate::model::stop::{GeoPoint, Stop, StopKind};
use crate::model::EntityId;
use serde::Serialize;

pub const INSUFFICIENT_STOPS_MESSAGE: &str = "At least 2 stops are needed to analyze the route";
pub const INSUFFICIENT_GEO_TAGGED_MESSAGE: &str =
    "At least 2 stops with coordinates are needed to analyze the route";
pub const ROUTE_OPTIMIZED_MESSAGE: &str =
    "Route looks optimized: no consecutive stops are unusually far apart";

/// Stop as listed in a route advisory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteStop {
    pub id: EntityId,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "tipo")]
    pub kind: StopKind,
    #[serde(rename = "coordenadas")]
    pub coordinates: [f64; 2],
}

/// Advisory over the geo-tagged stops of one trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteAdvice {
    #[serde(rename = "viagemId")]
    pub trip_id: EntityId,
    #[serde(rename = "totalParadas")]
    pub total_stops: usize,
    #[serde(rename = "paradasComCoordenadas")]
    pub geo_tagged_stops: usize,
    #[serde(rename = "sugestoes")]
    pub suggestions: Vec<String>,
    #[serde(rename = "paradas")]
    pub stops: Vec<RouteStop>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RouteAdvisory {
    InsufficientStops {
        #[serde(rename = "mensagem")]
        message: String,
        #[serde(rename = "paradasAtuais")]
        stop_count: usize,
    },
    InsufficientGeoTagged {
        #[serde(rename = "mensagem")]
        message: String,
        #[serde(rename = "paradasComCoordenadas")]
        geo_tagged_stops: usize,
        #[serde(rename = "totalParadas")]
        total_stops: usize,
    },
    Advice(RouteAdvice),
}

/// Great-circle distance in kilometers on a sphere of `radius_km`.
pub fn haversine_km(from: GeoPoint, to: GeoPoint, radius_km: f64) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let delta_lat = (to.latitude - from.latitude).to_radians();
    let delta_lon = (to.longitude - from.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push `a` just past 1 for antipodal points.
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    radius_km * c
}

/// Flags consecutive geo-tagged stops farther apart than `threshold_km`.
///
/// `stops` must already be in arrival order.
pub fn build_route_advisory(
    trip_id: &str,
    stops: &[Stop],
    threshold_km: f64,
    radius_km: f64,
) -> RouteAdvisory {
    if stops.len() < 2 {
        return RouteAdvisory::InsufficientStops {
            message: INSUFFICIENT_STOPS_MESSAGE.to_string(),
            stop_count: stops.len(),
        };
    }

    let geo_tagged: Vec<(&Stop, GeoPoint)> = stops
        .iter()
        .filter_map(|stop| stop.coordinates().map(|point| (stop, point)))
        .collect();
    if geo_tagged.len() < 2 {
        return RouteAdvisory::InsufficientGeoTagged {
            message: INSUFFICIENT_GEO_TAGGED_MESSAGE.to_string(),
            geo_tagged_stops: geo_tagged.len(),
            total_stops: stops.len(),
        };
    }

    let mut suggestions: Vec<String> = geo_tagged
        .windows(2)
        .filter_map(|pair| {
            let (from_stop, from) = pair[0];
            let (to_stop, to) = pair[1];
            let distance = haversine_km(from, to, radius_km);
            (distance > threshold_km).then(|| {
                format!(
                    "\"{}\" and \"{}\" are {} km apart; consider adding an intermediate stop",
                    from_stop.name,
                    to_stop.name,
                    distance.round()
                )
            })
        })
        .collect();
    if suggestions.is_empty() {
        suggestions.push(ROUTE_OPTIMIZED_MESSAGE.to_string());
    }

    RouteAdvisory::Advice(RouteAdvice {
        trip_id: trip_id.to_string(),
        total_stops: stops.len(),
        geo_tagged_stops: geo_tagged.len(),
        suggestions,
        stops: geo_tagged
            .iter()
            .map(|(stop, point)| RouteStop {
                id: stop.id.clone(),
                name: stop.name.clone(),
                kind: stop.kind,
                coordinates: point.as_pair(),
            })
            .collect(),
    })
}
