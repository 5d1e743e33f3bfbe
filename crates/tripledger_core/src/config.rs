//! Analytics tuning knobs.
//!
//! # Invariants
//! - Distances and radii are finite and strictly positive.
//! - `max_parallel_reads` is at least 1.
//! - Missing JSON fields fall back to defaults.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Default distance above which consecutive stops get an advisory.
pub const DEFAULT_ADVISORY_THRESHOLD_KM: f64 = 500.0;
/// Mean Earth radius used by the haversine distance.
pub const DEFAULT_EARTH_RADIUS_KM: f64 = 6371.0;
pub const DEFAULT_MAX_PARALLEL_READS: usize = 8;

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Parse(String),
    InvalidValue {
        field: &'static str,
        message: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(message) => write!(f, "invalid analytics config: {message}"),
            Self::InvalidValue { field, message } => {
                write!(f, "invalid analytics config field `{field}`: {message}")
            }
        }
    }
}

impl Error for ConfigError {}

/// Configuration for the analytics builders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyticsConfig {
    /// Consecutive stops strictly farther apart than this are flagged.
    pub advisory_threshold_km: f64,
    pub earth_radius_km: f64,
    /// Upper bound on concurrent per-trip reads in spending analysis.
    pub max_parallel_reads: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            advisory_threshold_km: DEFAULT_ADVISORY_THRESHOLD_KM,
            earth_radius_km: DEFAULT_EARTH_RADIUS_KM,
            max_parallel_reads: DEFAULT_MAX_PARALLEL_READS,
        }
    }
}

impl AnalyticsConfig {
    /// Parses and validates a JSON config document.
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(input).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("advisoryThresholdKm", self.advisory_threshold_km)?;
        require_positive("earthRadiusKm", self.earth_radius_km)?;
        if self.max_parallel_reads == 0 {
            return Err(ConfigError::InvalidValue {
                field: "maxParallelReads",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

fn require_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::InvalidValue {
            field,
            message: format!("must be a positive number, got {value}"),
        });
    }
    Ok(())
}
