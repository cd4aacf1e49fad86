//! Intensity series and emissions factor DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{IntensityPoint, SeriesReport};

/// Query parameters for `GET /api/v1/zones/{zone}/intensity`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IntensityQuery {
    /// Range start (inclusive), ISO-8601.
    pub start: String,
    /// Range end (exclusive), ISO-8601.
    pub end: String,
}

/// Response body for `GET /api/v1/zones/{zone}/intensity`.
#[derive(Debug, Serialize, ToSchema)]
pub struct IntensitySeriesResponse {
    /// Zone identifier.
    pub zone: String,
    /// Range start (UTC).
    pub start: DateTime<Utc>,
    /// Range end (UTC, exclusive).
    pub end: DateTime<Utc>,
    /// Hourly points in ascending order. Empty when no row fell in range.
    pub points: Vec<IntensityPoint>,
    /// Row tallies from building the series.
    pub report: SeriesReport,
}

/// One entry of the emissions factor table.
#[derive(Debug, Serialize, ToSchema)]
pub struct EmissionFactorDto {
    /// Normalized fuel identifier.
    pub fuel_type: String,
    /// kg CO₂ per kWh.
    pub kg_co2_per_kwh: f64,
}
