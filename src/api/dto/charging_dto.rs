//! Charging recommendation DTOs.
//!
//! Field names follow the wire contract:
//! request `{zone, windowStartUtc, windowEndUtc, kWhNeeded, maxChargingKw}`,
//! response `{zone, recommendedStartUtc, recommendedEndUtc,
//! estimatedEmissionsKg, assumptions}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::parse_request_time;
use crate::domain::{ChargingRecommendation, ChargingRequest, ZoneId};
use crate::error::GatewayError;

/// Request body for `POST /api/v1/recommendations`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ChargingRequestDto {
    /// Grid zone identifier (e.g. `"CAISO"`).
    pub zone: String,
    /// Window start, ISO-8601. Without an offset it is read as UTC.
    #[serde(rename = "windowStartUtc")]
    #[schema(example = "2024-06-01T00:00:00Z")]
    pub window_start_utc: String,
    /// Window end, ISO-8601. Must be after the start.
    #[serde(rename = "windowEndUtc")]
    #[schema(example = "2024-06-01T06:00:00Z")]
    pub window_end_utc: String,
    /// Energy to deliver, kWh.
    #[serde(rename = "kWhNeeded")]
    pub kwh_needed: f64,
    /// Charger power limit, kW.
    #[serde(rename = "maxChargingKw")]
    pub max_charging_kw: f64,
}

impl ChargingRequestDto {
    /// Validates the DTO into a domain request.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidZone`] or
    /// [`GatewayError::InvalidRequest`] for malformed fields, including
    /// non-positive energy or power and an empty window.
    pub fn into_domain(self) -> Result<ChargingRequest, GatewayError> {
        let request = ChargingRequest {
            zone: ZoneId::new(self.zone)?,
            window_start: parse_request_time("windowStartUtc", &self.window_start_utc)?,
            window_end: parse_request_time("windowEndUtc", &self.window_end_utc)?,
            kwh_needed: self.kwh_needed,
            max_charging_kw: self.max_charging_kw,
        };
        request.validate()?;
        Ok(request)
    }
}

/// Response body for `POST /api/v1/recommendations`.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChargingRecommendationDto {
    /// Zone echoed from the request.
    pub zone: String,
    /// Recommended start (UTC).
    pub recommended_start_utc: DateTime<Utc>,
    /// Recommended end (UTC).
    pub recommended_end_utc: DateTime<Utc>,
    /// Estimated session emissions, kg CO₂.
    pub estimated_emissions_kg: f64,
    /// How the recommendation was derived.
    pub assumptions: String,
}

impl From<ChargingRecommendation> for ChargingRecommendationDto {
    fn from(rec: ChargingRecommendation) -> Self {
        Self {
            zone: rec.zone.into(),
            recommended_start_utc: rec.recommended_start,
            recommended_end_utc: rec.recommended_end,
            estimated_emissions_kg: rec.estimated_emissions_kg,
            assumptions: rec.explanation,
        }
    }
}
