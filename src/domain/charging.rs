//! Charging request and recommendation value objects.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use super::{OptimizerError, TimeRange, ZoneId};

/// Longest accepted charging window, in hours (one leap year).
pub const MAX_WINDOW_HOURS: i64 = 366 * 24;

/// A single vehicle's charging need within an allowed window.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargingRequest {
    /// Grid zone whose fuel mix applies.
    pub zone: ZoneId,
    /// Earliest allowed start (UTC).
    pub window_start: DateTime<Utc>,
    /// Latest allowed end (UTC), strictly after `window_start`.
    pub window_end: DateTime<Utc>,
    /// Energy to deliver, kWh, `> 0`.
    pub kwh_needed: f64,
    /// Charger power limit, kW, `> 0`.
    pub max_charging_kw: f64,
}

impl ChargingRequest {
    /// Required charging time in hours (`kwh_needed / max_charging_kw`).
    ///
    /// May be fractional: 12.5 kWh at 5 kW is 2.5 h.
    #[must_use]
    pub fn duration_hours(&self) -> f64 {
        self.kwh_needed / self.max_charging_kw
    }

    /// The allowed window, or `None` if it is empty or inverted.
    #[must_use]
    pub fn window(&self) -> Option<TimeRange> {
        TimeRange::new(self.window_start, self.window_end)
    }

    /// Checks preconditions and returns the window.
    ///
    /// # Errors
    ///
    /// Returns [`OptimizerError::InvalidRequest`] if the window is empty,
    /// inverted, longer than [`MAX_WINDOW_HOURS`] or ends within an hour of
    /// the last representable instant, or if energy or power is not a
    /// positive finite number.
    pub fn validate(&self) -> Result<TimeRange, OptimizerError> {
        let Some(window) = self.window() else {
            return Err(OptimizerError::InvalidRequest(
                "window end must be after window start".to_string(),
            ));
        };
        if window.end - window.start > TimeDelta::hours(MAX_WINDOW_HOURS) {
            return Err(OptimizerError::InvalidRequest(format!(
                "window must not exceed {MAX_WINDOW_HOURS} hours"
            )));
        }
        if window.end.checked_add_signed(TimeDelta::hours(1)).is_none() {
            return Err(OptimizerError::InvalidRequest(
                "window end is out of the supported date range".to_string(),
            ));
        }
        if !(self.kwh_needed.is_finite() && self.kwh_needed > 0.0) {
            return Err(OptimizerError::InvalidRequest(
                "kWh needed must be a positive number".to_string(),
            ));
        }
        if !(self.max_charging_kw.is_finite() && self.max_charging_kw > 0.0) {
            return Err(OptimizerError::InvalidRequest(
                "max charging kW must be a positive number".to_string(),
            ));
        }
        Ok(window)
    }
}

/// The lowest-emissions charging slot found for a request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChargingRecommendation {
    /// Zone echoed from the request.
    pub zone: ZoneId,
    /// Recommended start (UTC, hour-aligned).
    pub recommended_start: DateTime<Utc>,
    /// Recommended end (UTC): start plus the required duration.
    pub recommended_end: DateTime<Utc>,
    /// Estimated emissions for the session, kg CO₂.
    pub estimated_emissions_kg: f64,
    /// How the slot was chosen.
    pub explanation: String,
}
