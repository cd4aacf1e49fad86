//! Data Transfer Objects for REST request/response serialization.
//!
//! The charging DTOs follow the published camelCase wire contract; the
//! remaining endpoints use snake_case like the domain types they wrap.

pub mod charging_dto;
pub mod intensity_dto;

pub use charging_dto::*;
pub use intensity_dto::*;

use chrono::{DateTime, Utc};

use crate::domain::fuel::parse_timestamp;
use crate::error::GatewayError;

/// Parses a request timestamp. Naive timestamps are taken as UTC.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] naming `field` if the value is
/// not a recognizable timestamp.
pub fn parse_request_time(field: &str, raw: &str) -> Result<DateTime<Utc>, GatewayError> {
    parse_timestamp(raw)
        .ok_or_else(|| GatewayError::InvalidRequest(format!("invalid {field}: {raw:?}")))
}
