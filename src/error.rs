//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type at the transport boundary. Core
//! errors ([`SeriesError`], [`OptimizerError`], [`IngestionError`]) convert
//! into it; each variant maps to a specific HTTP status code and structured
//! JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{OptimizerError, SeriesError, TimeRange, ZoneId};
use crate::ingestion::IngestionError;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 4002,
///     "message": "infeasible: no feasible start time ...",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see the table on [`GatewayError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                |
/// |-----------|-----------------|----------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request            |
/// | 2000–2999 | Not Found       | 404 Not Found              |
/// | 3000–3999 | Server          | 500 / 503                  |
/// | 4000–4999 | Domain outcome  | 422 Unprocessable Entity   |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Zone identifier failed validation.
    #[error("invalid zone: {0}")]
    InvalidZone(String),

    /// The source has rows for the zone, but none in the requested range.
    #[error("no data available for zone {zone} in {range}")]
    NoDataAvailable {
        /// Requested zone.
        zone: ZoneId,
        /// Requested range.
        range: TimeRange,
    },

    /// The dataset for the range is unusable.
    #[error("bad data for zone {zone}: {source}")]
    DataQuality {
        /// Requested zone.
        zone: ZoneId,
        /// Underlying data-quality failure.
        source: SeriesError,
    },

    /// No start time fits the window and the data.
    #[error(transparent)]
    Infeasible(OptimizerError),

    /// The fuel-mix source could not be read.
    #[error(transparent)]
    Ingestion(#[from] IngestionError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::InvalidZone(_) => 1002,
            Self::NoDataAvailable { .. } => 2001,
            Self::Ingestion(IngestionError::ZoneNotFound(_)) => 2002,
            Self::Ingestion(IngestionError::DuplicateColumn(_)) => 4001,
            Self::Ingestion(_) => 3001,
            Self::Internal(_) => 3000,
            Self::DataQuality { .. } => 4001,
            Self::Infeasible(_) => 4002,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::InvalidZone(_) => StatusCode::BAD_REQUEST,
            Self::NoDataAvailable { .. } | Self::Ingestion(IngestionError::ZoneNotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            Self::DataQuality { .. }
            | Self::Infeasible(_)
            | Self::Ingestion(IngestionError::DuplicateColumn(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::Ingestion(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<OptimizerError> for GatewayError {
    fn from(err: OptimizerError) -> Self {
        match err {
            OptimizerError::InvalidRequest(msg) => Self::InvalidRequest(msg),
            // Reaching the optimizer with no points means the caller skipped
            // the no-data check.
            OptimizerError::EmptySeries => Self::Internal("intensity series is empty".to_string()),
            infeasible @ OptimizerError::Infeasible { .. } => Self::Infeasible(infeasible),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
