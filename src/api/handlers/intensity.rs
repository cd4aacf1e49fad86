//! Intensity series and emissions factor endpoints.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{
    EmissionFactorDto, IntensityQuery, IntensitySeriesResponse, parse_request_time,
};
use crate::app_state::AppState;
use crate::domain::{TimeRange, ZoneId};
use crate::error::{ErrorResponse, GatewayError};

/// `GET /zones/{zone}/intensity`: Hourly carbon intensity for a range.
///
/// An empty `points` array means the source has data for the zone but none
/// in the requested range.
///
/// # Errors
///
/// Returns [`GatewayError`] on an invalid zone or range, a missing zone, or
/// an unusable dataset.
#[utoipa::path(
    get,
    path = "/api/v1/zones/{zone}/intensity",
    tag = "Intensity",
    summary = "Get hourly carbon intensity",
    description = "Builds the hourly carbon-intensity series for the zone over [start, end) from the fuel-mix data, with per-row tallies.",
    params(
        ("zone" = String, Path, description = "Zone identifier"),
        IntensityQuery,
    ),
    responses(
        (status = 200, description = "Intensity series", body = IntensitySeriesResponse),
        (status = 400, description = "Invalid zone or range", body = ErrorResponse),
        (status = 404, description = "Zone not found", body = ErrorResponse),
        (status = 422, description = "Bad dataset", body = ErrorResponse),
        (status = 503, description = "Data source unavailable", body = ErrorResponse),
    )
)]
pub async fn get_intensity(
    State(state): State<AppState>,
    Path(zone): Path<String>,
    Query(query): Query<IntensityQuery>,
) -> Result<impl IntoResponse, GatewayError> {
    let zone = ZoneId::new(zone)?;
    let start = parse_request_time("start", &query.start)?;
    let end = parse_request_time("end", &query.end)?;
    let range = TimeRange::new(start, end)
        .ok_or_else(|| GatewayError::InvalidRequest("end must be after start".to_string()))?;

    let series = state.service.intensity_series(&zone, range).await?;

    Ok(Json(IntensitySeriesResponse {
        zone: zone.into(),
        start,
        end,
        points: series.points().to_vec(),
        report: *series.report(),
    }))
}

/// `GET /emission-factors`: The emissions factor table in use.
#[utoipa::path(
    get,
    path = "/api/v1/emission-factors",
    tag = "Intensity",
    summary = "List emissions factors",
    description = "Returns the kg CO2 per kWh factor of every registered fuel. Unlisted fuels count as zero-emission.",
    responses(
        (status = 200, description = "Factor table", body = Vec<EmissionFactorDto>),
    )
)]
pub async fn list_emission_factors(State(state): State<AppState>) -> impl IntoResponse {
    let factors: Vec<EmissionFactorDto> = state
        .service
        .factors()
        .iter()
        .map(|(fuel, factor)| EmissionFactorDto {
            fuel_type: fuel.to_string(),
            kg_co2_per_kwh: factor,
        })
        .collect();
    Json(factors)
}

/// Intensity routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/zones/{zone}/intensity", get(get_intensity))
        .route("/emission-factors", get(list_emission_factors))
}
