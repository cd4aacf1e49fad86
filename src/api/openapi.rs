//! OpenAPI document for the REST API.

use utoipa::OpenApi;

use crate::api::dto::{
    ChargingRecommendationDto, ChargingRequestDto, EmissionFactorDto, IntensitySeriesResponse,
};
use crate::api::handlers::{intensity, recommendation, system};
use crate::domain::{IntensityPoint, SeriesReport};
use crate::error::{ErrorBody, ErrorResponse};

/// Generated OpenAPI specification, served at `/api-docs/openapi.json`.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "carbon-charge",
        description = "Lowest-carbon EV charging start times from historical grid fuel-mix data."
    ),
    paths(
        recommendation::recommend,
        intensity::get_intensity,
        intensity::list_emission_factors,
        system::health_handler,
    ),
    components(schemas(
        ChargingRequestDto,
        ChargingRecommendationDto,
        IntensitySeriesResponse,
        IntensityPoint,
        SeriesReport,
        EmissionFactorDto,
        system::HealthResponse,
        ErrorResponse,
        ErrorBody,
    )),
    tags(
        (name = "Recommendations", description = "Charging window search"),
        (name = "Intensity", description = "Carbon-intensity series and factors"),
        (name = "System", description = "Service status"),
    )
)]
pub struct ApiDoc;
