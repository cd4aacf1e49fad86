//! Charging recommendation endpoint.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{ChargingRecommendationDto, ChargingRequestDto};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};

/// `POST /recommendations`: Recommend the lowest-carbon charging start.
///
/// # Errors
///
/// Returns [`GatewayError`] on invalid input, missing or unusable data, or
/// when no start time fits the window.
#[utoipa::path(
    post,
    path = "/api/v1/recommendations",
    tag = "Recommendations",
    summary = "Recommend a charging start time",
    description = "Finds the hour-aligned start time within the window that minimizes estimated emissions, using historical hourly carbon intensity for the zone.",
    request_body = ChargingRequestDto,
    responses(
        (status = 200, description = "Recommendation computed", body = ChargingRecommendationDto),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "No data for the zone or window", body = ErrorResponse),
        (status = 422, description = "Bad dataset or infeasible window", body = ErrorResponse),
        (status = 503, description = "Data source unavailable", body = ErrorResponse),
    )
)]
pub async fn recommend(
    State(state): State<AppState>,
    Json(req): Json<ChargingRequestDto>,
) -> Result<impl IntoResponse, GatewayError> {
    let request = req.into_domain()?;
    let recommendation = state.service.recommend(&request).await?;
    Ok(Json(ChargingRecommendationDto::from(recommendation)))
}

/// Recommendation routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/recommendations", post(recommend))
}
