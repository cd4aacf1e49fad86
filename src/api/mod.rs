//! REST API layer: route handlers, DTOs, OpenAPI, and router composition.
//!
//! All resource endpoints are mounted under `/api/v1`.

pub mod dto;
pub mod handlers;
pub mod openapi;

use axum::Router;

use crate::app_state::AppState;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    let router = Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes());

    #[cfg(feature = "swagger-ui")]
    let router = {
        use utoipa::OpenApi;
        router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
        )
    };

    router
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::domain::{EmissionsFactorTable, RawFuelRow, ZoneId};
    use crate::ingestion::InMemoryFuelMixProvider;
    use crate::service::RecommendationService;

    fn app() -> Router {
        let Ok(zone) = ZoneId::new("Z1") else {
            panic!("valid zone");
        };
        let rows = vec![
            RawFuelRow::new("2024-06-01T00:00:00Z")
                .with("Coal", "50")
                .with("Wind", "50"),
        ];
        let provider = InMemoryFuelMixProvider::new().with_zone(zone, rows);
        let service =
            RecommendationService::new(Arc::new(provider), Arc::new(EmissionsFactorTable::default()));
        build_router().with_state(AppState::new(service))
    }

    async fn status_of(request: Request<Body>) -> StatusCode {
        match app().oneshot(request).await {
            Ok(response) => response.status(),
            Err(e) => panic!("router failed: {e}"),
        }
    }

    fn get(uri: &str) -> Request<Body> {
        match Request::get(uri).body(Body::empty()) {
            Ok(request) => request,
            Err(e) => panic!("request: {e}"),
        }
    }

    #[tokio::test]
    async fn health_is_mounted_at_root() {
        assert_eq!(status_of(get("/health")).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn resources_are_under_api_v1() {
        assert_eq!(
            status_of(get("/api/v1/emission-factors")).await,
            StatusCode::OK
        );
        assert_eq!(
            status_of(get("/emission-factors")).await,
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn invalid_zone_in_path_is_400() {
        let uri = "/api/v1/zones/bad.zone/intensity?start=2024-06-01T00:00:00Z&end=2024-06-02T00:00:00Z";
        assert_eq!(status_of(get(uri)).await, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_json_is_rejected() {
        let request = Request::post("/api/v1/recommendations")
            .header("content-type", "application/json")
            .body(Body::from("{\"zone\":"));
        let Ok(request) = request else {
            panic!("request");
        };
        assert!(status_of(request).await.is_client_error());
    }
}
