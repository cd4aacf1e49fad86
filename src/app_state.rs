//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::service::RecommendationService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Recommendation service for all business logic.
    pub service: Arc<RecommendationService>,
}

impl AppState {
    /// Wraps a service for sharing across handlers.
    #[must_use]
    pub fn new(service: RecommendationService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}
