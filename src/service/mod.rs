//! Service layer: business logic orchestration.
//!
//! [`RecommendationService`] pulls rows from the configured
//! [`crate::ingestion::FuelMixProvider`], builds the intensity series, and
//! runs the charging window search.

pub mod recommendation_service;

pub use recommendation_service::RecommendationService;
