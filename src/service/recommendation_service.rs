//! Recommendation service: provider → series builder → optimizer.

use std::sync::Arc;

use crate::domain::{
    ChargingRecommendation, ChargingRequest, ChargingWindowOptimizer, EmissionsFactorTable,
    IntensitySeries, IntensitySeriesBuilder, TimeRange, ZoneId,
};
use crate::error::GatewayError;
use crate::ingestion::FuelMixProvider;

/// Orchestration layer for intensity and recommendation requests.
///
/// Stateless coordinator: owns the [`FuelMixProvider`] for data and the two
/// pure domain components. Every request follows the pattern: validate →
/// fetch rows → build series → (optimize) → return result. Nothing is cached
/// between calls.
#[derive(Debug, Clone)]
pub struct RecommendationService {
    provider: Arc<dyn FuelMixProvider>,
    builder: IntensitySeriesBuilder,
    optimizer: ChargingWindowOptimizer,
}

impl RecommendationService {
    /// Creates a new `RecommendationService`.
    #[must_use]
    pub fn new(provider: Arc<dyn FuelMixProvider>, factors: Arc<EmissionsFactorTable>) -> Self {
        Self {
            provider,
            builder: IntensitySeriesBuilder::new(factors),
            optimizer: ChargingWindowOptimizer::new(),
        }
    }

    /// Returns the backing provider.
    #[must_use]
    pub fn provider(&self) -> &Arc<dyn FuelMixProvider> {
        &self.provider
    }

    /// Returns the emissions factors in use.
    #[must_use]
    pub fn factors(&self) -> &EmissionsFactorTable {
        self.builder.factors()
    }

    /// Builds the hourly intensity series for `zone` over `range`.
    ///
    /// An empty series is returned as-is; callers decide whether that is
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Ingestion`] if the provider fails and
    /// [`GatewayError::DataQuality`] if the rows are unusable.
    pub async fn intensity_series(
        &self,
        zone: &ZoneId,
        range: TimeRange,
    ) -> Result<IntensitySeries, GatewayError> {
        let rows = self.provider.fetch_rows(zone, range).await?;

        let series = self.builder.build(&rows, range).map_err(|source| {
            tracing::warn!(%zone, %range, error = %source, "rejected fuel-mix data");
            GatewayError::DataQuality {
                zone: zone.clone(),
                source,
            }
        })?;

        let report = series.report();
        tracing::info!(
            %zone,
            %range,
            total_rows = report.total_rows,
            in_range = report.in_range,
            accepted = report.accepted,
            invalid_timestamps = report.invalid_timestamps,
            parse_failures = report.parse_failures,
            zero_generation = report.zero_generation,
            duplicates = report.duplicates,
            "built intensity series"
        );
        Ok(series)
    }

    /// Recommends the lowest-emissions start time for `request`.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::InvalidRequest`] if the request is malformed
    ///   (checked before any data is read).
    /// - [`GatewayError::NoDataAvailable`] if no rows fall in the window.
    /// - [`GatewayError::DataQuality`] / [`GatewayError::Ingestion`] as for
    ///   [`RecommendationService::intensity_series`].
    /// - [`GatewayError::Infeasible`] if no start time fits.
    pub async fn recommend(
        &self,
        request: &ChargingRequest,
    ) -> Result<ChargingRecommendation, GatewayError> {
        let window = request.validate()?;
        let zone = &request.zone;

        let series = self.intensity_series(zone, window).await?;
        if series.is_empty() {
            return Err(GatewayError::NoDataAvailable {
                zone: zone.clone(),
                range: window,
            });
        }

        let recommendation = self
            .optimizer
            .optimize(request, series.points())
            .inspect_err(|e| tracing::info!(%zone, error = %e, "no recommendation"))?;

        tracing::info!(
            %zone,
            start = %recommendation.recommended_start,
            end = %recommendation.recommended_end,
            emissions_kg = recommendation.estimated_emissions_kg,
            "recommendation computed"
        );
        Ok(recommendation)
    }
}
