//! In-memory provider, for tests and fixtures.

use std::collections::HashMap;

use async_trait::async_trait;

use super::{FuelMixProvider, IngestionError};
use crate::domain::{RawFuelRow, TimeRange, ZoneId};

/// Serves a fixed set of rows per zone.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFuelMixProvider {
    zones: HashMap<ZoneId, Vec<RawFuelRow>>,
}

impl InMemoryFuelMixProvider {
    /// Creates an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the rows for `zone`, replacing any previous ones.
    #[must_use]
    pub fn with_zone(mut self, zone: ZoneId, rows: Vec<RawFuelRow>) -> Self {
        self.zones.insert(zone, rows);
        self
    }
}

#[async_trait]
impl FuelMixProvider for InMemoryFuelMixProvider {
    fn kind(&self) -> &'static str {
        "memory"
    }

    async fn fetch_rows(
        &self,
        zone: &ZoneId,
        _range: TimeRange,
    ) -> Result<Vec<RawFuelRow>, IngestionError> {
        self.zones
            .get(zone)
            .cloned()
            .ok_or_else(|| IngestionError::ZoneNotFound(zone.clone()))
    }
}
