//! Ingestion layer: where raw fuel-mix rows come from.
//!
//! [`FuelMixProvider`] is the only seam the service depends on. Concrete
//! providers read a flat CSV file per zone ([`CsvFuelMixProvider`]), a
//! PostgreSQL table ([`PostgresFuelMixProvider`]), or memory
//! ([`InMemoryFuelMixProvider`]).

pub mod csv_file;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::domain::{RawFuelRow, TimeRange, ZoneId};

pub use csv_file::CsvFuelMixProvider;
pub use memory::InMemoryFuelMixProvider;
pub use postgres::PostgresFuelMixProvider;

/// Retrieval failures. Only a duplicate fuel column is a property of the data
/// itself; the rest say the source could not be read.
#[derive(Debug, thiserror::Error)]
pub enum IngestionError {
    /// The source has no backing data for the zone (e.g. missing file).
    #[error("no fuel-mix source for zone {0}")]
    ZoneNotFound(ZoneId),

    /// Reading the backing store failed.
    #[error("failed to read fuel-mix source: {0}")]
    Io(#[from] std::io::Error),

    /// The CSV file is structurally malformed.
    #[error("malformed fuel-mix csv: {0}")]
    Csv(#[from] csv::Error),

    /// Two columns of a source name the same fuel.
    #[error("duplicate fuel column {0:?}")]
    DuplicateColumn(String),

    /// Database query or connection failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Capability to supply raw fuel-mix rows for a zone and UTC range.
///
/// Implementations may return rows outside `range`; the series builder
/// filters. Returning no rows at all means the source holds nothing for the
/// zone.
#[async_trait]
pub trait FuelMixProvider: Send + Sync + std::fmt::Debug {
    /// Short name of the backing store, reported by `/health`.
    fn kind(&self) -> &'static str;

    /// Fetches the rows for `zone` covering `range`.
    ///
    /// # Errors
    ///
    /// Returns [`IngestionError`] when the backing store cannot be read.
    async fn fetch_rows(
        &self,
        zone: &ZoneId,
        range: TimeRange,
    ) -> Result<Vec<RawFuelRow>, IngestionError>;
}
