//! Flat-file provider: one CSV file per zone.
//!
//! `<data_dir>/<zone>.csv`, header row first. The first column holds the
//! interval timestamp (its header name is ignored); every other column is a
//! fuel type with power in MW. Blank cells and short rows are missing values.
//! Two columns naming the same fuel (after normalization) reject the file.
//!
//! ```text
//! Time,Solar,Wind,Natural Gas,Imports
//! 2024-06-01 00:00:00,0,2104.5,4010,5120
//! 2024-06-01 01:00:00,0,1988,3920.25,
//! ```

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{FuelMixProvider, IngestionError};
use crate::domain::{FuelType, RawFuelRow, TimeRange, ZoneId};

/// Reads `<data_dir>/<zone>.csv` on every request.
#[derive(Debug, Clone)]
pub struct CsvFuelMixProvider {
    data_dir: PathBuf,
}

impl CsvFuelMixProvider {
    /// Creates a provider rooted at `data_dir`.
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// The directory zone files are read from.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn zone_path(&self, zone: &ZoneId) -> PathBuf {
        self.data_dir.join(format!("{zone}.csv"))
    }
}

#[async_trait]
impl FuelMixProvider for CsvFuelMixProvider {
    fn kind(&self) -> &'static str {
        "csv"
    }

    async fn fetch_rows(
        &self,
        zone: &ZoneId,
        range: TimeRange,
    ) -> Result<Vec<RawFuelRow>, IngestionError> {
        let path = self.zone_path(zone);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(IngestionError::ZoneNotFound(zone.clone()));
            }
            Err(e) => return Err(e.into()),
        };
        let rows = parse_rows(&bytes)?;
        tracing::debug!(%zone, %range, path = %path.display(), rows = rows.len(), "read fuel-mix csv");
        Ok(rows)
    }
}

/// Parses CSV bytes into raw rows without interpreting any cell.
///
/// # Errors
///
/// Returns [`IngestionError::Csv`] if the header or a record is not valid
/// CSV, and [`IngestionError::DuplicateColumn`] if two fuel columns name the
/// same fuel once normalized.
pub fn parse_rows(bytes: &[u8]) -> Result<Vec<RawFuelRow>, IngestionError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);
    let headers = reader.headers()?.clone();

    let mut fuels = HashSet::new();
    for column in headers.iter().skip(1) {
        if !fuels.insert(FuelType::new(column)) {
            return Err(IngestionError::DuplicateColumn(column.to_string()));
        }
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut row = RawFuelRow::new(record.get(0).unwrap_or_default());
        for (fuel, cell) in headers.iter().zip(record.iter()).skip(1) {
            let value = (!cell.is_empty()).then(|| cell.to_string());
            row.values.insert(fuel.to_string(), value);
        }
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const SAMPLE: &str = "Time,Solar,Natural Gas,Imports\n\
        2024-06-01 00:00:00,0,4010,5120\n\
        2024-06-01 01:00:00, 12.5 ,3920.25,\n\
        2024-06-01 02:00:00,7\n";

    fn zone() -> ZoneId {
        let Ok(zone) = ZoneId::new("CAISO") else {
            panic!("valid zone");
        };
        zone
    }

    fn range() -> TimeRange {
        let (Some(start), Some(end)) = (
            Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).single(),
            Utc.with_ymd_and_hms(2024, 6, 2, 0, 0, 0).single(),
        ) else {
            panic!("valid times");
        };
        let Some(range) = TimeRange::new(start, end) else {
            panic!("valid range");
        };
        range
    }

    #[test]
    fn parses_header_and_cells() {
        let Ok(rows) = parse_rows(SAMPLE.as_bytes()) else {
            panic!("sample should parse");
        };
        assert_eq!(rows.len(), 3);

        let Some(first) = rows.first() else {
            panic!("first row");
        };
        assert_eq!(first.timestamp, "2024-06-01 00:00:00");
        assert_eq!(
            first.values.get("Natural Gas").cloned().flatten().as_deref(),
            Some("4010")
        );

        let Some(second) = rows.get(1) else {
            panic!("second row");
        };
        assert_eq!(second.values.get("Solar").cloned().flatten().as_deref(), Some("12.5"));
        assert_eq!(second.values.get("Imports"), Some(&None));
    }

    #[test]
    fn short_rows_omit_trailing_columns() {
        let Ok(rows) = parse_rows(SAMPLE.as_bytes()) else {
            panic!("sample should parse");
        };
        let Some(third) = rows.get(2) else {
            panic!("third row");
        };
        assert_eq!(third.values.len(), 1);
        assert!(!third.values.contains_key("Imports"));
    }

    #[test]
    fn header_only_yields_no_rows() {
        let Ok(rows) = parse_rows(b"Time,Solar\n") else {
            panic!("header-only csv is valid");
        };
        assert!(rows.is_empty());
    }

    #[test]
    fn duplicate_fuel_columns_are_rejected() {
        for csv in [
            "Time,Solar,Solar\n2024-06-01 00:00:00,1,2\n",
            "Time,Natural Gas,natural-gas\n2024-06-01 00:00:00,1,2\n",
        ] {
            let result = parse_rows(csv.as_bytes());
            assert!(
                matches!(result, Err(IngestionError::DuplicateColumn(_))),
                "{csv:?} gave {result:?}"
            );
        }
    }

    #[test]
    fn timestamp_header_may_match_a_fuel() {
        let Ok(rows) = parse_rows(b"Solar,Solar\n2024-06-01 00:00:00,5\n") else {
            panic!("first column is not a fuel");
        };
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn reads_zone_file() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        if let Err(e) = std::fs::write(dir.path().join("CAISO.csv"), SAMPLE) {
            panic!("write sample: {e}");
        }
        let provider = CsvFuelMixProvider::new(dir.path());
        let Ok(rows) = provider.fetch_rows(&zone(), range()).await else {
            panic!("fetch should succeed");
        };
        assert_eq!(rows.len(), 3);
        assert_eq!(provider.kind(), "csv");
    }

    #[tokio::test]
    async fn missing_zone_file_is_zone_not_found() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let provider = CsvFuelMixProvider::new(dir.path());
        let result = provider.fetch_rows(&zone(), range()).await;
        assert!(matches!(result, Err(IngestionError::ZoneNotFound(_))));
    }
}
