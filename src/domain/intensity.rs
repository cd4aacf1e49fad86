//! Carbon-intensity series construction from raw fuel-mix rows.
//!
//! [`IntensitySeriesBuilder`] is a pure transformation: raw rows plus an
//! [`EmissionsFactorTable`] in, a sorted [`IntensitySeries`] out. Bad rows are
//! skipped and tallied in a [`SeriesReport`]; the tallies only become an error
//! once they cross the data-quality thresholds below.
//!
//! For each accepted row:
//!
//! ```text
//! energy_kWh(fuel)  = max(power_MW, 0) × 1 h × 1000
//! generation_kWh    = Σ energy_kWh(fuel)                  (every fuel)
//! emissions_kg      = Σ energy_kWh(fuel) × factor(fuel)   (unregistered = 0)
//! intensity         = emissions_kg / generation_kWh
//! ```

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::fuel::parse_timestamp;
use super::{EmissionsFactorTable, FuelReading, FuelType, RawFuelRow, TimeRange};

/// Rows in range may be zero-generation up to this share before the series
/// is rejected.
pub const MAX_ZERO_GENERATION_SHARE: f64 = 0.5;

const KWH_PER_MWH: f64 = 1000.0;

/// Carbon intensity of one hourly interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct IntensityPoint {
    /// Interval start (UTC).
    pub timestamp: DateTime<Utc>,
    /// Average emissions per unit of energy, always `>= 0`.
    pub kg_co2_per_kwh: f64,
}

impl IntensityPoint {
    /// Creates a point.
    #[must_use]
    pub const fn new(timestamp: DateTime<Utc>, kg_co2_per_kwh: f64) -> Self {
        Self {
            timestamp,
            kg_co2_per_kwh,
        }
    }
}

/// Per-row tallies collected while building a series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct SeriesReport {
    /// Rows supplied by the source.
    pub total_rows: usize,
    /// Rows whose timestamp could not be parsed.
    pub invalid_timestamps: usize,
    /// Rows whose timestamp fell inside the requested range.
    pub in_range: usize,
    /// In-range rows rejected for a non-numeric or overflowing power value.
    pub parse_failures: usize,
    /// In-range rows with no usable generation.
    pub zero_generation: usize,
    /// In-range rows repeating an already accepted timestamp.
    pub duplicates: usize,
    /// Rows that produced a point.
    pub accepted: usize,
}

impl SeriesReport {
    /// Share of in-range rows excluded for zero generation. Duplicate rows
    /// are left out of the denominator so repeats cannot dilute the share.
    #[must_use]
    pub fn zero_generation_share(&self) -> f64 {
        let distinct = self.in_range.saturating_sub(self.duplicates);
        if distinct == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let share = self.zero_generation as f64 / distinct as f64;
        share
    }
}

/// Sorted, de-duplicated intensity points with the report that produced them.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct IntensitySeries {
    points: Vec<IntensityPoint>,
    report: SeriesReport,
}

impl IntensitySeries {
    /// Wraps externally computed points, sorting them by timestamp.
    #[must_use]
    pub fn from_points(mut points: Vec<IntensityPoint>) -> Self {
        points.sort_by_key(|p| p.timestamp);
        let report = SeriesReport {
            total_rows: points.len(),
            in_range: points.len(),
            accepted: points.len(),
            ..SeriesReport::default()
        };
        Self { points, report }
    }

    /// Points in ascending timestamp order.
    #[must_use]
    pub fn points(&self) -> &[IntensityPoint] {
        &self.points
    }

    /// Row tallies.
    #[must_use]
    pub const fn report(&self) -> &SeriesReport {
        &self.report
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` when no row in range produced a point.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Fatal data-quality outcomes of [`IntensitySeriesBuilder::build`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SeriesError {
    /// The source returned no rows at all.
    #[error("no data rows")]
    NoDataRows,

    /// Rows fell inside the range but none produced a point.
    #[error(
        "all rows in range invalid: {} rows in {range}, {} unparseable, {} zero-generation, {} duplicate",
        .report.in_range, .report.parse_failures, .report.zero_generation, .report.duplicates
    )]
    AllRowsInvalid {
        /// Requested range.
        range: TimeRange,
        /// Tallies at the point of failure.
        report: SeriesReport,
    },

    /// Too many rows in range had zero generation to trust the rest.
    #[error(
        "majority zero-generation: {} of {} rows in {range}",
        .report.zero_generation, .report.in_range
    )]
    MajorityZeroGeneration {
        /// Requested range.
        range: TimeRange,
        /// Tallies at the point of failure.
        report: SeriesReport,
    },
}

/// Why a single in-range row produced no point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowRejection {
    Unparseable,
    ZeroGeneration,
}

/// Converts raw fuel-mix rows into an hourly carbon-intensity series.
#[derive(Debug, Clone, Default)]
pub struct IntensitySeriesBuilder {
    factors: Arc<EmissionsFactorTable>,
}

impl IntensitySeriesBuilder {
    /// Creates a builder over the given factor table.
    #[must_use]
    pub fn new(factors: Arc<EmissionsFactorTable>) -> Self {
        Self { factors }
    }

    /// The factor table in use.
    #[must_use]
    pub fn factors(&self) -> &EmissionsFactorTable {
        &self.factors
    }

    /// Builds the series for rows whose timestamp lies in `range`.
    ///
    /// An empty result is not an error: if rows exist but none fall inside
    /// `range`, an empty series is returned and the caller decides.
    ///
    /// # Errors
    ///
    /// - [`SeriesError::NoDataRows`] if `rows` is empty.
    /// - [`SeriesError::AllRowsInvalid`] if rows fall in range but none is usable.
    /// - [`SeriesError::MajorityZeroGeneration`] if more than
    ///   [`MAX_ZERO_GENERATION_SHARE`] of in-range rows have zero generation.
    pub fn build(
        &self,
        rows: &[RawFuelRow],
        range: TimeRange,
    ) -> Result<IntensitySeries, SeriesError> {
        if rows.is_empty() {
            return Err(SeriesError::NoDataRows);
        }

        let mut report = SeriesReport {
            total_rows: rows.len(),
            ..SeriesReport::default()
        };
        let mut seen = HashSet::new();
        let mut points = Vec::new();

        for row in rows {
            let Some(timestamp) = parse_timestamp(&row.timestamp) else {
                tracing::debug!(timestamp = %row.timestamp, "skipping row: unparseable timestamp");
                report.invalid_timestamps += 1;
                continue;
            };
            if !range.contains(timestamp) {
                continue;
            }
            report.in_range += 1;

            match self.intensity_of_row(timestamp, row) {
                Ok(_) if seen.contains(&timestamp) => {
                    tracing::debug!(%timestamp, "skipping row: duplicate timestamp");
                    report.duplicates += 1;
                }
                Ok(kg_co2_per_kwh) => {
                    seen.insert(timestamp);
                    points.push(IntensityPoint::new(timestamp, kg_co2_per_kwh));
                }
                Err(RowRejection::Unparseable) => {
                    tracing::debug!(%timestamp, "skipping row: unparseable power value");
                    report.parse_failures += 1;
                }
                Err(RowRejection::ZeroGeneration) => {
                    tracing::debug!(%timestamp, "skipping row: zero generation");
                    report.zero_generation += 1;
                }
            }
        }
        report.accepted = points.len();

        if report.in_range == 0 {
            return Ok(IntensitySeries { points, report });
        }
        if points.is_empty() {
            return Err(SeriesError::AllRowsInvalid { range, report });
        }
        if report.zero_generation_share() > MAX_ZERO_GENERATION_SHARE {
            return Err(SeriesError::MajorityZeroGeneration { range, report });
        }

        points.sort_by_key(|p| p.timestamp);
        Ok(IntensitySeries { points, report })
    }

    /// Carbon intensity of a parsed reading, or `None` when its total
    /// generation is not positive or the totals overflow.
    #[must_use]
    pub fn intensity(&self, reading: &FuelReading) -> Option<f64> {
        self.checked_intensity(reading).ok()
    }

    fn checked_intensity(&self, reading: &FuelReading) -> Result<f64, RowRejection> {
        let mut generation_kwh = 0.0;
        let mut emissions_kg = 0.0;
        for (fuel, power_mw) in &reading.power_mw {
            let energy_kwh = power_mw.max(0.0) * KWH_PER_MWH;
            generation_kwh += energy_kwh;
            emissions_kg += energy_kwh * self.factors.factor(fuel);
        }
        if !(generation_kwh.is_finite() && emissions_kg.is_finite()) {
            return Err(RowRejection::Unparseable);
        }
        if generation_kwh <= 0.0 {
            return Err(RowRejection::ZeroGeneration);
        }
        let intensity = emissions_kg / generation_kwh;
        if intensity.is_finite() {
            Ok(intensity)
        } else {
            Err(RowRejection::Unparseable)
        }
    }

    fn intensity_of_row(
        &self,
        timestamp: DateTime<Utc>,
        row: &RawFuelRow,
    ) -> Result<f64, RowRejection> {
        let reading = parse_reading(timestamp, row)?;
        self.checked_intensity(&reading)
    }
}

/// Parses every fuel cell of `row`. Missing or blank cells read as 0 MW; a
/// single non-numeric cell rejects the whole row.
fn parse_reading(timestamp: DateTime<Utc>, row: &RawFuelRow) -> Result<FuelReading, RowRejection> {
    let mut power_mw = BTreeMap::new();
    for (column, cell) in &row.values {
        let value = match cell.as_deref().map(str::trim) {
            None | Some("") => 0.0,
            Some(text) => text
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or(RowRejection::Unparseable)?,
        };
        *power_mw.entry(FuelType::new(column)).or_insert(0.0) += value;
    }
    Ok(FuelReading {
        timestamp,
        power_mw,
    })
}
