//! Fuel-mix input rows and the time primitives they are keyed on.
//!
//! Ingestion providers hand the core [`RawFuelRow`]s: an unparsed timestamp
//! plus one optional string cell per fuel column. The series builder turns
//! each into a [`FuelReading`] (or skips it) before computing intensity.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Normalized fuel-type identifier.
///
/// Source column names vary in case and separators, so identifiers are
/// lowercased and spaces/hyphens become underscores:
/// `"Natural Gas"` and `"natural-gas"` both map to `natural_gas`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FuelType(String);

impl FuelType {
    /// Normalizes a raw column name into a fuel identifier.
    #[must_use]
    pub fn new(raw: &str) -> Self {
        let normalized = raw
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '-' => '_',
                other => other.to_ascii_lowercase(),
            })
            .collect();
        Self(normalized)
    }

    /// Returns the normalized identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FuelType {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// One unparsed interval row as supplied by an ingestion provider.
///
/// `values` maps the source's fuel column name to its cell. `None` (or an
/// empty string) means the cell was missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFuelRow {
    /// Interval start as written in the source.
    pub timestamp: String,
    /// Fuel column name to raw power cell (MW).
    pub values: BTreeMap<String, Option<String>>,
}

impl RawFuelRow {
    /// Creates a row with the given timestamp and no fuel cells.
    #[must_use]
    pub fn new(timestamp: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            values: BTreeMap::new(),
        }
    }

    /// Adds a fuel cell, builder style.
    #[must_use]
    pub fn with(mut self, fuel: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(fuel.into(), Some(value.into()));
        self
    }

    /// Adds an explicitly missing fuel cell, builder style.
    #[must_use]
    pub fn with_missing(mut self, fuel: impl Into<String>) -> Self {
        self.values.insert(fuel.into(), None);
        self
    }
}

/// A parsed interval row: UTC instant plus average power per fuel (MW).
#[derive(Debug, Clone, PartialEq)]
pub struct FuelReading {
    /// Interval start, always UTC.
    pub timestamp: DateTime<Utc>,
    /// Average power per fuel over the interval, in megawatts.
    pub power_mw: BTreeMap<FuelType, f64>,
}

/// Half-open UTC interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    /// Inclusive lower bound.
    pub start: DateTime<Utc>,
    /// Exclusive upper bound.
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// Creates a range, returning `None` unless `end` is strictly after `start`.
    #[must_use]
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        (end > start).then_some(Self { start, end })
    }

    /// Returns `true` if `instant` lies in `[start, end)`.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parses a source timestamp into a UTC instant.
///
/// RFC 3339 timestamps with an offset are converted to UTC. Naive
/// timestamps (no offset) are taken to already be UTC.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Some(with_offset.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}
