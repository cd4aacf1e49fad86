//! PostgreSQL provider over a long-format `fuel_mix` table.
//!
//! One row per (zone, interval, fuel):
//!
//! ```sql
//! fuel_mix (zone TEXT, interval_start TIMESTAMPTZ, fuel_type TEXT, power_mw DOUBLE PRECISION NULL)
//! ```
//!
//! Rows are regrouped by `interval_start` into [`RawFuelRow`]s so the series
//! builder sees the same shape as the CSV provider.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::{FuelMixProvider, IngestionError};
use crate::config::DatabaseConfig;
use crate::domain::{RawFuelRow, TimeRange, ZoneId};

type FuelMixRow = (DateTime<Utc>, String, Option<f64>);

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS fuel_mix (
        zone            TEXT             NOT NULL,
        interval_start  TIMESTAMPTZ      NOT NULL,
        fuel_type       TEXT             NOT NULL,
        power_mw        DOUBLE PRECISION NULL,
        PRIMARY KEY (zone, interval_start, fuel_type)
    );
    CREATE INDEX IF NOT EXISTS fuel_mix_zone_interval_idx
        ON fuel_mix (zone, interval_start);";

/// PostgreSQL-backed provider using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresFuelMixProvider {
    pool: PgPool,
}

impl PostgresFuelMixProvider {
    /// Creates a provider with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`IngestionError::Database`] if the pool cannot be created.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, IngestionError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect(&config.url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Creates the `fuel_mix` table and its index if missing.
    ///
    /// # Errors
    ///
    /// Returns [`IngestionError::Database`] if a statement fails.
    pub async fn ensure_schema(&self) -> Result<(), IngestionError> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    /// Most recent interval stored for `zone`, whatever its timestamp.
    async fn latest_interval(&self, zone: &ZoneId) -> Result<Vec<FuelMixRow>, IngestionError> {
        let rows = sqlx::query_as::<_, FuelMixRow>(
            "SELECT interval_start, fuel_type, power_mw FROM fuel_mix \
             WHERE zone = $1 AND interval_start = \
             (SELECT MAX(interval_start) FROM fuel_mix WHERE zone = $1) \
             ORDER BY fuel_type",
        )
        .bind(zone.as_str())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[async_trait]
impl FuelMixProvider for PostgresFuelMixProvider {
    fn kind(&self) -> &'static str {
        "postgres"
    }

    async fn fetch_rows(
        &self,
        zone: &ZoneId,
        range: TimeRange,
    ) -> Result<Vec<RawFuelRow>, IngestionError> {
        let mut rows = sqlx::query_as::<_, FuelMixRow>(
            "SELECT interval_start, fuel_type, power_mw FROM fuel_mix \
             WHERE zone = $1 AND interval_start >= $2 AND interval_start < $3 \
             ORDER BY interval_start, fuel_type",
        )
        .bind(zone.as_str())
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await?;

        // An empty range must stay distinguishable from an empty zone.
        if rows.is_empty() {
            rows = self.latest_interval(zone).await?;
        }

        let grouped = group_by_interval(rows);
        tracing::debug!(%zone, %range, rows = grouped.len(), "read fuel-mix rows from postgres");
        Ok(grouped)
    }
}

/// Pivots long-format rows into one [`RawFuelRow`] per interval.
fn group_by_interval(rows: Vec<FuelMixRow>) -> Vec<RawFuelRow> {
    let mut by_interval: BTreeMap<DateTime<Utc>, RawFuelRow> = BTreeMap::new();
    for (interval_start, fuel_type, power_mw) in rows {
        by_interval
            .entry(interval_start)
            .or_insert_with(|| RawFuelRow::new(interval_start.to_rfc3339()))
            .values
            .insert(fuel_type, power_mw.map(|v| v.to_string()));
    }
    by_interval.into_values().collect()
}
