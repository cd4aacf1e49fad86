//! Domain layer: fuel-mix rows, emissions factors, intensity series, and the
//! charging window search.
//!
//! Everything here is pure and synchronous. The two computational pieces are
//! [`IntensitySeriesBuilder`] (raw rows → hourly carbon intensity) and
//! [`ChargingWindowOptimizer`] (request + series → recommendation).

pub mod charging;
pub mod emissions;
pub mod fuel;
pub mod intensity;
pub mod optimizer;
pub mod zone_id;

pub use charging::{ChargingRecommendation, ChargingRequest, MAX_WINDOW_HOURS};
pub use emissions::EmissionsFactorTable;
pub use fuel::{FuelReading, FuelType, RawFuelRow, TimeRange};
pub use intensity::{
    IntensityPoint, IntensitySeries, IntensitySeriesBuilder, SeriesError, SeriesReport,
};
pub use optimizer::{ChargingWindowOptimizer, OptimizerError};
pub use zone_id::ZoneId;
