//! # carbon-charge
//!
//! REST service that recommends the lowest-carbon start time for an EV
//! charging session, from historical grid fuel-mix data.
//!
//! Fuel-mix rows (MW per fuel per interval) are turned into an hourly
//! carbon-intensity series in kg CO₂/kWh, and the charging window is
//! searched hour by hour for the start time with the lowest estimated
//! emissions.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── RecommendationService (service/)
//!     │
//!     ├── IntensitySeriesBuilder  ─┐
//!     ├── ChargingWindowOptimizer ─┴─ (domain/)
//!     │
//!     └── FuelMixProvider (ingestion/): CSV files | PostgreSQL
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod ingestion;
pub mod service;
