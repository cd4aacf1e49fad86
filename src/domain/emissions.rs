//! Emissions factors per fuel type.

use std::collections::BTreeMap;

use super::FuelType;

/// Factors (kg CO₂ per kWh) used when no custom table is supplied.
///
/// Fossil and combustion fuels carry lifecycle medians; zero-carbon sources
/// are registered explicitly at `0.0`.
pub const DEFAULT_FACTORS: [(&str, f64); 11] = [
    ("coal", 0.82),
    ("oil", 0.65),
    ("natural_gas", 0.49),
    ("biomass", 0.23),
    ("biogas", 0.23),
    ("geothermal", 0.0),
    ("nuclear", 0.0),
    ("solar", 0.0),
    ("wind", 0.0),
    ("large_hydro", 0.0),
    ("small_hydro", 0.0),
];

/// Error raised when a factor table is constructed with an invalid entry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid emissions factor for {fuel}: {factor} (must be finite and >= 0)")]
pub struct InvalidFactor {
    /// Offending fuel.
    pub fuel: FuelType,
    /// Offending value.
    pub factor: f64,
}

/// Immutable mapping from fuel type to kg CO₂ per kWh.
///
/// Fuels missing from the table have an implicit factor of `0.0`: they count
/// toward total generation but not toward emissions. Share it behind an
/// `Arc`; nothing mutates it after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct EmissionsFactorTable {
    factors: BTreeMap<FuelType, f64>,
}

impl EmissionsFactorTable {
    /// Builds a table from `(fuel, factor)` pairs. Later duplicates win.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidFactor`] if any factor is negative or not finite.
    pub fn new<I, F>(entries: I) -> Result<Self, InvalidFactor>
    where
        I: IntoIterator<Item = (F, f64)>,
        F: Into<FuelType>,
    {
        let mut factors = BTreeMap::new();
        for (fuel, factor) in entries {
            let fuel = fuel.into();
            if !factor.is_finite() || factor < 0.0 {
                return Err(InvalidFactor { fuel, factor });
            }
            factors.insert(fuel, factor);
        }
        Ok(Self { factors })
    }

    /// Returns the factor for `fuel`, or `0.0` when it is not registered.
    #[must_use]
    pub fn factor(&self, fuel: &FuelType) -> f64 {
        self.factors.get(fuel).copied().unwrap_or(0.0)
    }

    /// Returns `true` if `fuel` has an explicit entry.
    #[must_use]
    pub fn is_registered(&self, fuel: &FuelType) -> bool {
        self.factors.contains_key(fuel)
    }

    /// Iterates over registered fuels in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&FuelType, f64)> {
        self.factors.iter().map(|(fuel, factor)| (fuel, *factor))
    }

    /// Number of registered fuels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factors.len()
    }

    /// Returns `true` if no fuel is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }
}

impl Default for EmissionsFactorTable {
    fn default() -> Self {
        let factors = DEFAULT_FACTORS
            .iter()
            .map(|(fuel, factor)| (FuelType::new(fuel), *factor))
            .collect();
        Self { factors }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn default_table_has_expected_entries() {
        let table = EmissionsFactorTable::default();
        assert_eq!(table.len(), DEFAULT_FACTORS.len());
        assert!((table.factor(&FuelType::new("Natural Gas")) - 0.49).abs() < f64::EPSILON);
        assert!(table.factor(&FuelType::new("solar")).abs() < f64::EPSILON);
    }

    #[test]
    fn unregistered_fuel_is_zero() {
        let table = EmissionsFactorTable::default();
        let imports = FuelType::new("imports");
        assert!(!table.is_registered(&imports));
        assert!(table.factor(&imports).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_negative_factor() {
        let result = EmissionsFactorTable::new([("coal", -0.1)]);
        let Err(err) = result else {
            panic!("negative factor must be rejected");
        };
        assert_eq!(err.fuel.as_str(), "coal");
    }

    #[test]
    fn rejects_non_finite_factor() {
        assert!(EmissionsFactorTable::new([("gas", f64::NAN)]).is_err());
        assert!(EmissionsFactorTable::new([("gas", f64::INFINITY)]).is_err());
    }

    #[test]
    fn custom_table_normalizes_names() {
        let Ok(table) = EmissionsFactorTable::new([("Natural Gas", 0.4)]) else {
            panic!("valid table");
        };
        assert!((table.factor(&FuelType::new("natural_gas")) - 0.4).abs() < f64::EPSILON);
    }
}
