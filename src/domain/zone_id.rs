//! Type-safe grid zone identifier.
//!
//! [`ZoneId`] is a validated newtype around a `String` so that zone names
//! cannot be confused with other strings, and so a zone can safely name a
//! file in the flat-file data directory.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// Maximum accepted zone identifier length in bytes.
pub const MAX_ZONE_LEN: usize = 64;

/// Identifier of a balancing area or grid zone (e.g. `"CAISO"`).
///
/// Non-empty, at most [`MAX_ZONE_LEN`] characters, ASCII alphanumerics plus
/// `-` and `_` only. Case is preserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ZoneId(String);

impl ZoneId {
    /// Validates and wraps a zone identifier.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidZone`] if the identifier is empty,
    /// too long, or contains characters outside `[A-Za-z0-9_-]`.
    pub fn new(raw: impl Into<String>) -> Result<Self, GatewayError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(GatewayError::InvalidZone("zone must not be empty".to_string()));
        }
        if trimmed.len() > MAX_ZONE_LEN {
            return Err(GatewayError::InvalidZone(format!(
                "zone exceeds {MAX_ZONE_LEN} characters"
            )));
        }
        if let Some(bad) = trimmed
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(GatewayError::InvalidZone(format!(
                "zone contains invalid character {bad:?}"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ZoneId {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ZoneId {
    type Error = GatewayError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ZoneId> for String {
    fn from(id: ZoneId) -> Self {
        id.0
    }
}

impl AsRef<str> for ZoneId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
