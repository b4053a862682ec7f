#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Census tract and search-area value types.
//!
//! These are the plain data values that flow through the search-radius
//! pipeline: the tract an address resolves to, the household income
//! bracket counts for that tract, the derived average income, and the
//! bounded search radius handed to the venue query.

pub mod brackets;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use brackets::{BRACKET_COUNT, INCOME_BRACKETS, IncomeBracket, IncomeBracketCounts};

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
}

impl Coordinates {
    /// Formats the pair as `"lat,lng"`, the form venue directories expect.
    #[must_use]
    pub fn lat_lng(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

/// The census tract an address falls in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TractLocation {
    /// Two-digit state FIPS code.
    pub state_id: String,
    /// Three-digit county FIPS code.
    pub county_id: String,
    /// Six-digit tract code.
    pub tract_id: String,
    /// Land area in square meters (`AREALAND`).
    pub land_area: f64,
    /// Resident population (`POP100`).
    pub population: u64,
}

impl TractLocation {
    /// Census GEOID (state FIPS + county FIPS + tract code).
    #[must_use]
    pub fn geoid(&self) -> String {
        format!("{}{}{}", self.state_id, self.county_id, self.tract_id)
    }

    /// Whether the state, county, and tract identifiers are all present.
    #[must_use]
    pub fn has_identifiers(&self) -> bool {
        !self.state_id.is_empty() && !self.county_id.is_empty() && !self.tract_id.is_empty()
    }
}

/// An address resolved to a tract and a point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedAddress {
    /// The canonical address returned by the geocoder.
    pub matched_address: Option<String>,
    /// Where the match landed.
    pub coordinates: Coordinates,
    /// The tract containing the match.
    pub tract: TractLocation,
}

/// Average household income per resident of a tract, in dollars.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AverageIncomeEstimate(f64);

impl AverageIncomeEstimate {
    /// Wraps an already-computed estimate.
    #[must_use]
    pub const fn new(dollars: f64) -> Self {
        Self(dollars)
    }

    /// The estimate in dollars.
    #[must_use]
    pub const fn dollars(self) -> f64 {
        self.0
    }
}

/// A venue search radius in meters.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchRadius(f64);

impl SearchRadius {
    /// Clamps `raw` into `[min, max]`.
    #[must_use]
    pub fn clamped(raw: f64, min: f64, max: f64) -> Self {
        Self(raw.clamp(min, max))
    }

    /// A radius taken as-is, used for fixed fallbacks.
    #[must_use]
    pub const fn fixed(meters: f64) -> Self {
        Self(meters)
    }

    /// The radius in meters.
    #[must_use]
    pub const fn meters(self) -> f64 {
        self.0
    }
}

/// Returned when a per-capita figure is requested for a tract with no
/// residents.
///
/// Zero-population tracts (parks, airports, commercial-only tracts) are
/// expected; callers recover by using a fixed fallback radius.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("tract {geoid} has zero population")]
pub struct DivisionByZeroError {
    /// GEOID of the offending tract, empty when not known.
    pub geoid: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tract() -> TractLocation {
        TractLocation {
            state_id: "11".to_string(),
            county_id: "001".to_string(),
            tract_id: "006202".to_string(),
            land_area: 1_432_876.0,
            population: 4_310,
        }
    }

    #[test]
    fn builds_geoid() {
        assert_eq!(tract().geoid(), "11001006202");
    }

    #[test]
    fn detects_missing_identifiers() {
        assert!(tract().has_identifiers());
        let mut t = tract();
        t.county_id.clear();
        assert!(!t.has_identifiers());
    }

    #[test]
    fn clamps_search_radius() {
        assert!((SearchRadius::clamped(12.0, 1000.0, 50_000.0).meters() - 1000.0).abs() < f64::EPSILON);
        assert!((SearchRadius::clamped(9e9, 1000.0, 50_000.0).meters() - 50_000.0).abs() < f64::EPSILON);
        assert!((SearchRadius::clamped(4321.5, 1000.0, 50_000.0).meters() - 4321.5).abs() < f64::EPSILON);
    }

    #[test]
    fn formats_lat_lng() {
        let c = Coordinates {
            latitude: 38.846,
            longitude: -76.927,
        };
        assert_eq!(c.lat_lng(), "38.846,-76.927");
    }

    #[test]
    fn serializes_tract_in_camel_case() {
        let json = serde_json::to_value(tract()).unwrap();
        assert_eq!(json["stateId"], "11");
        assert_eq!(json["landArea"], 1_432_876.0);
    }
}
