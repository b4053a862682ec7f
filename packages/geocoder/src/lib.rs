#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Address resolution for venue profiles.
//!
//! Turns a free-text street address into the census tract it falls in,
//! together with the tract's land area and population, using the US Census
//! Bureau geographies endpoint. Providers are configured via TOML files in
//! `services/`:
//!
//! 1. **US Census Bureau Geocoder** (priority 1): resolves the tract.
//!    Accepts an optional API key.
//! 2. **Nominatim / OpenStreetMap** (priority 2): coordinates only. Used
//!    when a caller opts into a point fallback after the Census geocoder
//!    fails.
//!
//! Resolution is a single request. Nothing here retries; a failure is
//! returned to the caller as a [`ResolutionError`].

pub mod census;
pub mod nominatim;
pub mod service_registry;

use async_trait::async_trait;
use thiserror::Error;
use venue_profile_tract_models::{Coordinates, ResolvedAddress};

/// Errors from address resolution.
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The geocoder returned no match for the address.
    #[error("No address match for \"{address}\"")]
    NoMatch {
        /// The address as submitted.
        address: String,
    },

    /// A required tract field was absent or empty in the match.
    #[error("Match is missing required field {field}")]
    MissingField {
        /// Upstream name of the missing field (e.g. `"POP100"`).
        field: &'static str,
    },

    /// The response did not have the expected shape.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,
}

/// Which geocoding provider produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeocodingProvider {
    /// US Census Bureau Geocoder.
    Census,
    /// Nominatim / OpenStreetMap.
    Nominatim,
}

/// A point-only geocoding result.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPoint {
    /// Where the match landed.
    pub coordinates: Coordinates,
    /// Display name reported by the provider.
    pub display_name: Option<String>,
    /// Which provider resolved this address.
    pub provider: GeocodingProvider,
}

/// Resolves addresses to census tracts.
#[async_trait]
pub trait TractGeocoder: Send + Sync {
    /// Resolves `address` to its tract and match coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError`] if there is no match, a required tract
    /// field is missing, or the request fails.
    async fn resolve(&self, address: &str) -> Result<ResolvedAddress, ResolutionError>;
}

/// Resolves addresses to coordinates only.
#[async_trait]
pub trait PointGeocoder: Send + Sync {
    /// Locates `address`, returning `None` when there is no match.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError`] if the request or response parsing
    /// fails.
    async fn locate(&self, address: &str) -> Result<Option<GeocodedPoint>, ResolutionError>;
}
