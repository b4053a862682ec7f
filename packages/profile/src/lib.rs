#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Venue profiles for a street address.
//!
//! Wires the stages together for one address:
//!
//! 1. resolve the address to a census tract ([`venue_profile_geocoder`])
//! 2. average the tract's household income brackets
//!    ([`venue_profile_census`])
//! 3. turn density and income into a search radius
//!    ([`venue_profile_radius`])
//! 4. search venues and fetch their menus ([`venue_profile_venues`])
//! 5. summarize menu prices ([`venue_profile_stats`])
//!
//! Each stage finishes before the next starts. Results can be exported as
//! JSON snapshots and GeoJSON map data.

pub mod config;
pub mod export;
pub mod map;
pub mod pipeline;
pub mod profile;

#[cfg(test)]
mod testing;

use thiserror::Error;
use venue_profile_census::AggregateError;
use venue_profile_geocoder::ResolutionError;
use venue_profile_radius::{InvalidInputError, RadiusError};
use venue_profile_stats::StatsError;
use venue_profile_venues::VenueError;

pub use config::{ConfigError, Credentials, ProfileConfig};
pub use export::ExportError;
pub use pipeline::{Derivation, RadiusOrigin, RadiusPipeline, SearchArea};
pub use profile::{ProfileBuilder, ProfileTables, RawSnapshot, VenueProfile};

/// Any failure while building, exporting or loading a profile.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// The address could not be resolved to a tract.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// Tract statistics were unavailable, or the tract has no residents.
    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    /// The radius could not be computed.
    #[error(transparent)]
    Radius(#[from] RadiusError),

    /// A radius profile is unusable.
    #[error(transparent)]
    InvalidInput(#[from] InvalidInputError),

    /// A venue directory request failed.
    #[error(transparent)]
    Venue(#[from] VenueError),

    /// Price statistics could not be computed.
    #[error(transparent)]
    Stats(#[from] StatsError),

    /// Reading or writing an export failed.
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Credentials or configuration were missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
