#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Venue search and menu retrieval around a search area.
//!
//! Queries a venue directory (Foursquare Places v2) once per category
//! within the derived search radius, then fetches the menu of every
//! distinct venue found. Raw payloads are kept alongside the flattened
//! [`Venue`] and [`MenuItem`] rows so they can be exported unchanged.
//!
//! [`Venue`]: venue_profile_venues_models::Venue
//! [`MenuItem`]: venue_profile_venues_models::MenuItem

pub mod foursquare;
pub mod menus;
pub mod progress;
pub mod search;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from venue directory operations.
#[derive(Debug, Error)]
pub enum VenueError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The directory answered with a non-200 `meta.code`.
    #[error("Venue API error {code} ({error_type}): {detail}")]
    Api {
        /// `meta.code`.
        code: i64,
        /// `meta.errorType`.
        error_type: String,
        /// `meta.errorDetail`.
        detail: String,
    },

    /// The payload did not have the expected shape.
    #[error("Malformed venue payload: {message}")]
    Malformed {
        /// Description of what went wrong.
        message: String,
    },
}

/// Parameters of a single category search.
#[derive(Debug, Clone, PartialEq)]
pub struct VenueQuery<'a> {
    /// `"lat,lng"` of the search centre.
    pub ll: &'a str,
    /// Directory category id.
    pub category_id: &'a str,
    /// Search radius in meters.
    pub radius: f64,
    /// Free-text filter, may be empty.
    pub query: &'a str,
    /// Search intent (e.g. `"browse"`).
    pub intent: &'a str,
    /// Maximum venues returned.
    pub limit: u32,
}

/// Search settings shared by every category query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SearchOptions {
    /// Category ids to search, one request each.
    pub categories: Vec<String>,
    /// Free-text filter.
    pub query: String,
    /// Search intent.
    pub intent: String,
    /// Maximum venues per category (the directory caps this at 50).
    pub limit: u32,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            categories: venue_profile_venues_models::DEFAULT_CATEGORY_IDS
                .iter()
                .map(|id| (*id).to_string())
                .collect(),
            query: String::new(),
            intent: "browse".to_string(),
            limit: 50,
        }
    }
}

/// A venue directory: category search and per-venue menus.
///
/// Both methods return the `response` object of the directory envelope.
#[async_trait]
pub trait VenueDirectory: Send + Sync {
    /// Searches for venues of one category around a point.
    ///
    /// # Errors
    ///
    /// Returns [`VenueError`] if the request fails or the directory reports
    /// an error.
    async fn search(&self, query: &VenueQuery<'_>) -> Result<serde_json::Value, VenueError>;

    /// Fetches the menu of one venue.
    ///
    /// # Errors
    ///
    /// Returns [`VenueError`] if the request fails or the directory reports
    /// an error.
    async fn menu(&self, venue_id: &str) -> Result<serde_json::Value, VenueError>;
}
