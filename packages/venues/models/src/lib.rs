#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Venue and menu item row types.
//!
//! Flat, serializable rows extracted from venue directory payloads. Every
//! field the directory may omit is an `Option`.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Foursquare top-level category id for nightlife spots.
pub const NIGHTLIFE_CATEGORY_ID: &str = "4d4b7105d754a06376d81259";

/// Foursquare top-level category id for food.
pub const FOOD_CATEGORY_ID: &str = "4d4b7105d754a06374d81259";

/// Categories searched when none are configured.
pub const DEFAULT_CATEGORY_IDS: &[&str] = &[NIGHTLIFE_CATEGORY_ID, FOOD_CATEGORY_ID];

/// Broad venue category, used to pick a map marker.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum VenueCategory {
    /// Bars, clubs, lounges.
    Nightlife,
    /// Restaurants and other food.
    Food,
    /// Anything else.
    Other,
}

impl VenueCategory {
    /// Classifies a directory category id.
    #[must_use]
    pub fn from_category_id(id: &str) -> Self {
        match id {
            NIGHTLIFE_CATEGORY_ID => Self::Nightlife,
            FOOD_CATEGORY_ID => Self::Food,
            _ => Self::Other,
        }
    }

    /// Marker icon and color for this category.
    #[must_use]
    pub const fn marker(self) -> MarkerStyle {
        match self {
            Self::Nightlife => MarkerStyle {
                icon: "glyphicon-glass",
                color: "blue",
            },
            Self::Food => MarkerStyle {
                icon: "glyphicon-cutlery",
                color: "red",
            },
            Self::Other => MarkerStyle {
                icon: "glyphicon-map-marker",
                color: "orange",
            },
        }
    }
}

/// How a venue is drawn on a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerStyle {
    /// Icon name.
    pub icon: &'static str,
    /// Marker color.
    pub color: &'static str,
}

/// One venue found by a category search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    /// Directory venue id.
    pub id: String,
    /// Venue name.
    pub venue_name: String,
    /// Category id of the search that returned this venue.
    pub category_id: String,
    /// Name of the venue's primary category (e.g. "Wine Bar").
    pub category_name: Option<String>,
    /// Street address.
    pub venue_address: Option<String>,
    /// Latitude.
    pub venue_lat: Option<f64>,
    /// Longitude.
    pub venue_lng: Option<f64>,
}

impl Venue {
    /// Broad category of the search that found this venue.
    #[must_use]
    pub fn category(&self) -> VenueCategory {
        VenueCategory::from_category_id(&self.category_id)
    }
}

/// One priced (or unpriced) line on a venue menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    /// Venue the menu belongs to.
    pub venue_name: String,
    /// Menu name (e.g. "Dinner").
    pub menu_name: String,
    /// Section name within the menu (e.g. "Appetizers").
    pub section_name: String,
    /// Item name.
    pub item_name: Option<String>,
    /// Item description.
    pub item_desc: Option<String>,
    /// Item price in dollars.
    pub item_price: Option<f64>,
}

impl MenuItem {
    /// Whether every optional field is present.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.item_name.is_some() && self.item_desc.is_some() && self.item_price.is_some()
    }
}
