//! Menu retrieval and flattening into [`MenuItem`] rows.
//!
//! Menus are fetched once per distinct venue id and keyed by venue name.
//! A venue whose menu cannot be fetched is recorded as a [`MenuFailure`]
//! and the remaining venues are still queried.
//!
//! The menu payload nests three levels deep:
//!
//! ```text
//! menu.menus.items[]            menus ("Dinner")
//!   .entries.items[]            sections ("Appetizers")
//!     .entries.items[]          items {name, description, price}
//! ```

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use venue_profile_venues_models::{MenuItem, Venue};

use crate::progress::ProgressCallback;
use crate::{VenueDirectory, VenueError};

/// Raw menu responses keyed by venue name.
pub type RawMenus = BTreeMap<String, serde_json::Value>;

/// A venue whose menu could not be retrieved.
#[derive(Debug)]
pub struct MenuFailure {
    /// Directory venue id.
    pub venue_id: String,
    /// Venue name.
    pub venue_name: String,
    /// Why the lookup failed.
    pub error: VenueError,
}

/// Result of fetching menus for a set of venues.
#[derive(Debug, Default)]
pub struct MenuFetch {
    /// Successful responses keyed by venue name.
    pub menus: RawMenus,
    /// Venues whose lookup failed.
    pub failures: Vec<MenuFailure>,
}

/// Fetches the menu of every distinct venue, sequentially.
pub async fn fetch_menus(
    directory: &dyn VenueDirectory,
    venues: &[Venue],
    progress: &dyn ProgressCallback,
) -> MenuFetch {
    let mut seen = BTreeSet::new();
    let unique: Vec<&Venue> = venues
        .iter()
        .filter(|v| seen.insert(v.id.as_str()))
        .collect();

    progress.set_total(unique.len() as u64);
    let mut fetch = MenuFetch::default();

    for venue in unique {
        progress.set_message(venue.venue_name.clone());
        match directory.menu(&venue.id).await {
            Ok(response) => {
                if fetch
                    .menus
                    .insert(venue.venue_name.clone(), response)
                    .is_some()
                {
                    log::debug!(
                        "Menu for {} ({}) replaces an earlier venue of the same name",
                        venue.venue_name,
                        venue.id
                    );
                }
            }
            Err(error) => {
                log::warn!(
                    "Menu lookup failed for {} ({}): {error}",
                    venue.venue_name,
                    venue.id
                );
                fetch.failures.push(MenuFailure {
                    venue_id: venue.id.clone(),
                    venue_name: venue.venue_name.clone(),
                    error,
                });
            }
        }
        progress.inc(1);
    }

    progress.finish(format!(
        "{} menus fetched, {} failed",
        fetch.menus.len(),
        fetch.failures.len()
    ));
    fetch
}

/// Options for flattening menus into rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlattenOptions {
    /// Drop rows with any missing field.
    pub drop_na: bool,
    /// Keep at most this many rows, counted before `drop_na` is applied.
    pub iter_limit: Option<usize>,
}

/// Flattens raw menus into one [`MenuItem`] per menu entry.
///
/// Venues, menus and sections with no entries contribute nothing. Missing
/// item fields become `None`, as does a price that is neither a number
/// nor a numeric string.
#[must_use]
pub fn menu_items(menus: &RawMenus, options: FlattenOptions) -> Vec<MenuItem> {
    let rows = menus.iter().flat_map(|(venue_name, response)| {
        entries(&response["menu"]["menus"]).flat_map(move |menu| {
            let menu_name = text(&menu["name"]).unwrap_or_default();
            entries(&menu["entries"]).flat_map(move |section| {
                let section_name = text(&section["name"]).unwrap_or_default();
                let menu_name = menu_name.clone();
                entries(&section["entries"]).map(move |item| MenuItem {
                    venue_name: venue_name.clone(),
                    menu_name: menu_name.clone(),
                    section_name: section_name.clone(),
                    item_name: text(&item["name"]),
                    item_desc: text(&item["description"]),
                    item_price: price(&item["price"]),
                })
            })
        })
    });

    rows.take(options.iter_limit.unwrap_or(usize::MAX))
        .filter(|item| !options.drop_na || item.is_complete())
        .collect()
}

/// Iterates `container.items[]`, or nothing if absent.
fn entries(container: &serde_json::Value) -> impl Iterator<Item = &serde_json::Value> {
    container["items"].as_array().into_iter().flatten()
}

fn text(value: &serde_json::Value) -> Option<String> {
    value.as_str().map(ToString::to_string)
}

fn price(value: &serde_json::Value) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.as_str()?.trim().parse::<f64>().ok())
        .filter(|p| p.is_finite())
}
