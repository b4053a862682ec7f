//! Category searches around a search centre and venue row extraction.

use std::collections::BTreeMap;

use venue_profile_tract_models::{Coordinates, SearchRadius};
use venue_profile_venues_models::Venue;

use crate::{SearchOptions, VenueDirectory, VenueError, VenueQuery};

/// Raw search responses keyed by category id.
pub type RawVenues = BTreeMap<String, serde_json::Value>;

/// Runs one search per configured category, in order.
///
/// # Errors
///
/// Returns the first [`VenueError`] raised by the directory. A failed
/// category search aborts the whole search.
pub async fn search_venues(
    directory: &dyn VenueDirectory,
    center: &Coordinates,
    radius: SearchRadius,
    options: &SearchOptions,
) -> Result<RawVenues, VenueError> {
    let ll = center.lat_lng();
    let mut responses = RawVenues::new();

    for category_id in &options.categories {
        let query = VenueQuery {
            ll: &ll,
            category_id,
            radius: radius.meters(),
            query: &options.query,
            intent: &options.intent,
            limit: options.limit,
        };
        let response = directory.search(&query).await?;
        let count = response["venues"].as_array().map_or(0, Vec::len);
        log::info!("Category {category_id}: {count} venues");
        responses.insert(category_id.clone(), response);
    }

    Ok(responses)
}

/// Flattens raw search responses into one [`Venue`] per listing.
///
/// A venue found by two category searches yields two rows.
///
/// # Errors
///
/// Returns [`VenueError::Malformed`] if a response has no `venues` array
/// or a venue lacks its `id` or `name`.
pub fn venue_rows(raw: &RawVenues) -> Result<Vec<Venue>, VenueError> {
    let mut rows = Vec::new();
    for (category_id, response) in raw {
        let venues = response["venues"]
            .as_array()
            .ok_or_else(|| VenueError::Malformed {
                message: format!("Missing venues array for category {category_id}"),
            })?;
        for venue in venues {
            rows.push(parse_venue(category_id, venue)?);
        }
    }
    Ok(rows)
}

fn parse_venue(category_id: &str, venue: &serde_json::Value) -> Result<Venue, VenueError> {
    let required = |field: &str| {
        venue[field]
            .as_str()
            .map(ToString::to_string)
            .ok_or_else(|| VenueError::Malformed {
                message: format!("Venue without {field} in category {category_id}"),
            })
    };

    let location = &venue["location"];
    let categories = venue["categories"].as_array();
    let category_name = categories
        .and_then(|c| {
            c.iter()
                .find(|cat| cat["primary"].as_bool() == Some(true))
                .or_else(|| c.first())
        })
        .and_then(|cat| cat["name"].as_str())
        .map(ToString::to_string);

    Ok(Venue {
        id: required("id")?,
        venue_name: required("name")?,
        category_id: category_id.to_string(),
        category_name,
        venue_address: location["address"].as_str().map(ToString::to_string),
        venue_lat: location["lat"].as_f64(),
        venue_lng: location["lng"].as_f64(),
    })
}
