//! In-memory collaborators shared by the crate's tests.

use async_trait::async_trait;
use venue_profile_census::{DataUnavailableError, IncomeAggregator, IncomeStatistics};
use venue_profile_geocoder::{
    GeocodedPoint, GeocodingProvider, PointGeocoder, ResolutionError, TractGeocoder,
};
use venue_profile_radius::{RadiusCalculator, RadiusProfile, RadiusProfileName};
use venue_profile_tract_models::{
    BRACKET_COUNT, Coordinates, IncomeBracketCounts, ResolvedAddress, SearchRadius, TractLocation,
};
use venue_profile_venues::{VenueDirectory, VenueError, VenueQuery};
use venue_profile_venues_models::{FOOD_CATEGORY_ID, NIGHTLIFE_CATEGORY_ID};

use crate::pipeline::RadiusPipeline;
use crate::profile::ProfileBuilder;

pub struct FixedGeocoder(pub Option<ResolvedAddress>);

#[async_trait]
impl TractGeocoder for FixedGeocoder {
    async fn resolve(&self, address: &str) -> Result<ResolvedAddress, ResolutionError> {
        self.0.clone().ok_or_else(|| ResolutionError::NoMatch {
            address: address.to_string(),
        })
    }
}

pub struct FixedCounts(pub [u64; BRACKET_COUNT]);

#[async_trait]
impl IncomeStatistics for FixedCounts {
    async fn bracket_counts(
        &self,
        _tract: &TractLocation,
    ) -> Result<IncomeBracketCounts, DataUnavailableError> {
        Ok(IncomeBracketCounts::new(self.0))
    }
}

pub struct MissingCounts;

#[async_trait]
impl IncomeStatistics for MissingCounts {
    async fn bracket_counts(
        &self,
        tract: &TractLocation,
    ) -> Result<IncomeBracketCounts, DataUnavailableError> {
        Err(DataUnavailableError::NotFound {
            geoid: tract.geoid(),
        })
    }
}

pub struct FixedPoint(pub Option<Coordinates>);

#[async_trait]
impl PointGeocoder for FixedPoint {
    async fn locate(&self, _address: &str) -> Result<Option<GeocodedPoint>, ResolutionError> {
        Ok(self.0.map(|coordinates| GeocodedPoint {
            coordinates,
            display_name: Some("Somewhere, USA".to_string()),
            provider: GeocodingProvider::Nominatim,
        }))
    }
}

/// Serves one bar, two restaurants (one of them also listed as nightlife)
/// and a venue whose menu lookup fails.
pub struct FakeDirectory;

#[async_trait]
impl VenueDirectory for FakeDirectory {
    async fn search(&self, query: &VenueQuery<'_>) -> Result<serde_json::Value, VenueError> {
        let venues = match query.category_id {
            NIGHTLIFE_CATEGORY_ID => serde_json::json!([
                venue("bar1", "Night Owl", "Cocktail Bar", 38.91, -77.04),
                venue("rest1", "Blue Duck Tavern", "American Restaurant", 38.9055, -77.0509),
            ]),
            FOOD_CATEGORY_ID => serde_json::json!([
                venue("rest1", "Blue Duck Tavern", "American Restaurant", 38.9055, -77.0509),
                venue("rest2", "Dupont Deli", "Deli", 38.909, -77.043),
                venue("gone", "Closed Diner", "Diner", 38.92, -77.05),
            ]),
            _ => serde_json::json!([]),
        };
        Ok(serde_json::json!({ "venues": venues }))
    }

    async fn menu(&self, venue_id: &str) -> Result<serde_json::Value, VenueError> {
        let prices: &[f64] = match venue_id {
            "bar1" => &[12.0, 14.0],
            "rest1" => &[8.5, 4.0, 12.0],
            "rest2" => &[15.5, 9.0, 22.0, 6.5],
            _ => {
                return Err(VenueError::Api {
                    code: 404,
                    error_type: "not_found".to_string(),
                    detail: format!("Venue {venue_id} has no menu"),
                });
            }
        };
        Ok(menu_payload(prices))
    }
}

/// A `venues/{id}/menu` response with one menu and one section.
pub fn menu_payload(prices: &[f64]) -> serde_json::Value {
    let items: Vec<serde_json::Value> = prices
        .iter()
        .enumerate()
        .map(|(i, p)| {
            serde_json::json!({
                "name": format!("Item {i}"),
                "description": "House special",
                "price": format!("{p:.2}"),
            })
        })
        .collect();
    serde_json::json!({
        "menu": { "menus": { "count": 1, "items": [{
            "name": "Main Menu",
            "entries": { "count": 1, "items": [{
                "name": "Plates",
                "entries": { "count": items.len(), "items": items }
            }]}
        }]}}
    })
}

fn venue(id: &str, name: &str, category: &str, lat: f64, lng: f64) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "location": { "address": "1 Test St", "lat": lat, "lng": lng },
        "categories": [{ "name": category, "primary": true }]
    })
}

pub fn resolved(population: u64) -> ResolvedAddress {
    ResolvedAddress {
        matched_address: Some("1201 24TH ST NW, WASHINGTON, DC, 20037".to_string()),
        coordinates: Coordinates {
            latitude: 38.9055,
            longitude: -77.0509,
        },
        tract: TractLocation {
            state_id: "11".to_string(),
            county_id: "001".to_string(),
            tract_id: "005602".to_string(),
            land_area: 2_000_000.0,
            population,
        },
    }
}

pub fn pipeline(
    resolved: Option<ResolvedAddress>,
    source: Box<dyn IncomeStatistics>,
    profile: RadiusProfileName,
) -> RadiusPipeline {
    RadiusPipeline::new(
        Box::new(FixedGeocoder(resolved)),
        IncomeAggregator::new(source),
        RadiusCalculator::new(RadiusProfile::named(profile)).unwrap(),
        SearchRadius::fixed(4250.0),
    )
}

/// A builder over a 4000-resident tract and [`FakeDirectory`].
pub fn builder() -> ProfileBuilder {
    let mut counts = [0; BRACKET_COUNT];
    counts[3] = 120;
    counts[9] = 340;
    counts[14] = 75;
    ProfileBuilder::new(
        pipeline(
            Some(resolved(4000)),
            Box::new(FixedCounts(counts)),
            RadiusProfileName::TauSquareRoot,
        ),
        Box::new(FakeDirectory),
    )
}
