//! GeoJSON map data: the search point plus one marker per venue.
//!
//! Marker properties follow the simplestyle convention (`marker-color`,
//! `marker-symbol`) so that common viewers style them without extra work.

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use venue_profile_tract_models::Coordinates;
use venue_profile_venues_models::Venue;

use crate::profile::VenueProfile;

/// Builds the map features for a profile.
///
/// Venues without coordinates are left off the map.
#[must_use]
pub fn venue_map(profile: &VenueProfile) -> FeatureCollection {
    let area = &profile.search_area;
    let search_label = area
        .matched_address
        .clone()
        .unwrap_or_else(|| profile.address.clone());

    let mut features = vec![search_point(&area.center, &search_label, area.radius.meters())];
    features.extend(profile.tables.venues.iter().filter_map(venue_marker));

    let skipped = profile.tables.venues.len() + 1 - features.len();
    if skipped > 0 {
        log::debug!("{skipped} venues without coordinates left off the map");
    }

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

fn point(latitude: f64, longitude: f64) -> Option<Geometry> {
    Some(Geometry::new(Value::Point(vec![longitude, latitude])))
}

fn search_point(center: &Coordinates, label: &str, radius: f64) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("kind".to_string(), "search".into());
    properties.insert("popup".to_string(), label.into());
    properties.insert("tooltip".to_string(), label.into());
    properties.insert("radius".to_string(), radius.into());

    Feature {
        bbox: None,
        geometry: point(center.latitude, center.longitude),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

fn venue_marker(venue: &Venue) -> Option<Feature> {
    let (lat, lng) = venue.venue_lat.zip(venue.venue_lng)?;
    let category = venue.category();
    let marker = category.marker();

    let mut properties = JsonObject::new();
    properties.insert("kind".to_string(), "venue".into());
    properties.insert("tooltip".to_string(), venue.venue_name.clone().into());
    properties.insert(
        "popup".to_string(),
        venue
            .category_name
            .clone()
            .unwrap_or_else(|| category.to_string())
            .into(),
    );
    properties.insert("category".to_string(), category.as_ref().into());
    properties.insert("marker-color".to_string(), marker.color.into());
    properties.insert("marker-symbol".to_string(), marker.icon.into());

    Some(Feature {
        bbox: None,
        geometry: point(lat, lng),
        id: Some(geojson::feature::Id::String(venue.id.clone())),
        properties: Some(properties),
        foreign_members: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::builder;

    #[tokio::test]
    async fn marks_search_point_and_venues() {
        let profile = builder().build("1201 24th St NW").await.unwrap();
        let map = venue_map(&profile);

        assert_eq!(map.features.len(), profile.tables.venues.len() + 1);

        let search = &map.features[0];
        assert_eq!(search.property("kind").unwrap(), "search");
        assert_eq!(
            search.property("popup").unwrap(),
            "1201 24TH ST NW, WASHINGTON, DC, 20037"
        );
    }

    #[tokio::test]
    async fn markers_are_styled_by_category() {
        let profile = builder().build("addr").await.unwrap();
        let map = venue_map(&profile);

        let night_owl = map
            .features
            .iter()
            .find(|f| f.property("tooltip").and_then(|v| v.as_str()) == Some("Night Owl"))
            .unwrap();
        assert_eq!(night_owl.property("marker-color").unwrap(), "blue");
        assert_eq!(night_owl.property("marker-symbol").unwrap(), "glyphicon-glass");
        assert_eq!(night_owl.property("popup").unwrap(), "Cocktail Bar");

        let deli = map
            .features
            .iter()
            .find(|f| f.property("tooltip").and_then(|v| v.as_str()) == Some("Dupont Deli"))
            .unwrap();
        assert_eq!(deli.property("marker-color").unwrap(), "red");
        assert_eq!(deli.property("category").unwrap(), "FOOD");
    }

    #[tokio::test]
    async fn coordinates_are_lng_lat() {
        let profile = builder().build("addr").await.unwrap();
        let map = venue_map(&profile);

        let Some(Value::Point(position)) = map.features[0].geometry.as_ref().map(|g| &g.value)
        else {
            panic!("search point should be a Point");
        };
        assert!((position[0] - -77.0509).abs() < 1e-9);
        assert!((position[1] - 38.9055).abs() < 1e-9);
    }

    #[tokio::test]
    async fn venues_without_coordinates_are_skipped() {
        let mut profile = builder().build("addr").await.unwrap();
        profile.tables.venues[0].venue_lat = None;
        let map = venue_map(&profile);
        assert_eq!(map.features.len(), profile.tables.venues.len());
    }
}
