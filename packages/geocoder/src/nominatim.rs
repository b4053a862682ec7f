//! Point-only geocoding through Nominatim (OpenStreetMap).
//!
//! Locates addresses the Census geocoder cannot resolve.
//! Nominatim knows nothing about census tracts, so its results never feed
//! the radius derivation.
//!
//! API reference: <https://nominatim.org/release-docs/develop/api/Search/>

use async_trait::async_trait;
use venue_profile_tract_models::Coordinates;

use crate::{
    GeocodedPoint, GeocodingProvider, PointGeocoder, ResolutionError,
    service_registry::{GeocodingService, ProviderConfig},
};

/// Nominatim free-form search client.
///
/// The public instance requires an identifying `User-Agent`; configure it
/// on the `reqwest::Client` passed in.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
    country_code: String,
}

impl NominatimGeocoder {
    /// Builds a client from a Nominatim service definition.
    ///
    /// Returns `None` if `service` is not a Nominatim provider.
    #[must_use]
    pub fn from_service(client: reqwest::Client, service: &GeocodingService) -> Option<Self> {
        let ProviderConfig::Nominatim {
            base_url,
            country_code,
        } = &service.provider
        else {
            return None;
        };

        Some(Self {
            client,
            base_url: base_url.clone(),
            country_code: country_code.clone(),
        })
    }
}

#[async_trait]
impl PointGeocoder for NominatimGeocoder {
    async fn locate(&self, address: &str) -> Result<Option<GeocodedPoint>, ResolutionError> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", address),
                ("countrycodes", self.country_code.as_str()),
                ("format", "jsonv2"),
                ("limit", "1"),
            ])
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ResolutionError::RateLimited);
        }

        let body: serde_json::Value = resp.error_for_status()?.json().await?;
        parse_response(&body)
    }
}

/// Reads the first hit of a `jsonv2` result array.
///
/// Nominatim encodes coordinates as decimal strings.
fn parse_response(body: &serde_json::Value) -> Result<Option<GeocodedPoint>, ResolutionError> {
    let hit = match body.as_array() {
        Some(hits) => hits.first(),
        None => {
            return Err(ResolutionError::Parse {
                message: format!("expected a result array, got {body}"),
            });
        }
    };
    let Some(hit) = hit else {
        return Ok(None);
    };

    let coordinates = Coordinates {
        latitude: decimal(hit, "lat")?,
        longitude: decimal(hit, "lon")?,
    };

    Ok(Some(GeocodedPoint {
        coordinates,
        display_name: hit["display_name"].as_str().map(ToString::to_string),
        provider: GeocodingProvider::Nominatim,
    }))
}

fn decimal(hit: &serde_json::Value, key: &str) -> Result<f64, ResolutionError> {
    hit[key]
        .as_str()
        .and_then(|raw| raw.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .ok_or_else(|| ResolutionError::Parse {
            message: format!("Nominatim hit has no usable \"{key}\""),
        })
}
