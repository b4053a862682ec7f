//! US Census Bureau Geocoder client (geographies).
//!
//! Resolves a one-line address to its census tract via
//! `GET /geographies/onelineaddress`, reading the tract identifiers, land
//! area, and population from the tract layer of the first match.
//!
//! API reference: <https://geocoding.geo.census.gov/geocoder/Geocoding_Services_API.html>

use async_trait::async_trait;
use venue_profile_tract_models::{Coordinates, ResolvedAddress, TractLocation};

use crate::{
    ResolutionError, TractGeocoder,
    service_registry::{GeocodingService, ProviderConfig},
};

/// Census geographies client for a fixed benchmark/vintage pair.
#[derive(Debug, Clone)]
pub struct CensusGeocoder {
    client: reqwest::Client,
    base_url: String,
    benchmark: String,
    vintage: String,
    layers: String,
    tract_layer: String,
    api_key: Option<String>,
}

impl CensusGeocoder {
    /// Builds a client from a Census service definition.
    ///
    /// Returns `None` if `service` is not a Census provider.
    #[must_use]
    pub fn from_service(
        client: reqwest::Client,
        service: &GeocodingService,
        api_key: Option<String>,
    ) -> Option<Self> {
        let ProviderConfig::Census {
            base_url,
            benchmark,
            vintage,
            layers,
            tract_layer,
        } = &service.provider
        else {
            return None;
        };

        Some(Self {
            client,
            base_url: base_url.clone(),
            benchmark: benchmark.clone(),
            vintage: vintage.clone(),
            layers: layers.clone(),
            tract_layer: tract_layer.clone(),
            api_key,
        })
    }
}

#[async_trait]
impl TractGeocoder for CensusGeocoder {
    async fn resolve(&self, address: &str) -> Result<ResolvedAddress, ResolutionError> {
        let url = format!("{}/geographies/onelineaddress", self.base_url);

        let mut query = vec![
            ("address", address),
            ("benchmark", self.benchmark.as_str()),
            ("vintage", self.vintage.as_str()),
            ("layers", self.layers.as_str()),
            ("format", "json"),
        ];
        if let Some(key) = &self.api_key {
            query.push(("key", key.as_str()));
        }

        log::debug!(
            "Resolving \"{address}\" against Census geographies ({}/{})",
            self.benchmark,
            self.vintage
        );

        let resp = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await?
            .error_for_status()?;
        let body: serde_json::Value = resp.json().await?;

        let resolved = parse_geographies_response(&body, &self.tract_layer, address)?;
        log::info!(
            "Resolved \"{address}\" to tract {} (population {}, land area {} m²)",
            resolved.tract.geoid(),
            resolved.tract.population,
            resolved.tract.land_area
        );
        Ok(resolved)
    }
}

/// Parses the JSON response from the geographies endpoint.
///
/// Census returns `STATE`/`COUNTY`/`TRACT` as strings, but `AREALAND` and
/// `POP100` have been seen both as numbers and as numeric strings across
/// vintages, so both forms are accepted.
fn parse_geographies_response(
    body: &serde_json::Value,
    tract_layer: &str,
    address: &str,
) -> Result<ResolvedAddress, ResolutionError> {
    let Some(matches) = body["result"]["addressMatches"].as_array() else {
        return Err(ResolutionError::Parse {
            message: "response has no result.addressMatches".to_string(),
        });
    };
    let Some(first) = matches.first() else {
        return Err(ResolutionError::NoMatch {
            address: address.to_string(),
        });
    };

    let point = &first["coordinates"];
    let (Some(x), Some(y)) = (point["x"].as_f64(), point["y"].as_f64()) else {
        return Err(ResolutionError::Parse {
            message: format!("match has unusable coordinates: {point}"),
        });
    };

    let tract = first["geographies"][tract_layer]
        .as_array()
        .and_then(|layer| layer.first())
        .ok_or_else(|| ResolutionError::Parse {
            message: format!("Match has no \"{tract_layer}\" geography"),
        })?;

    let state_id = required_code(tract, "STATE")?;
    let county_id = required_code(tract, "COUNTY")?;
    let tract_id = required_code(tract, "TRACT")?;

    let land_area = number_field(&tract["AREALAND"])
        .filter(|v| *v >= 0.0)
        .ok_or(ResolutionError::MissingField { field: "AREALAND" })?;
    let population = count_field(&tract["POP100"])
        .ok_or(ResolutionError::MissingField { field: "POP100" })?;

    Ok(ResolvedAddress {
        matched_address: first["matchedAddress"].as_str().map(String::from),
        coordinates: Coordinates {
            latitude: y,
            longitude: x,
        },
        tract: TractLocation {
            state_id,
            county_id,
            tract_id,
            land_area,
            population,
        },
    })
}

/// Reads a non-empty FIPS-style code.
fn required_code(
    tract: &serde_json::Value,
    field: &'static str,
) -> Result<String, ResolutionError> {
    tract[field]
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .ok_or(ResolutionError::MissingField { field })
}

fn number_field(value: &serde_json::Value) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.as_str()?.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn count_field(value: &serde_json::Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_str()?.trim().parse::<u64>().ok())
}
