//! Geocoder endpoints, embedded from `services/*.toml`.
//!
//! The files are compiled into the binary and parsed once, on first use.
//! [`service`] looks one up by id; [`all_services`] lists them in the order
//! a caller should try them.

use std::sync::LazyLock;

use serde::Deserialize;

/// One geocoder endpoint definition.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingService {
    /// Registry key, `"census"` or `"nominatim"`.
    pub id: String,
    /// Display name for logs.
    pub name: String,
    /// Lower is tried first.
    pub priority: u32,
    /// Endpoint settings for the provider.
    pub provider: ProviderConfig,
}

/// Endpoint settings, selected by the `type` key of `[provider]`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Census Bureau geographies lookup.
    Census {
        /// Root of the geocoder API, without the `/geographies` path.
        base_url: String,
        /// Address benchmark, e.g. `Public_AR_Current`.
        benchmark: String,
        /// Geography vintage; must match the ACS year's tract numbering.
        vintage: String,
        /// Layer ids sent as `layers`.
        layers: String,
        /// Name of the tract layer under `geographies` in the response.
        tract_layer: String,
    },
    /// Nominatim free-form search.
    Nominatim {
        /// Full search endpoint URL.
        base_url: String,
        /// Value for `countrycodes`.
        country_code: String,
    },
}

impl GeocodingService {
    /// Endpoint URL of either provider.
    #[must_use]
    pub fn base_url(&self) -> &str {
        match &self.provider {
            ProviderConfig::Census { base_url, .. } | ProviderConfig::Nominatim { base_url, .. } => {
                base_url
            }
        }
    }
}

const EMBEDDED: [(&str, &str); 2] = [
    ("census.toml", include_str!("../services/census.toml")),
    ("nominatim.toml", include_str!("../services/nominatim.toml")),
];

static SERVICES: LazyLock<Vec<GeocodingService>> = LazyLock::new(|| {
    let mut services: Vec<GeocodingService> = EMBEDDED
        .iter()
        .map(|(file, contents)| {
            toml::de::from_str(contents)
                .unwrap_or_else(|e| panic!("services/{file} is not a valid service definition: {e}"))
        })
        .collect();
    services.sort_by_key(|s| s.priority);
    services
});

/// Every embedded service, lowest priority value first.
///
/// # Panics
///
/// Panics on first use if an embedded file does not parse.
#[must_use]
pub fn all_services() -> Vec<GeocodingService> {
    SERVICES.clone()
}

/// The service registered under `id`, if any.
///
/// # Panics
///
/// Panics on first use if an embedded file does not parse.
#[must_use]
pub fn service(id: &str) -> Option<GeocodingService> {
    SERVICES.iter().find(|s| s.id == id).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::census::CensusGeocoder;
    use crate::nominatim::NominatimGeocoder;

    #[test]
    fn every_embedded_file_parses() {
        assert_eq!(all_services().len(), EMBEDDED.len());
    }

    #[test]
    fn census_is_tried_first() {
        let ids: Vec<String> = all_services().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, ["census", "nominatim"]);
    }

    #[test]
    fn definitions_are_complete() {
        for svc in all_services() {
            assert!(!svc.name.is_empty(), "{} has no name", svc.id);
            assert!(svc.base_url().starts_with("https://"), "{} base_url", svc.id);
        }
        let Some(ProviderConfig::Census { tract_layer, .. }) =
            service("census").map(|s| s.provider)
        else {
            panic!("census service missing");
        };
        assert_eq!(tract_layer, "Census Tracts");
    }

    #[test]
    fn unknown_id_is_none() {
        assert!(service("pelias").is_none());
    }

    #[test]
    fn clients_only_accept_their_own_provider() {
        let client = reqwest::Client::new();
        let census = service("census").unwrap();
        let nominatim = service("nominatim").unwrap();
        assert!(CensusGeocoder::from_service(client.clone(), &census, None).is_some());
        assert!(CensusGeocoder::from_service(client.clone(), &nominatim, None).is_none());
        assert!(NominatimGeocoder::from_service(client.clone(), &nominatim).is_some());
        assert!(NominatimGeocoder::from_service(client, &census).is_none());
    }
}
