//! Foursquare Places API (v2) client.
//!
//! - Search: `GET /venues/search`
//! - Menu: `GET /venues/{id}/menu`
//!
//! Every response is wrapped in a `{"meta": {...}, "response": {...}}`
//! envelope; a `meta.code` other than 200 is turned into
//! [`VenueError::Api`].

use async_trait::async_trait;
use serde::Deserialize;

use crate::{VenueDirectory, VenueError, VenueQuery};

/// Foursquare endpoint configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FoursquareService {
    /// Unique identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// API base URL (e.g. `"https://api.foursquare.com/v2"`).
    pub base_url: String,
    /// Version date sent as the `v` parameter.
    pub version: String,
}

impl FoursquareService {
    /// The configuration embedded from `services/foursquare.toml`.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed (this is a compile-time
    /// guarantee since the file is embedded).
    #[must_use]
    pub fn embedded() -> Self {
        toml::de::from_str(include_str!("../services/foursquare.toml"))
            .unwrap_or_else(|e| panic!("Failed to parse embedded Foursquare config: {e}"))
    }
}

/// Userless-auth Foursquare client.
#[derive(Debug, Clone)]
pub struct FoursquareClient {
    client: reqwest::Client,
    service: FoursquareService,
    client_id: String,
    client_secret: String,
}

impl FoursquareClient {
    /// Creates a client authenticating with an app id/secret pair.
    #[must_use]
    pub const fn new(
        client: reqwest::Client,
        service: FoursquareService,
        client_id: String,
        client_secret: String,
    ) -> Self {
        Self {
            client,
            service,
            client_id,
            client_secret,
        }
    }

    fn auth(&self) -> [(&'static str, &str); 3] {
        [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("v", self.service.version.as_str()),
        ]
    }

    async fn get(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<serde_json::Value, VenueError> {
        let url = format!("{}{path}", self.service.base_url);
        let body: serde_json::Value = self
            .client
            .get(&url)
            .query(&self.auth())
            .query(params)
            .send()
            .await?
            .json()
            .await?;
        unwrap_envelope(body)
    }
}

#[async_trait]
impl VenueDirectory for FoursquareClient {
    async fn search(&self, query: &VenueQuery<'_>) -> Result<serde_json::Value, VenueError> {
        log::debug!(
            "Searching category {} within {:.0} m of {}",
            query.category_id,
            query.radius,
            query.ll
        );
        let params = [
            ("ll", query.ll.to_string()),
            ("categoryId", query.category_id.to_string()),
            ("radius", format!("{:.0}", query.radius)),
            ("intent", query.intent.to_string()),
            ("limit", query.limit.to_string()),
            ("query", query.query.to_string()),
        ];
        self.get("/venues/search", &params).await
    }

    async fn menu(&self, venue_id: &str) -> Result<serde_json::Value, VenueError> {
        self.get(&format!("/venues/{venue_id}/menu"), &[]).await
    }
}

/// Checks `meta.code` and returns the `response` object.
///
/// Foursquare reports errors inside a 4xx body, so the HTTP status is not
/// checked separately.
fn unwrap_envelope(mut body: serde_json::Value) -> Result<serde_json::Value, VenueError> {
    let code = body["meta"]["code"]
        .as_i64()
        .ok_or_else(|| VenueError::Malformed {
            message: "Missing meta.code".to_string(),
        })?;

    if code != 200 {
        let meta = &body["meta"];
        return Err(VenueError::Api {
            code,
            error_type: meta["errorType"].as_str().unwrap_or("unknown").to_string(),
            detail: meta["errorDetail"].as_str().unwrap_or("").to_string(),
        });
    }

    match body.get_mut("response") {
        Some(response) if response.is_object() => Ok(response.take()),
        _ => Err(VenueError::Malformed {
            message: "Missing response object".to_string(),
        }),
    }
}
