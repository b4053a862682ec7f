//! Credentials and run configuration.
//!
//! Both are plain TOML. Credentials can also be read from the environment:
//!
//! | Variable                    | Field                      |
//! |-----------------------------|----------------------------|
//! | `FOURSQUARE_CLIENT_ID`      | `foursquare_client_id`     |
//! | `FOURSQUARE_CLIENT_SECRET`  | `foursquare_client_secret` |
//! | `CENSUS_API_KEY` (optional) | `census_api_key`           |

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use venue_profile_radius::{RadiusProfile, RadiusProfileName};
use venue_profile_stats::DEFAULT_CONFIDENCE;
use venue_profile_venues::SearchOptions;
use venue_profile_venues::menus::FlattenOptions;

/// Fixed radius used when none can be derived.
pub const DEFAULT_FALLBACK_RADIUS: f64 = 4250.0;

/// Most venues the directory returns per search.
pub const MAX_SEARCH_LIMIT: u32 = 50;

/// Errors loading credentials or configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for the expected shape.
    #[error("Invalid TOML in {path}: {source}")]
    Toml {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: toml::de::Error,
    },

    /// A required credential is absent.
    #[error("Missing credential: {name}")]
    MissingCredential {
        /// Environment variable or TOML key.
        name: &'static str,
    },

    /// A setting is out of range.
    #[error("Invalid config: {message}")]
    Invalid {
        /// Description of the problem.
        message: String,
    },
}

/// API credentials, passed explicitly to the clients that need them.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    /// Foursquare app client id.
    pub foursquare_client_id: String,
    /// Foursquare app client secret.
    pub foursquare_client_secret: String,
    /// Census API key, optional for low volumes.
    #[serde(default)]
    pub census_api_key: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("foursquare_client_id", &self.foursquare_client_id)
            .field("foursquare_client_secret", &"<redacted>")
            .field(
                "census_api_key",
                &self.census_api_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

impl Credentials {
    /// Reads credentials from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed, or a
    /// Foursquare field is empty.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let credentials: Self = read_toml(path)?;
        credentials.check()?;
        Ok(credentials)
    }

    /// Reads credentials from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCredential`] if a Foursquare variable
    /// is unset or empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds credentials from any variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCredential`] if a Foursquare variable
    /// is unset or empty.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::MissingCredential { name })
        };

        Ok(Self {
            foursquare_client_id: required("FOURSQUARE_CLIENT_ID")?,
            foursquare_client_secret: required("FOURSQUARE_CLIENT_SECRET")?,
            census_api_key: lookup("CENSUS_API_KEY").filter(|v| !v.trim().is_empty()),
        })
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.foursquare_client_id.trim().is_empty() {
            return Err(ConfigError::MissingCredential {
                name: "foursquare_client_id",
            });
        }
        if self.foursquare_client_secret.trim().is_empty() {
            return Err(ConfigError::MissingCredential {
                name: "foursquare_client_secret",
            });
        }
        Ok(())
    }
}

/// Settings for one profile run. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Venue search settings.
    pub search: SearchOptions,
    /// Overrides the directory API version date.
    pub api_version: Option<String>,
    /// Named radius formula.
    pub radius_profile: RadiusProfileName,
    /// Replaces the named profile's constants entirely.
    pub custom_radius: Option<RadiusProfile>,
    /// Radius in meters when it cannot be derived.
    pub fallback_radius: f64,
    /// Locate the address with the fallback geocoder when the Census
    /// geocoder fails.
    pub geocoder_fallback: bool,
    /// Confidence of the Bayesian price intervals.
    pub confidence: f64,
    /// Menu flattening settings.
    pub menus: FlattenOptions,
    /// Where exports are written.
    pub output_dir: PathBuf,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            search: SearchOptions::default(),
            api_version: None,
            radius_profile: RadiusProfileName::default(),
            custom_radius: None,
            fallback_radius: DEFAULT_FALLBACK_RADIUS,
            geocoder_fallback: false,
            confidence: DEFAULT_CONFIDENCE,
            menus: FlattenOptions::default(),
            output_dir: PathBuf::from("."),
        }
    }
}

impl ProfileConfig {
    /// Reads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed, or fails
    /// [`Self::validate`].
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let config: Self = read_toml(path)?;
        config.validate()?;
        Ok(config)
    }

    /// The radius constants to use.
    #[must_use]
    pub fn radius(&self) -> RadiusProfile {
        self.custom_radius
            .unwrap_or_else(|| RadiusProfile::named(self.radius_profile))
    }

    /// Checks that every setting is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: String| Err(ConfigError::Invalid { message });

        if self.search.categories.is_empty() {
            return invalid("search.categories must not be empty".to_string());
        }
        if self.search.limit == 0 || self.search.limit > MAX_SEARCH_LIMIT {
            return invalid(format!(
                "search.limit must be between 1 and {MAX_SEARCH_LIMIT}, got {}",
                self.search.limit
            ));
        }
        let radius = self.radius();
        radius.validate().or_else(|e| invalid(e.to_string()))?;
        if !(radius.min_radius..=radius.max_radius).contains(&self.fallback_radius) {
            return invalid(format!(
                "fallback_radius must be between {} and {} m, got {}",
                radius.min_radius, radius.max_radius, self.fallback_radius
            ));
        }
        if !(self.confidence > 0.0 && self.confidence < 1.0) {
            return invalid(format!(
                "confidence must be strictly between 0 and 1, got {}",
                self.confidence
            ));
        }
        Ok(())
    }
}

fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::de::from_str(&text).map_err(|source| ConfigError::Toml {
        path: path.to_path_buf(),
        source,
    })
}
