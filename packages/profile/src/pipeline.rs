//! Address to search area: tract resolution, income aggregation, radius.
//!
//! [`RadiusPipeline::derive`] runs the three stages strictly and returns
//! the first error. [`RadiusPipeline::search_area`] adds the two recovery
//! paths: a zero-population tract gets the fixed fallback radius, and (when
//! a point geocoder is configured) an unresolvable address is located by
//! the fallback geocoder and also gets the fixed radius.

use serde::{Deserialize, Serialize};
use venue_profile_census::{AggregateError, IncomeAggregator};
use venue_profile_geocoder::{PointGeocoder, ResolutionError, TractGeocoder};
use venue_profile_radius::{RadiusCalculator, RadiusError};
use venue_profile_tract_models::{
    AverageIncomeEstimate, Coordinates, IncomeBracketCounts, ResolvedAddress, SearchRadius,
    TractLocation,
};

use crate::ProfileError;

/// Everything computed on the way to a derived radius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Derivation {
    /// Tract the address resolved to.
    pub tract: TractLocation,
    /// Household counts per bracket.
    pub counts: IncomeBracketCounts,
    /// Weighted average income per resident.
    pub average_income: AverageIncomeEstimate,
}

/// How the search radius was obtained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RadiusOrigin {
    /// Computed from the tract's density and income.
    Derived,
    /// The tract has no residents; the fixed radius was used.
    ZeroPopulation {
        /// GEOID of the tract.
        geoid: String,
    },
    /// The Census geocoder failed; the fallback geocoder supplied the
    /// centre and the fixed radius was used.
    GeocoderFallback {
        /// Why the Census geocoder failed.
        reason: String,
    },
}

/// Centre and radius of the venue search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchArea {
    /// Address as matched by the geocoder that resolved it.
    pub matched_address: Option<String>,
    /// Search centre.
    pub center: Coordinates,
    /// Search radius.
    pub radius: SearchRadius,
    /// How `radius` was obtained.
    pub origin: RadiusOrigin,
    /// Tract the address resolved to, absent after a geocoder fallback.
    #[serde(default)]
    pub tract: Option<TractLocation>,
    /// Counts and income, when the radius was derived.
    pub derivation: Option<Derivation>,
}

/// The three core stages plus their fallbacks.
pub struct RadiusPipeline {
    geocoder: Box<dyn TractGeocoder>,
    aggregator: IncomeAggregator,
    calculator: RadiusCalculator,
    fallback_geocoder: Option<Box<dyn PointGeocoder>>,
    fallback_radius: SearchRadius,
}

impl RadiusPipeline {
    /// Creates a pipeline with no fallback geocoder.
    ///
    /// `fallback_radius` is clamped to the calculator's radius bounds.
    #[must_use]
    pub fn new(
        geocoder: Box<dyn TractGeocoder>,
        aggregator: IncomeAggregator,
        calculator: RadiusCalculator,
        fallback_radius: SearchRadius,
    ) -> Self {
        let bounds = calculator.profile();
        let fallback_radius = SearchRadius::clamped(
            fallback_radius.meters(),
            bounds.min_radius,
            bounds.max_radius,
        );
        Self {
            geocoder,
            aggregator,
            calculator,
            fallback_geocoder: None,
            fallback_radius,
        }
    }

    /// Locates unresolvable addresses with `geocoder`.
    #[must_use]
    pub fn with_fallback_geocoder(mut self, geocoder: Box<dyn PointGeocoder>) -> Self {
        self.fallback_geocoder = Some(geocoder);
        self
    }

    /// Resolves, aggregates and computes the radius with no fallbacks.
    ///
    /// # Errors
    ///
    /// Returns the first stage error, including
    /// [`AggregateError::DivisionByZero`] for a zero-population tract.
    pub async fn derive(
        &self,
        address: &str,
    ) -> Result<(ResolvedAddress, Derivation, SearchRadius), ProfileError> {
        let resolved = self.geocoder.resolve(address).await?;
        let (derivation, radius) = self.derive_for_tract(&resolved.tract).await?;
        Ok((resolved, derivation, radius))
    }

    /// Resolves the search area, applying the fallback paths.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError`] for any failure that has no fallback:
    /// unavailable statistics, invalid radius inputs, or a resolution
    /// failure that the fallback geocoder (if any) could not recover.
    pub async fn search_area(&self, address: &str) -> Result<SearchArea, ProfileError> {
        let resolved = match self.geocoder.resolve(address).await {
            Ok(resolved) => resolved,
            Err(e) => return self.locate_fallback(address, e).await,
        };

        match self.derive_for_tract(&resolved.tract).await {
            Ok((derivation, radius)) => {
                log::info!(
                    "Derived {:.0} m search radius for tract {}",
                    radius.meters(),
                    derivation.tract.geoid()
                );
                Ok(SearchArea {
                    matched_address: resolved.matched_address,
                    center: resolved.coordinates,
                    radius,
                    origin: RadiusOrigin::Derived,
                    tract: Some(resolved.tract),
                    derivation: Some(derivation),
                })
            }
            Err(
                ProfileError::Aggregate(AggregateError::DivisionByZero(e))
                | ProfileError::Radius(RadiusError::DivisionByZero(e)),
            ) => {
                log::warn!(
                    "{e}; using fixed {:.0} m radius",
                    self.fallback_radius.meters()
                );
                Ok(SearchArea {
                    matched_address: resolved.matched_address,
                    center: resolved.coordinates,
                    radius: self.fallback_radius,
                    origin: RadiusOrigin::ZeroPopulation { geoid: e.geoid },
                    tract: Some(resolved.tract),
                    derivation: None,
                })
            }
            Err(e) => Err(e),
        }
    }

    async fn derive_for_tract(
        &self,
        tract: &TractLocation,
    ) -> Result<(Derivation, SearchRadius), ProfileError> {
        let aggregate = self.aggregator.aggregate(tract).await?;
        let radius = self.calculator.for_tract(tract, aggregate.average)?;
        Ok((
            Derivation {
                tract: tract.clone(),
                counts: aggregate.counts,
                average_income: aggregate.average,
            },
            radius,
        ))
    }

    async fn locate_fallback(
        &self,
        address: &str,
        error: ResolutionError,
    ) -> Result<SearchArea, ProfileError> {
        let Some(fallback) = &self.fallback_geocoder else {
            return Err(error.into());
        };

        log::warn!("Census geocoder failed for \"{address}\": {error}; trying fallback geocoder");

        match fallback.locate(address).await {
            Ok(Some(point)) => {
                log::info!(
                    "Fallback geocoder located \"{address}\" at {}; using fixed {:.0} m radius",
                    point.coordinates.lat_lng(),
                    self.fallback_radius.meters()
                );
                Ok(SearchArea {
                    matched_address: point.display_name,
                    center: point.coordinates,
                    radius: self.fallback_radius,
                    origin: RadiusOrigin::GeocoderFallback {
                        reason: error.to_string(),
                    },
                    tract: None,
                    derivation: None,
                })
            }
            Ok(None) => {
                log::warn!("Fallback geocoder found no match for \"{address}\"");
                Err(error.into())
            }
            Err(fallback_error) => {
                log::warn!("Fallback geocoder failed for \"{address}\": {fallback_error}");
                Err(error.into())
            }
        }
    }
}
