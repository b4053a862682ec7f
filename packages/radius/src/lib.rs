#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dynamic venue search radius.
//!
//! Combines a tract's land area per resident (a density term) and its
//! income per resident into a single distance:
//!
//! ```text
//! density = (land_area / population) / scale
//! income  = avg_income / population
//! radius  = clamp((density³ + income³)^(1/exponent) + base_offset, min, max)
//! ```
//!
//! The constants are grouped into a [`RadiusProfile`]. Two named profiles
//! exist because the formula was tuned twice; see [`RadiusProfileName`].

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;
use venue_profile_tract_models::{
    AverageIncomeEstimate, DivisionByZeroError, SearchRadius, TractLocation,
};

/// A radius input or profile constant outside its valid domain.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("invalid {parameter}: {value}")]
pub struct InvalidInputError {
    /// Which input was rejected.
    pub parameter: &'static str,
    /// The rejected value.
    pub value: f64,
}

/// Errors from [`RadiusCalculator::compute_radius`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RadiusError {
    /// An input was negative, non-finite, or the profile is invalid.
    #[error(transparent)]
    InvalidInput(#[from] InvalidInputError),

    /// Population was zero.
    #[error(transparent)]
    DivisionByZero(#[from] DivisionByZeroError),
}

/// Named constant sets for the radius formula.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum RadiusProfileName {
    /// Scale 2π, square root. The default.
    #[default]
    #[serde(rename = "tau-square-root")]
    #[strum(serialize = "tau-square-root")]
    TauSquareRoot,
    /// Scale π, 2.5th root. Smaller radii for the same inputs.
    #[serde(rename = "pi-root-2.5")]
    #[strum(serialize = "pi-root-2.5")]
    PiRootTwoPointFive,
}

impl RadiusProfileName {
    /// Every named profile.
    pub const ALL: &[Self] = &[Self::TauSquareRoot, Self::PiRootTwoPointFive];
}

/// Constants of the radius formula.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadiusProfile {
    /// Divisor applied to land area per resident.
    pub scale: f64,
    /// Root taken of the summed cubes.
    pub exponent: f64,
    /// Meters added before clamping.
    pub base_offset: f64,
    /// Lower clamp in meters.
    pub min_radius: f64,
    /// Upper clamp in meters.
    pub max_radius: f64,
}

impl RadiusProfile {
    /// Meters added to every raw radius.
    pub const BASE_OFFSET: f64 = 1000.0;
    /// Smallest radius venue search accepts.
    pub const MIN_RADIUS: f64 = 1000.0;
    /// Largest radius venue search accepts.
    pub const MAX_RADIUS: f64 = 50_000.0;

    /// Profile constants for a named profile.
    #[must_use]
    pub const fn named(name: RadiusProfileName) -> Self {
        let (scale, exponent) = match name {
            RadiusProfileName::TauSquareRoot => (std::f64::consts::TAU, 2.0),
            RadiusProfileName::PiRootTwoPointFive => (std::f64::consts::PI, 2.5),
        };
        Self {
            scale,
            exponent,
            base_offset: Self::BASE_OFFSET,
            min_radius: Self::MIN_RADIUS,
            max_radius: Self::MAX_RADIUS,
        }
    }

    /// Checks that the constants describe a usable formula.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInputError`] naming the first bad constant.
    pub fn validate(&self) -> Result<(), InvalidInputError> {
        positive("scale", self.scale)?;
        positive("exponent", self.exponent)?;
        finite_non_negative("base_offset", self.base_offset)?;
        positive("min_radius", self.min_radius)?;
        positive("max_radius", self.max_radius)?;
        if self.min_radius > self.max_radius {
            return Err(InvalidInputError {
                parameter: "min_radius",
                value: self.min_radius,
            });
        }
        Ok(())
    }
}

impl Default for RadiusProfile {
    fn default() -> Self {
        Self::named(RadiusProfileName::default())
    }
}

impl From<RadiusProfileName> for RadiusProfile {
    fn from(name: RadiusProfileName) -> Self {
        Self::named(name)
    }
}

/// Pure radius computation for one profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusCalculator {
    profile: RadiusProfile,
}

impl RadiusCalculator {
    /// Creates a calculator, validating the profile up front.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInputError`] if the profile constants are unusable.
    pub fn new(profile: RadiusProfile) -> Result<Self, InvalidInputError> {
        profile.validate()?;
        Ok(Self { profile })
    }

    /// The profile in use.
    #[must_use]
    pub const fn profile(&self) -> &RadiusProfile {
        &self.profile
    }

    /// Computes the clamped search radius.
    ///
    /// # Errors
    ///
    /// * [`RadiusError::DivisionByZero`] if `population` is zero.
    /// * [`RadiusError::InvalidInput`] if `land_area` or `avg_income` is
    ///   negative or not finite.
    #[allow(clippy::cast_precision_loss)]
    pub fn compute_radius(
        &self,
        land_area: f64,
        population: u64,
        avg_income: f64,
    ) -> Result<SearchRadius, RadiusError> {
        if population == 0 {
            return Err(DivisionByZeroError {
                geoid: String::new(),
            }
            .into());
        }
        finite_non_negative("land_area", land_area)?;
        finite_non_negative("avg_income", avg_income)?;

        let p = &self.profile;
        let population = population as f64;

        let density_term = (land_area / population) / p.scale;
        let income_term = avg_income / population;
        let raw = (density_term.powi(3) + income_term.powi(3)).powf(p.exponent.recip())
            + p.base_offset;

        Ok(SearchRadius::clamped(raw, p.min_radius, p.max_radius))
    }

    /// Computes the radius for a resolved tract and its average income.
    ///
    /// # Errors
    ///
    /// Same as [`Self::compute_radius`]; a zero population reports the
    /// tract's GEOID.
    pub fn for_tract(
        &self,
        tract: &TractLocation,
        average: AverageIncomeEstimate,
    ) -> Result<SearchRadius, RadiusError> {
        self.compute_radius(tract.land_area, tract.population, average.dollars())
            .map_err(|e| match e {
                RadiusError::DivisionByZero(_) => DivisionByZeroError {
                    geoid: tract.geoid(),
                }
                .into(),
                other @ RadiusError::InvalidInput(_) => other,
            })
    }
}

impl Default for RadiusCalculator {
    fn default() -> Self {
        Self {
            profile: RadiusProfile::default(),
        }
    }
}

fn positive(parameter: &'static str, value: f64) -> Result<(), InvalidInputError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(InvalidInputError { parameter, value })
    }
}

fn finite_non_negative(parameter: &'static str, value: f64) -> Result<(), InvalidInputError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(InvalidInputError { parameter, value })
    }
}
