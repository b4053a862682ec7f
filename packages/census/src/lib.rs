#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Household income statistics for census tracts.
//!
//! Fetches the sixteen ACS `B19001` income-bracket counts for a tract and
//! reduces them to a single average-income estimate by bracket weighting.
//! The estimate is divided by the tract's resident population, so a
//! zero-population tract is reported as a
//! [`DivisionByZeroError`](venue_profile_tract_models::DivisionByZeroError)
//! rather than producing `NaN`.

pub mod acs;
pub mod income;

use async_trait::async_trait;
use thiserror::Error;
use venue_profile_tract_models::{
    AverageIncomeEstimate, DivisionByZeroError, IncomeBracketCounts, TractLocation,
};

/// Errors when tract statistics cannot be obtained.
#[derive(Debug, Error)]
pub enum DataUnavailableError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The statistics source does not know this tract (e.g. dissolved or
    /// renumbered between vintages).
    #[error("No income data for tract {geoid}")]
    NotFound {
        /// GEOID that was looked up.
        geoid: String,
    },

    /// The tract is missing a state, county, or tract identifier.
    #[error("Tract identifiers are incomplete (GEOID \"{geoid}\")")]
    IncompleteTract {
        /// Whatever GEOID could be assembled.
        geoid: String,
    },

    /// The response could not be interpreted as bracket counts.
    #[error("Malformed income data for tract {geoid}: {message}")]
    Malformed {
        /// GEOID that was looked up.
        geoid: String,
        /// Description of what went wrong.
        message: String,
    },
}

/// Errors from [`IncomeAggregator::aggregate`].
#[derive(Debug, Error)]
pub enum AggregateError {
    /// Bracket counts could not be fetched.
    #[error(transparent)]
    DataUnavailable(#[from] DataUnavailableError),

    /// The tract has no residents to divide by.
    #[error(transparent)]
    DivisionByZero(#[from] DivisionByZeroError),
}

/// A source of per-tract household income bracket counts.
#[async_trait]
pub trait IncomeStatistics: Send + Sync {
    /// Fetches the bracket counts for `tract`, in
    /// [`INCOME_BRACKETS`](venue_profile_tract_models::INCOME_BRACKETS)
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`DataUnavailableError`] if the tract cannot be resolved or
    /// the response is unusable.
    async fn bracket_counts(
        &self,
        tract: &TractLocation,
    ) -> Result<IncomeBracketCounts, DataUnavailableError>;
}

/// Bracket counts and the average income derived from them.
#[derive(Debug, Clone, PartialEq)]
pub struct IncomeAggregate {
    /// Household counts per bracket.
    pub counts: IncomeBracketCounts,
    /// Weighted average income per resident.
    pub average: AverageIncomeEstimate,
}

/// Fetches bracket counts and reduces them to an average income.
pub struct IncomeAggregator {
    source: Box<dyn IncomeStatistics>,
}

impl IncomeAggregator {
    /// Creates an aggregator backed by `source`.
    #[must_use]
    pub fn new(source: Box<dyn IncomeStatistics>) -> Self {
        Self { source }
    }

    /// Fetches the counts for `tract` and computes its average income.
    ///
    /// # Errors
    ///
    /// * [`AggregateError::DataUnavailable`] if the tract identifiers are
    ///   incomplete or the source cannot provide counts.
    /// * [`AggregateError::DivisionByZero`] if the tract population is zero.
    pub async fn aggregate(&self, tract: &TractLocation) -> Result<IncomeAggregate, AggregateError> {
        if !tract.has_identifiers() {
            return Err(DataUnavailableError::IncompleteTract {
                geoid: tract.geoid(),
            }
            .into());
        }

        let counts = self.source.bracket_counts(tract).await?;
        let average = income::average_income(&counts, tract)?;

        log::info!(
            "Tract {}: {} households across {} brackets, average income ${:.2}",
            tract.geoid(),
            counts.households(),
            counts.counts().len(),
            average.dollars()
        );

        Ok(IncomeAggregate { counts, average })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use venue_profile_tract_models::BRACKET_COUNT;

    use super::*;

    struct FixedCounts {
        counts: [u64; BRACKET_COUNT],
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl IncomeStatistics for FixedCounts {
        async fn bracket_counts(
            &self,
            _tract: &TractLocation,
        ) -> Result<IncomeBracketCounts, DataUnavailableError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(IncomeBracketCounts::new(self.counts))
        }
    }

    struct UnknownTract;

    #[async_trait]
    impl IncomeStatistics for UnknownTract {
        async fn bracket_counts(
            &self,
            tract: &TractLocation,
        ) -> Result<IncomeBracketCounts, DataUnavailableError> {
            Err(DataUnavailableError::NotFound {
                geoid: tract.geoid(),
            })
        }
    }

    fn tract(population: u64) -> TractLocation {
        TractLocation {
            state_id: "36".to_string(),
            county_id: "061".to_string(),
            tract_id: "010200".to_string(),
            land_area: 250_000.0,
            population,
        }
    }

    fn aggregator(counts: [u64; BRACKET_COUNT]) -> (IncomeAggregator, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = FixedCounts {
            counts,
            calls: Arc::clone(&calls),
        };
        (IncomeAggregator::new(Box::new(source)), calls)
    }

    #[tokio::test]
    async fn single_top_bracket_household() {
        let mut counts = [0; BRACKET_COUNT];
        counts[BRACKET_COUNT - 1] = 1;
        let (agg, _) = aggregator(counts);
        let result = agg.aggregate(&tract(1)).await.unwrap();
        assert!((result.average.dollars() - 200_000.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn aggregate_is_idempotent() {
        let counts = [3, 1, 4, 1, 5, 9, 2, 6, 5, 3, 5, 8, 9, 7, 9, 3];
        let (agg, calls) = aggregator(counts);
        let first = agg.aggregate(&tract(412)).await.unwrap();
        let second = agg.aggregate(&tract(412)).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first.average.dollars().to_bits(),
            second.average.dollars().to_bits()
        );
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn zero_population_is_division_by_zero() {
        let (agg, _) = aggregator([1; BRACKET_COUNT]);
        let err = agg.aggregate(&tract(0)).await.unwrap_err();
        assert!(
            matches!(err, AggregateError::DivisionByZero(ref e) if e.geoid == "36061010200"),
            "{err:?}"
        );
    }

    #[tokio::test]
    async fn incomplete_tract_skips_lookup() {
        let (agg, calls) = aggregator([1; BRACKET_COUNT]);
        let mut t = tract(10);
        t.tract_id.clear();
        let err = agg.aggregate(&t).await.unwrap_err();
        assert!(matches!(
            err,
            AggregateError::DataUnavailable(DataUnavailableError::IncompleteTract { .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_tract_is_data_unavailable() {
        let agg = IncomeAggregator::new(Box::new(UnknownTract));
        let err = agg.aggregate(&tract(10)).await.unwrap_err();
        assert!(matches!(
            err,
            AggregateError::DataUnavailable(DataUnavailableError::NotFound { ref geoid })
                if geoid == "36061010200"
        ));
    }
}
