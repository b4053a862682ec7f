//! Bracket-midpoint weighting.

use venue_profile_tract_models::{
    AverageIncomeEstimate, DivisionByZeroError, IncomeBracketCounts, TractLocation,
};

/// Average income per resident: `Σ(count × weight) / population`.
///
/// The divisor is the tract's resident population, not the number of
/// responding households, so the estimate is a per-capita figure.
///
/// # Errors
///
/// Returns [`DivisionByZeroError`] if the tract population is zero.
#[allow(clippy::cast_precision_loss)]
pub fn average_income(
    counts: &IncomeBracketCounts,
    tract: &TractLocation,
) -> Result<AverageIncomeEstimate, DivisionByZeroError> {
    if tract.population == 0 {
        return Err(DivisionByZeroError {
            geoid: tract.geoid(),
        });
    }

    Ok(AverageIncomeEstimate::new(
        counts.weighted_sum() / tract.population as f64,
    ))
}
