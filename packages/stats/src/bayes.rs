//! Bayesian confidence intervals for the mean, variance and standard
//! deviation of a sample, using Jeffreys priors.
//!
//! Matches `scipy.stats.bayes_mvs`: with `n` observations, sample mean
//! `x̄` and biased variance `C`, the posteriors are
//!
//! - mean: Student-t with `n - 1` degrees of freedom, location `x̄`,
//!   scale `sqrt(C / (n - 1))`
//! - variance: inverse gamma with shape `(n - 1) / 2`, scale `n·C / 2`
//! - std: the square root of the variance posterior
//!
//! Above 1000 observations each posterior is replaced by its normal
//! approximation.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Gamma, Normal, StudentsT};
use statrs::function::gamma::ln_gamma;

use crate::StatsError;

/// Below this many observations the variance posterior has no mean.
pub const MIN_OBSERVATIONS: usize = 4;

/// Sample size above which normal approximations are used.
const NORMAL_APPROXIMATION_THRESHOLD: usize = 1000;

const BISECTION_STEPS: usize = 200;

/// Posterior centre and central credible interval of one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    /// Posterior mean.
    pub center: f64,
    /// Lower bound of the interval.
    pub lower: f64,
    /// Upper bound of the interval.
    pub upper: f64,
}

/// Estimates for mean, variance and standard deviation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BayesMvs {
    /// Probability mass inside each interval.
    pub alpha: f64,
    /// Mean estimate.
    pub mean: Estimate,
    /// Variance estimate.
    pub variance: Estimate,
    /// Standard deviation estimate.
    pub std: Estimate,
}

/// Computes Bayesian estimates at confidence `alpha`.
///
/// # Errors
///
/// * [`StatsError::InvalidConfidence`] unless `0 < alpha < 1`
/// * [`StatsError::TooFewObservations`] below [`MIN_OBSERVATIONS`]
/// * [`StatsError::Distribution`] if a posterior cannot be constructed
///   (e.g. a zero-variance sample)
#[allow(clippy::cast_precision_loss)]
pub fn bayes_mvs(data: &[f64], alpha: f64) -> Result<BayesMvs, StatsError> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(StatsError::InvalidConfidence { alpha });
    }
    if data.len() < MIN_OBSERVATIONS {
        return Err(StatsError::TooFewObservations {
            needed: MIN_OBSERVATIONS,
            found: data.len(),
        });
    }

    let n = data.len() as f64;
    let xbar = data.iter().sum::<f64>() / n;
    let c = data.iter().map(|x| (x - xbar).powi(2)).sum::<f64>() / n;
    if c <= 0.0 || !c.is_finite() {
        return Err(StatsError::Distribution {
            message: format!("Sample variance must be positive, got {c}"),
        });
    }

    let q_lower = (1.0 - alpha) / 2.0;
    let q_upper = (1.0 + alpha) / 2.0;

    let (mean, variance, std) = if data.len() > NORMAL_APPROXIMATION_THRESHOLD {
        (
            normal_estimate(xbar, (c / n).sqrt(), q_lower, q_upper)?,
            normal_estimate(c, (2.0 / n).sqrt() * c, q_lower, q_upper)?,
            normal_estimate(c.sqrt(), (c / (2.0 * n)).sqrt(), q_lower, q_upper)?,
        )
    } else {
        let nm1 = n - 1.0;
        let fac = n * c / 2.0;
        let shape = nm1 / 2.0;

        let t = StudentsT::new(0.0, 1.0, nm1).map_err(distribution_error)?;
        let t_scale = (c / nm1).sqrt();
        let mean = Estimate {
            center: xbar,
            lower: t_scale.mul_add(invert_cdf(|x| t.cdf(x), q_lower, false), xbar),
            upper: t_scale.mul_add(invert_cdf(|x| t.cdf(x), q_upper, false), xbar),
        };

        // V = fac / G with G ~ Gamma(shape, 1), so quantiles swap tails.
        let g = Gamma::new(shape, 1.0).map_err(distribution_error)?;
        let variance = Estimate {
            center: fac / (shape - 1.0),
            lower: fac / invert_cdf(|x| g.cdf(x), q_upper, true),
            upper: fac / invert_cdf(|x| g.cdf(x), q_lower, true),
        };

        let std = Estimate {
            center: fac.sqrt() * (ln_gamma(shape - 0.5) - ln_gamma(shape)).exp(),
            lower: variance.lower.sqrt(),
            upper: variance.upper.sqrt(),
        };

        (mean, variance, std)
    };

    log::debug!(
        "bayes_mvs over {} prices: mean {:.2} [{:.2}, {:.2}]",
        data.len(),
        mean.center,
        mean.lower,
        mean.upper
    );

    Ok(BayesMvs {
        alpha,
        mean,
        variance,
        std,
    })
}

fn normal_estimate(
    center: f64,
    scale: f64,
    q_lower: f64,
    q_upper: f64,
) -> Result<Estimate, StatsError> {
    let normal = Normal::new(center, scale).map_err(distribution_error)?;
    Ok(Estimate {
        center,
        lower: normal.inverse_cdf(q_lower),
        upper: normal.inverse_cdf(q_upper),
    })
}

#[allow(clippy::needless_pass_by_value)]
fn distribution_error(e: impl std::fmt::Display) -> StatsError {
    StatsError::Distribution {
        message: e.to_string(),
    }
}

/// Inverts a continuous, increasing CDF by bracketing then bisection.
///
/// With `positive` the support is `(0, ∞)`, otherwise the whole real line.
fn invert_cdf(cdf: impl Fn(f64) -> f64, p: f64, positive: bool) -> f64 {
    let mut low = if positive { 0.0 } else { -1.0 };
    let mut high = 1.0;
    while !positive && cdf(low) > p {
        low *= 2.0;
    }
    while cdf(high) < p {
        high *= 2.0;
    }

    for _ in 0..BISECTION_STEPS {
        let mid = 0.5 * (low + high);
        if cdf(mid) < p {
            low = mid;
        } else {
            high = mid;
        }
        if high - low <= f64::EPSILON * high.abs().max(1.0) {
            break;
        }
    }
    0.5 * (low + high)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRICES: [f64; 7] = [8.5, 4.0, 12.0, 15.5, 9.0, 22.0, 6.5];

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6 * expected.abs().max(1.0),
            "{actual} != {expected}"
        );
    }

    #[test]
    fn matches_reference_values() {
        let result = bayes_mvs(&PRICES, 0.99).unwrap();

        assert_close(result.mean.center, 11.071_428_571_428_571);
        assert_close(result.mean.lower, 2.553_285_674_816_523);
        assert_close(result.mean.upper, 19.589_571_468_040_62);

        assert_close(result.variance.center, 55.428_571_428_571_43);
        assert_close(result.variance.lower, 11.953_809_379_183_735);
        assert_close(result.variance.upper, 328.112_327_513_760_06);

        assert_close(result.std.center, 6.998_227_309_448_609);
        assert_close(result.std.lower, 3.457_428_145_194_595);
        assert_close(result.std.upper, 18.113_871_135_507_177);
    }

    #[test]
    fn intervals_contain_centers() {
        let result = bayes_mvs(&PRICES, 0.9).unwrap();
        for estimate in [result.mean, result.variance, result.std] {
            assert!(estimate.lower < estimate.center);
            assert!(estimate.center < estimate.upper);
        }
    }

    #[test]
    fn wider_confidence_widens_intervals() {
        let narrow = bayes_mvs(&PRICES, 0.5).unwrap();
        let wide = bayes_mvs(&PRICES, 0.99).unwrap();
        assert!(wide.mean.lower < narrow.mean.lower);
        assert!(wide.mean.upper > narrow.mean.upper);
    }

    #[test]
    fn large_samples_use_normal_approximation() {
        let data: Vec<f64> = (0..2000).map(|i| f64::from(i % 10)).collect();
        let result = bayes_mvs(&data, 0.95).unwrap();

        assert_close(result.mean.center, 4.5);
        assert_close(result.variance.center, 8.25);
        assert_close(result.std.center, 8.25_f64.sqrt());
        let half_width = 1.959_963_984_540_054 * (8.25 / 2000.0_f64).sqrt();
        assert_close(result.mean.upper, 4.5 + half_width);
    }

    #[test]
    fn rejects_small_samples() {
        assert!(matches!(
            bayes_mvs(&[1.0, 2.0, 3.0], 0.99),
            Err(StatsError::TooFewObservations {
                needed: 4,
                found: 3
            })
        ));
    }

    #[test]
    fn rejects_invalid_confidence() {
        for alpha in [0.0, 1.0, -0.5, f64::NAN] {
            assert!(matches!(
                bayes_mvs(&PRICES, alpha),
                Err(StatsError::InvalidConfidence { .. })
            ));
        }
    }

    #[test]
    fn rejects_constant_samples() {
        assert!(matches!(
            bayes_mvs(&[5.0; 6], 0.99),
            Err(StatsError::Distribution { .. })
        ));
    }
}
