#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Price statistics over flattened menu items.
//!
//! Only complete items (name, description and price all present) are
//! considered. Summaries are grouped by menu name and by
//! (venue, menu, section), and Bayesian intervals are computed over every
//! price together.

pub mod bayes;
pub mod describe;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use venue_profile_venues_models::MenuItem;

pub use bayes::{BayesMvs, Estimate, bayes_mvs};
pub use describe::{MenuSummary, PriceSummary, SectionSummary, describe};

/// Confidence used when none is configured.
pub const DEFAULT_CONFIDENCE: f64 = 0.99;

/// Errors from price statistics.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    /// Not enough prices for the requested statistic.
    #[error("Need at least {needed} prices, found {found}")]
    TooFewObservations {
        /// Minimum sample size.
        needed: usize,
        /// Actual sample size.
        found: usize,
    },

    /// Confidence outside `(0, 1)`.
    #[error("Confidence must be strictly between 0 and 1, got {alpha}")]
    InvalidConfidence {
        /// The rejected value.
        alpha: f64,
    },

    /// A posterior distribution could not be built.
    #[error("Distribution error: {message}")]
    Distribution {
        /// Description of what went wrong.
        message: String,
    },
}

/// All price statistics for one profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceStatistics {
    /// Number of complete items the statistics are computed over.
    pub item_count: usize,
    /// Summary over every price.
    pub overall: PriceSummary,
    /// Summaries per menu name.
    pub by_menu: Vec<MenuSummary>,
    /// Summaries per venue, menu and section.
    pub by_section: Vec<SectionSummary>,
    /// Bayesian estimates over every price. Absent below four prices or
    /// when every price is the same.
    pub bayes_mvs: Option<BayesMvs>,
}

/// Computes price statistics over the complete items in `items`.
///
/// # Errors
///
/// Returns [`StatsError::InvalidConfidence`] if `confidence` is out of
/// range, or [`StatsError::TooFewObservations`] if no item is complete.
pub fn price_statistics(
    items: &[MenuItem],
    confidence: f64,
) -> Result<PriceStatistics, StatsError> {
    let complete: Vec<MenuItem> = items.iter().filter(|i| i.is_complete()).cloned().collect();
    let prices: Vec<f64> = complete.iter().filter_map(|i| i.item_price).collect();

    log::info!(
        "Computing price statistics over {} of {} menu items",
        complete.len(),
        items.len()
    );

    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(StatsError::InvalidConfidence { alpha: confidence });
    }
    let overall = describe(&prices).ok_or(StatsError::TooFewObservations {
        needed: 1,
        found: 0,
    })?;

    let bayes_mvs = match bayes_mvs(&prices, confidence) {
        Ok(estimates) => Some(estimates),
        Err(e @ (StatsError::TooFewObservations { .. } | StatsError::Distribution { .. })) => {
            log::warn!("No Bayesian price estimates: {e}");
            None
        }
        Err(e) => return Err(e),
    };

    Ok(PriceStatistics {
        item_count: complete.len(),
        overall,
        by_menu: describe::describe_by_menu(&complete),
        by_section: describe::describe_by_section(&complete),
        bayes_mvs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(section: &str, price: Option<f64>, desc: Option<&str>) -> MenuItem {
        MenuItem {
            venue_name: "Alpha".to_string(),
            menu_name: "Dinner".to_string(),
            section_name: section.to_string(),
            item_name: Some("Dish".to_string()),
            item_desc: desc.map(ToString::to_string),
            item_price: price,
        }
    }

    #[test]
    fn ignores_incomplete_items() {
        let items = vec![
            item("Mains", Some(8.5), Some("a")),
            item("Mains", Some(4.0), Some("b")),
            item("Mains", Some(12.0), Some("c")),
            item("Sides", Some(15.5), Some("d")),
            item("Sides", Some(99.0), None),
            item("Sides", None, Some("f")),
        ];

        let stats = price_statistics(&items, DEFAULT_CONFIDENCE).unwrap();
        assert_eq!(stats.item_count, 4);
        assert_eq!(stats.overall.count, 4);
        assert!((stats.overall.max - 15.5).abs() < f64::EPSILON);
        assert_eq!(stats.by_menu.len(), 1);
        assert_eq!(stats.by_section.len(), 2);
        assert!((stats.bayes_mvs.unwrap().alpha - 0.99).abs() < f64::EPSILON);
    }

    #[test]
    fn no_complete_items_is_an_error() {
        let items = vec![item("Mains", None, Some("a")), item("Mains", Some(4.0), None)];
        assert!(matches!(
            price_statistics(&items, DEFAULT_CONFIDENCE),
            Err(StatsError::TooFewObservations { found: 0, .. })
        ));
    }

    #[test]
    fn small_samples_keep_descriptive_statistics() {
        let items = vec![
            item("Mains", Some(8.5), Some("a")),
            item("Sides", Some(4.0), Some("b")),
        ];
        let stats = price_statistics(&items, DEFAULT_CONFIDENCE).unwrap();
        assert_eq!(stats.overall.count, 2);
        assert_eq!(stats.by_section.len(), 2);
        assert_eq!(stats.bayes_mvs, None);
    }

    #[test]
    fn uniform_prices_skip_bayesian_estimates() {
        let items: Vec<MenuItem> = (0..4)
            .map(|_| item("Sandwiches", Some(10.0), Some("x")))
            .collect();
        let stats = price_statistics(&items, DEFAULT_CONFIDENCE).unwrap();

        assert_eq!(stats.item_count, 4);
        assert!((stats.overall.mean - 10.0).abs() < f64::EPSILON);
        assert!(stats.overall.std.unwrap().abs() < f64::EPSILON);
        assert_eq!(stats.bayes_mvs, None);
    }

    #[test]
    fn confidence_is_checked_before_sample_size() {
        let items = vec![item("Mains", Some(8.5), Some("a"))];
        assert!(matches!(
            price_statistics(&items, 1.5),
            Err(StatsError::InvalidConfidence { .. })
        ));
    }

    #[test]
    fn statistics_serialize() {
        let items: Vec<MenuItem> = [3.0, 5.0, 8.0, 13.0]
            .iter()
            .map(|p| item("Mains", Some(*p), Some("x")))
            .collect();
        let stats = price_statistics(&items, 0.95).unwrap();

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["item_count"], 4);
        assert_eq!(json["by_menu"][0]["menu_name"], "Dinner");
        assert!(json["bayes_mvs"]["mean"]["lower"].is_number());
    }
}
