//! Pandas-style `describe` summaries, overall and per group.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use venue_profile_venues_models::MenuItem;

/// Count, moments and quartiles of a price sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSummary {
    /// Number of prices.
    pub count: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// Sample standard deviation (`ddof = 1`), absent below two prices.
    pub std: Option<f64>,
    /// Smallest price.
    pub min: f64,
    /// First quartile.
    pub p25: f64,
    /// Median.
    pub p50: f64,
    /// Third quartile.
    pub p75: f64,
    /// Largest price.
    pub max: f64,
}

/// Summary of one menu across venues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuSummary {
    /// Menu name.
    pub menu_name: String,
    /// Prices on menus of that name.
    pub summary: PriceSummary,
}

/// Summary of one section of one venue's menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSummary {
    /// Venue name.
    pub venue_name: String,
    /// Menu name.
    pub menu_name: String,
    /// Section name.
    pub section_name: String,
    /// Prices in that section.
    pub summary: PriceSummary,
}

/// Summarizes a price sample, or `None` if it is empty.
///
/// Quartiles use linear interpolation between closest ranks.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn describe(prices: &[f64]) -> Option<PriceSummary> {
    if prices.is_empty() {
        return None;
    }

    let mut sorted = prices.to_vec();
    sorted.sort_by(f64::total_cmp);

    let count = sorted.len();
    let n = count as f64;
    let mean = sorted.iter().sum::<f64>() / n;
    let std = (count > 1).then(|| {
        let ss: f64 = sorted.iter().map(|p| (p - mean).powi(2)).sum();
        (ss / (n - 1.0)).sqrt()
    });

    Some(PriceSummary {
        count,
        mean,
        std,
        min: sorted[0],
        p25: percentile(&sorted, 0.25),
        p50: percentile(&sorted, 0.5),
        p75: percentile(&sorted, 0.75),
        max: sorted[count - 1],
    })
}

/// Linear-interpolated percentile of a sorted, non-empty slice.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let pos = (sorted.len() - 1) as f64 * q;
    let lo = pos.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    let frac = pos - pos.floor();
    (sorted[hi] - sorted[lo]).mul_add(frac, sorted[lo])
}

/// Groups priced items by menu name and summarizes each group.
#[must_use]
pub fn describe_by_menu(items: &[MenuItem]) -> Vec<MenuSummary> {
    group_prices(items, |item| item.menu_name.clone())
        .into_iter()
        .filter_map(|(menu_name, prices)| {
            describe(&prices).map(|summary| MenuSummary { menu_name, summary })
        })
        .collect()
}

/// Groups priced items by venue, menu and section and summarizes each group.
#[must_use]
pub fn describe_by_section(items: &[MenuItem]) -> Vec<SectionSummary> {
    group_prices(items, |item| {
        (
            item.venue_name.clone(),
            item.menu_name.clone(),
            item.section_name.clone(),
        )
    })
    .into_iter()
    .filter_map(|((venue_name, menu_name, section_name), prices)| {
        describe(&prices).map(|summary| SectionSummary {
            venue_name,
            menu_name,
            section_name,
            summary,
        })
    })
    .collect()
}

fn group_prices<K: Ord>(
    items: &[MenuItem],
    key: impl Fn(&MenuItem) -> K,
) -> BTreeMap<K, Vec<f64>> {
    let mut groups: BTreeMap<K, Vec<f64>> = BTreeMap::new();
    for item in items {
        if let Some(price) = item.item_price {
            groups.entry(key(item)).or_default().push(price);
        }
    }
    groups
}
